use std::{env, fmt};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_POOL_SIZE: u32 = 5;

#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database: DatabaseConfig,
    pub max_pool_size: u32,
}

/// Where the user table lives.
///
/// `url` wins when present; otherwise a MySQL connection is assembled from the discrete keys.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub user: String,
    pub password: String,
    pub name: String,
    /// Set when `MYSQL_PASSWORD` was missing and the built-in default is in use.
    pub default_password: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let server_port = match lookup("PORT") {
            Some(port) => port.parse().map_err(|_| ConfigError::InvalidPort(port))?,
            None => DEFAULT_PORT,
        };

        let password = lookup("MYSQL_PASSWORD");

        Ok(Self {
            server_host: var_or("SERVER_HOST", "0.0.0.0"),
            server_port,
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
                host: var_or("MYSQL_HOST", "localhost"),
                user: var_or("MYSQL_USER", "root"),
                default_password: password.is_none(),
                password: password.unwrap_or_default(),
                name: var_or("MYSQL_DATABASE", "users_db"),
            },
            max_pool_size: lookup("MAX_POOL_SIZE")
                .and_then(|size| size.parse().ok())
                .unwrap_or(DEFAULT_MAX_POOL_SIZE),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

impl DatabaseConfig {
    pub fn is_sqlite(&self) -> bool {
        self.url.as_deref().is_some_and(|url| url.starts_with("sqlite:"))
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "<set>"))
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("database", &self.database)
            .field("max_pool_size", &self.max_pool_size)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(String),
}
