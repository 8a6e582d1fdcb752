use async_trait::async_trait;
use sqlx::{MySqlPool, SqlitePool};

use crate::{
    error::{AppError, Result},
    models::user::{User, UserFields},
};

pub const SELECT_USERS: &str = "SELECT * FROM users";

pub const INSERT_USER: &str = "INSERT INTO users (designation, email, first_name, is_admin, last_name, middle_name, phone_number, previous_exp) VALUES (?, ?, ?, ?, ?, ?, ?, ?)";

pub const UPDATE_USER: &str = "UPDATE users SET designation=?, email=?, first_name=?, is_admin=?, last_name=?, middle_name=?, phone_number=?, previous_exp=? WHERE id = ?";

pub const DELETE_USER: &str = "DELETE FROM users WHERE id = ?";

/// Storage behind the four user routes.
///
/// Every call is a single statement against the `users` table; nothing is cached and no call
/// looks at another's result. Write operations report the driver's affected-row count.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get every row of the users table
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Insert a new row; the assigned id is not reported back
    async fn add_user(&self, fields: &UserFields) -> Result<u64>;

    /// Overwrite all eight fields of the row with the given id
    async fn update_user(&self, id: i64, fields: &UserFields) -> Result<u64>;

    /// Delete the row with the given id
    async fn delete_user(&self, id: i64) -> Result<u64>;

    /// Close the underlying pool, waiting for checked-out connections to return
    async fn close(&self);
}

/// Declares a store over one sqlx pool type; both backends share the statements and binds.
macro_rules! sql_user_store {
    ($(#[$meta:meta])* $store:ident, $pool:ty) => {
        $(#[$meta])*
        pub struct $store {
            pool: $pool,
        }

        impl $store {
            pub fn new(pool: $pool) -> Self {
                Self { pool }
            }

            pub fn pool(&self) -> &$pool {
                &self.pool
            }
        }

        #[async_trait]
        impl UserStore for $store {
            async fn list_users(&self) -> Result<Vec<User>> {
                let users = sqlx::query_as::<_, User>(SELECT_USERS)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(AppError::Database)?;

                Ok(users)
            }

            async fn add_user(&self, fields: &UserFields) -> Result<u64> {
                let result = sqlx::query(INSERT_USER)
                    .bind(fields.designation.as_deref())
                    .bind(fields.email.as_deref())
                    .bind(fields.first_name.as_deref())
                    .bind(fields.is_admin)
                    .bind(fields.last_name.as_deref())
                    .bind(fields.middle_name.as_deref())
                    .bind(fields.phone_number.as_deref())
                    .bind(fields.previous_exp.as_deref())
                    .execute(&self.pool)
                    .await
                    .map_err(AppError::Database)?;

                Ok(result.rows_affected())
            }

            async fn update_user(&self, id: i64, fields: &UserFields) -> Result<u64> {
                let result = sqlx::query(UPDATE_USER)
                    .bind(fields.designation.as_deref())
                    .bind(fields.email.as_deref())
                    .bind(fields.first_name.as_deref())
                    .bind(fields.is_admin)
                    .bind(fields.last_name.as_deref())
                    .bind(fields.middle_name.as_deref())
                    .bind(fields.phone_number.as_deref())
                    .bind(fields.previous_exp.as_deref())
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(AppError::Database)?;

                Ok(result.rows_affected())
            }

            async fn delete_user(&self, id: i64) -> Result<u64> {
                let result = sqlx::query(DELETE_USER)
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(AppError::Database)?;

                Ok(result.rows_affected())
            }

            async fn close(&self) {
                self.pool.close().await;
            }
        }
    };
}

sql_user_store!(
    /// User store backed by a MySQL pool
    MySqlUserStore,
    MySqlPool
);

sql_user_store!(
    /// User store backed by an embedded SQLite database
    SqliteUserStore,
    SqlitePool
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_sqlite;
    use std::{sync::Arc, time::Duration};

    fn developer() -> UserFields {
        UserFields {
            designation: Some("Developer".to_string()),
            email: Some("john@example.com".to_string()),
            first_name: Some("John".to_string()),
            is_admin: Some(false),
            last_name: Some("Doe".to_string()),
            middle_name: Some("M".to_string()),
            phone_number: Some("1234567890".to_string()),
            previous_exp: Some("2 years".to_string()),
        }
    }

    async fn setup_test_store() -> SqliteUserStore {
        connect_sqlite("sqlite::memory:", 1)
            .await
            .expect("Failed to open in-memory database")
    }

    #[test]
    fn test_templates_bind_fields_in_fixed_order() {
        let columns = [
            "designation",
            "email",
            "first_name",
            "is_admin",
            "last_name",
            "middle_name",
            "phone_number",
            "previous_exp",
        ];

        assert_eq!(
            INSERT_USER,
            format!(
                "INSERT INTO users ({}) VALUES ({})",
                columns.join(", "),
                vec!["?"; columns.len()].join(", ")
            )
        );

        let assignments: Vec<String> = columns.iter().map(|c| format!("{}=?", c)).collect();
        assert_eq!(
            UPDATE_USER,
            format!("UPDATE users SET {} WHERE id = ?", assignments.join(", "))
        );
    }

    #[tokio::test]
    async fn test_empty_table_lists_nothing() {
        let store = setup_test_store().await;
        assert!(store.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_crud_operations() {
        let store = setup_test_store().await;

        assert_eq!(store.add_user(&developer()).await.unwrap(), 1);

        let users = store.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].fields, developer());
        let id = users[0].id;

        let promoted = UserFields {
            designation: Some("Senior Developer".to_string()),
            is_admin: Some(true),
            middle_name: None,
            ..developer()
        };
        assert_eq!(store.update_user(id, &promoted).await.unwrap(), 1);
        assert_eq!(store.list_users().await.unwrap()[0].fields, promoted);

        assert_eq!(store.delete_user(id).await.unwrap(), 1);
        assert!(store.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_fields_are_stored_as_null() {
        let store = setup_test_store().await;
        let partial = UserFields {
            email: Some("jane@example.com".to_string()),
            ..UserFields::default()
        };

        store.add_user(&partial).await.unwrap();

        let users = store.list_users().await.unwrap();
        assert_eq!(users[0].fields, partial);
    }

    #[tokio::test]
    async fn test_update_is_idempotent() {
        let store = setup_test_store().await;
        store.add_user(&developer()).await.unwrap();
        let id = store.list_users().await.unwrap()[0].id;

        let changed = UserFields {
            previous_exp: Some("5 years".to_string()),
            ..developer()
        };
        store.update_user(id, &changed).await.unwrap();
        let once = store.list_users().await.unwrap();
        store.update_user(id, &changed).await.unwrap();
        let twice = store.list_users().await.unwrap();

        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_missing_ids_affect_no_rows() {
        let store = setup_test_store().await;
        store.add_user(&developer()).await.unwrap();
        let id = store.list_users().await.unwrap()[0].id;

        assert_eq!(store.update_user(id + 100, &developer()).await.unwrap(), 0);
        assert_eq!(store.delete_user(id).await.unwrap(), 1);
        assert_eq!(store.delete_user(id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_closed_pool_reports_database_error() {
        let store = setup_test_store().await;
        store.close().await;

        let err = store.list_users().await.unwrap_err();
        assert!(matches!(err, AppError::Database(sqlx::Error::PoolClosed)));
    }

    #[tokio::test]
    async fn test_busy_pool_waits_instead_of_timing_out() {
        let store = Arc::new(setup_test_store().await);
        assert!(store.pool().options().get_acquire_timeout() >= Duration::from_secs(60 * 60 * 24));

        // Hold the only connection so the list has to queue for it
        let held = store.pool().acquire().await.unwrap();
        let waiting = tokio::spawn({
            let store = store.clone();
            async move { store.list_users().await }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!waiting.is_finished());

        drop(held);
        let users = waiting.await.unwrap().unwrap();
        assert!(users.is_empty());
    }
}
