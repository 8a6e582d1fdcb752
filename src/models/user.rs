use serde::{Deserialize, Deserializer, Serialize, de};
use sqlx::FromRow;

/// Database user model, as returned by the list operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub fields: UserFields,
}

/// The eight client-writable columns of a user row.
///
/// Nothing here is required: an absent field is written as `NULL` and the database schema
/// decides whether that is acceptable. Scalars sent for a text column are bound as their text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserFields {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub designation: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_admin: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub middle_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub previous_exp: Option<String>,
}

/// Takes a string, number or boolean; booleans become `1`/`0` the way MySQL stores them.
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Bool(bool),
        Int(i64),
        UInt(u64),
        Float(f64),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|value| match value {
        Scalar::Text(text) => text,
        Scalar::Bool(flag) => String::from(if flag { "1" } else { "0" }),
        Scalar::Int(number) => number.to_string(),
        Scalar::UInt(number) => number.to_string(),
        Scalar::Float(number) => number.to_string(),
    }))
}

/// Accepts `true`/`false`, `0`/`1` and their string forms, since form bodies carry only text.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Flag::Bool(value)) => Ok(Some(value)),
        Some(Flag::Int(value)) => Ok(Some(value != 0)),
        Some(Flag::Text(text)) => match text.trim() {
            "" => Ok(None),
            "0" | "false" => Ok(Some(false)),
            "1" | "true" => Ok(Some(true)),
            other => Err(de::Error::invalid_value(
                de::Unexpected::Str(other),
                &"a boolean, 0 or 1",
            )),
        },
    }
}
