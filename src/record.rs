use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::RosterError;

// The record shape delivered by the users API. Any field can be missing or null
// and then decodes to its empty value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub name: Name,
    #[serde(deserialize_with = "null_as_default")]
    pub picture: Picture,
    #[serde(deserialize_with = "null_as_default")]
    pub location: Location,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub registered: Registered,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Name {
    #[serde(deserialize_with = "lenient_string")]
    pub first: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Picture {
    #[serde(deserialize_with = "lenient_string")]
    pub large: String,
    #[serde(deserialize_with = "lenient_string")]
    pub medium: String,
    #[serde(deserialize_with = "lenient_string")]
    pub thumbnail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Location {
    #[serde(deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(deserialize_with = "lenient_string")]
    pub city: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Registered {
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    pub age: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    results: Vec<UserRecord>,
}

impl UserRecord {
    /// "<first> <last>", the string both the name column and the search match against.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name.first, self.name.last)
            .trim()
            .to_string()
    }
}

/// Decode a users API payload: a JSON object with a `results` array.
pub fn parse_payload(body: &str) -> Result<Vec<UserRecord>, RosterError> {
    let payload: Payload = serde_json::from_str(body)?;
    Ok(payload.results)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Scalars are shown as they come. Numbers keep their JSON spelling, everything
// that is not a scalar shows as an empty cell.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    })
}
