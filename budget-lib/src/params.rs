use serde::{de, Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

/// Deserializes an optional query or form parameter, treating an empty string like a missing
/// one.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(de::Error::custom),
    }
}
