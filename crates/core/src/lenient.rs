//! Tolerant field deserializers for EHR-supplied JSON
//!
//! A field holding the wrong JSON type reads as absent instead of failing
//! the whole document.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value as JsonValue;

/// `Some(value)` when the field parses as `T`, `None` otherwise
pub(crate) fn opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// The parsed field, or `T::default()` when it has the wrong shape
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
