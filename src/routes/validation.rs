use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// Unwrap a required field, rejecting absence with `message`
pub fn require<T>(value: Option<T>, message: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::InvalidInput(message.to_string()))
}

/// Like `require`, but a blank string also counts as missing
pub fn require_text(value: Option<String>, message: &str) -> Result<String, AppError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(AppError::InvalidInput(message.to_string())),
    }
}

/// Deserialize a field that distinguishes "omitted" from "null"
///
/// Use with `#[serde(default, deserialize_with = "present")]` on an
/// `Option<Option<T>>`: omitted -> `None`, `null` -> `Some(None)`,
/// value -> `Some(Some(v))`.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
    Other(IgnoredAny),
}

/// Deserialize a row id sent as a number or a numeric string
///
/// Anything else (non-numeric text, floats, booleans, null) becomes `None`
/// so the handler reports the id as missing instead of a parse error.
/// Use with `#[serde(default, deserialize_with = "lenient_id")]`.
pub fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Int(id)) => Some(id),
        Some(RawId::Text(text)) => text.trim().parse().ok(),
        Some(RawId::Other(_)) | None => None,
    })
}
