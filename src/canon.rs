//! Canonical JSON serialization.
//!
//! Two parties independently computing the bytes-to-sign must produce the
//! same bytes for the same logical document, so every signed or verified
//! byte flows through this adapter. Key ordering and number formatting are
//! delegated to the `json-canon` implementation of RFC 8785.

use serde::Serialize;
use thiserror::Error;

/// A value could not be rendered in canonical form.
#[derive(Debug, Clone, Error)]
#[error("canonical serialization failed: {0}")]
pub struct CanonError(String);

impl CanonError {
    pub(crate) fn new(cause: impl std::fmt::Display) -> Self {
        Self(cause.to_string())
    }
}

/// Serialize a value to its canonical JSON text.
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String, CanonError> {
    json_canon::to_string(value).map_err(CanonError::new)
}

/// Serialize a value to its canonical JSON bytes.
pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CanonError> {
    to_string(value).map(String::into_bytes)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    #[test]
    fn orders_keys_lexicographically() {
        let value = json!({"b": 1, "a": {"z": true, "y": null}, "c": [3, 2, 1]});
        assert_eq!(
            super::to_string(&value).unwrap(),
            r#"{"a":{"y":null,"z":true},"b":1,"c":[3,2,1]}"#
        );
    }

    #[test]
    fn stable_across_repeated_serialization() {
        let value = json!({"x": 12, "s": "a\"b", "nested": {"k": [true, false]}});
        let first = super::to_string(&value).unwrap();
        let second = super::to_string(&value).unwrap();
        assert_eq!(first, second);
    }
}
