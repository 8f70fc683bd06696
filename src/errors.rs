//! The structured error raised whenever a document fails validation or
//! verification. Callers pattern-match on the stable `code`, never on the
//! message text, which may embed caller-supplied values.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// A document was rejected. The `code` identifies the exact reason and is
/// stable across releases; `parameters` carries the diagnostic values the
/// reason refers to.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct UnacceptableDocumentError {
    code: &'static str,
    message: String,
    parameters: BTreeMap<String, Value>,
}

impl UnacceptableDocumentError {
    /// New instance with no parameters.
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Attach a diagnostic parameter.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.to_owned(), value.into());
        self
    }

    /// The stable machine-readable reason code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The diagnostic values associated with this rejection.
    pub fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_code_message_and_parameters() {
        let err = UnacceptableDocumentError::new("credential_expired", "credential has expired")
            .with("id", "urn:uuid:1234")
            .with("now", "2023-03-05T19:23:24Z");

        assert_eq!(err.code(), "credential_expired");
        assert_eq!(err.to_string(), "credential has expired");
        assert_eq!(err.parameters()["id"], "urn:uuid:1234");
        assert_eq!(err.parameters().len(), 2);
    }
}
