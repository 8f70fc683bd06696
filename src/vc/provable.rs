//! The `Provable` trait and the checks shared by every provable document.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::canon::CanonError;
use crate::constants::{log_safe, CREDENTIAL_CONTEXT};
use crate::errors::UnacceptableDocumentError;
use crate::proof::{CanonicalJsonWithJws, CryptoProver, Proof, ProofError, VerifyContext};

const DOCUMENT_TYPE: &str = "documentType";

/// A document that can have a standard proof attached to it.
///
/// Once a proof is attached the document is logically immutable: every
/// setter must pass through [`Provable::assert_unproven`] first.
pub trait Provable: Serialize {
    /// The "proof" element, if one has been attached.
    fn proof(&self) -> Option<&Proof>;

    /// Attach or remove the "proof" element.
    fn set_proof(&mut self, proof: Option<Proof>);

    /// The JSON representation of this document. This is what is signed
    /// and verified.
    fn as_json(&self) -> Result<Value, CanonError>
    where
        Self: Sized,
    {
        serde_json::to_value(self).map_err(CanonError::new)
    }

    /// The single mutability gate called by every setter.
    ///
    /// # Panics
    ///
    /// Panics if a proof is attached.
    fn assert_unproven(&self) {
        if self.proof().is_some() {
            panic!("cannot change document data while a proof is attached");
        }
    }
}

fn shown(id: Option<&str>) -> String {
    log_safe(id.unwrap_or("<unset>"))
}

/// Verify that a document declares the required W3C context: either the
/// context string itself, or an array whose first element is it.
pub fn verify_context(
    context: Option<&Value>,
    doc_type: &str,
    id: Option<&str>,
) -> Result<(), UnacceptableDocumentError> {
    let value = match context {
        None | Some(Value::Null) => {
            return Err(UnacceptableDocumentError::new(
                "document_context_missing",
                format!("{doc_type} {} does not specify an \"@context\" value", shown(id)),
            )
            .with(DOCUMENT_TYPE, doc_type));
        }
        Some(value) => value,
    };

    let primary = match value {
        Value::String(text) => Some(text.as_str()),
        // Only the first element can satisfy the requirement; W3C rules
        // say the credential context must come first.
        Value::Array(items) => items.first().and_then(Value::as_str),
        _ => {
            return Err(UnacceptableDocumentError::new(
                "document_context_bad_type",
                format!("{doc_type} {} does not specify a valid \"@context\" value", shown(id)),
            )
            .with(DOCUMENT_TYPE, doc_type));
        }
    };

    if primary != Some(CREDENTIAL_CONTEXT) {
        return Err(UnacceptableDocumentError::new(
            "document_context_w3c_must_be_first",
            format!(
                "{doc_type} {} NOT verified as missing context: {}",
                shown(id),
                log_safe(&value.to_string())
            ),
        )
        .with(DOCUMENT_TYPE, doc_type)
        .with("context", value.clone()));
    }

    Ok(())
}

/// The data types given in a JSON-LD type specification: either a string
/// or an array of strings.
pub fn get_types(
    types: Option<&Value>,
    doc_type: &str,
    id: Option<&str>,
) -> Result<HashSet<String>, UnacceptableDocumentError> {
    let value = match types {
        None | Some(Value::Null) => {
            return Err(UnacceptableDocumentError::new(
                "document_has_no_types",
                format!("{doc_type} {} NOT verified as it does not specify any types", shown(id)),
            )
            .with(DOCUMENT_TYPE, doc_type));
        }
        Some(value) => value,
    };

    match value {
        Value::String(text) => Ok(HashSet::from([text.clone()])),
        Value::Array(items) => {
            let mut set = HashSet::new();
            for item in items {
                match item {
                    Value::String(text) => {
                        set.insert(text.clone());
                    }
                    Value::Null => {
                        return Err(UnacceptableDocumentError::new(
                            "document_contains_null_type",
                            format!(
                                "{doc_type} {} NOT verified as its type specification contains a null",
                                shown(id)
                            ),
                        )
                        .with(DOCUMENT_TYPE, doc_type));
                    }
                    other => {
                        return Err(UnacceptableDocumentError::new(
                            "document_bad_contained_type_specifier",
                            format!(
                                "{doc_type} {} NOT verified as its type specification contains a non-string",
                                shown(id)
                            ),
                        )
                        .with(DOCUMENT_TYPE, doc_type)
                        .with("jsonType", json_type_name(other)));
                    }
                }
            }
            Ok(set)
        }
        other => Err(UnacceptableDocumentError::new(
            "document_bad_type_specifier",
            format!(
                "{doc_type} {} NOT verified as its type specification is a {}",
                shown(id),
                json_type_name(other)
            ),
        )
        .with(DOCUMENT_TYPE, doc_type)
        .with("jsonType", json_type_name(other))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Verify that a document's declared types include the required one.
pub fn verify_type(
    types: Option<&[String]>,
    doc_type: &str,
    id: Option<&str>,
    required: &str,
) -> Result<(), UnacceptableDocumentError> {
    let types = types.ok_or_else(|| {
        UnacceptableDocumentError::new(
            "document_type_is_null",
            format!("{doc_type} {} NOT verified as it does not specify any types", shown(id)),
        )
        .with(DOCUMENT_TYPE, doc_type)
        .with("requiredType", required)
    })?;

    if !types.iter().any(|t| t == required) {
        return Err(UnacceptableDocumentError::new(
            "document_type_missing",
            format!(
                "{doc_type} {} NOT verified as not correct type of \"{required}\"",
                shown(id)
            ),
        )
        .with(DOCUMENT_TYPE, doc_type)
        .with("requiredType", required));
    }

    Ok(())
}

/// Verify that the cryptographic proof on a document is correct.
///
/// A missing proof is `document_no_proof`. A cryptographic-provider fault
/// during verification wraps as `document_proof_error`; ordinary
/// rejections keep their own reason codes.
pub fn verify_proof<P: Provable>(
    proof: Option<&Proof>,
    document: &P,
    doc_type: &str,
    id: Option<&str>,
    context: &mut VerifyContext<'_>,
) -> Result<(), UnacceptableDocumentError> {
    let proof = proof.ok_or_else(|| {
        UnacceptableDocumentError::new(
            "document_no_proof",
            format!("{doc_type} {} has not been proved", shown(id)),
        )
        .with(DOCUMENT_TYPE, doc_type)
    })?;

    let wrap = |detail: String| {
        UnacceptableDocumentError::new(
            "document_proof_error",
            format!("{doc_type} {} proof did not verify", shown(id)),
        )
        .with(DOCUMENT_TYPE, doc_type)
        .with("errorMessage", detail)
    };

    let input = document.as_json().map_err(|e| wrap(e.to_string()))?;
    match CanonicalJsonWithJws.verify_proof(context, &input, proof) {
        Ok(()) => Ok(()),
        Err(ProofError::Document(rejection)) => Err(rejection),
        Err(fault) => {
            warn!(document = %shown(id), error = %fault, "proof verification fault");
            Err(wrap(fault.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn context_must_be_the_w3c_context_or_lead_an_array() {
        assert!(verify_context(Some(&json!(CREDENTIAL_CONTEXT)), "Credential", None).is_ok());
        assert!(verify_context(Some(&json!([CREDENTIAL_CONTEXT, "https://example.com/ctx"])), "Credential", None).is_ok());

        let missing = verify_context(None, "Credential", None).unwrap_err();
        assert_eq!(missing.code(), "document_context_missing");
        let null = verify_context(Some(&Value::Null), "Credential", None).unwrap_err();
        assert_eq!(null.code(), "document_context_missing");

        let bad = verify_context(Some(&json!(17)), "Credential", None).unwrap_err();
        assert_eq!(bad.code(), "document_context_bad_type");

        let second = verify_context(
            Some(&json!(["https://example.com/ctx", CREDENTIAL_CONTEXT])),
            "Credential",
            None,
        )
        .unwrap_err();
        assert_eq!(second.code(), "document_context_w3c_must_be_first");

        let empty = verify_context(Some(&json!([])), "Credential", None).unwrap_err();
        assert_eq!(empty.code(), "document_context_w3c_must_be_first");

        let wrong = verify_context(Some(&json!("https://example.com/ctx")), "Credential", None).unwrap_err();
        assert_eq!(wrong.code(), "document_context_w3c_must_be_first");
    }

    #[test]
    fn types_accept_string_or_string_array_only() {
        let single = get_types(Some(&json!("VerifiableCredential")), "Credential", None).unwrap();
        assert!(single.contains("VerifiableCredential"));

        let many = get_types(Some(&json!(["VerifiableCredential", "Diploma"])), "Credential", None).unwrap();
        assert_eq!(many.len(), 2);

        assert_eq!(
            get_types(None, "Credential", None).unwrap_err().code(),
            "document_has_no_types"
        );
        assert_eq!(
            get_types(Some(&json!(3)), "Credential", None).unwrap_err().code(),
            "document_bad_type_specifier"
        );
        assert_eq!(
            get_types(Some(&json!(["ok", null])), "Credential", None).unwrap_err().code(),
            "document_contains_null_type"
        );
        assert_eq!(
            get_types(Some(&json!(["ok", 7])), "Credential", None).unwrap_err().code(),
            "document_bad_contained_type_specifier"
        );
    }

    #[test]
    fn required_type_must_be_declared() {
        let types = vec!["VerifiableCredential".to_owned(), "Diploma".to_owned()];
        assert!(verify_type(Some(&types), "Credential", None, "VerifiableCredential").is_ok());

        let err = verify_type(Some(&types), "Credential", None, "VerifiablePresentation").unwrap_err();
        assert_eq!(err.code(), "document_type_missing");

        let err = verify_type(None, "Credential", None, "VerifiableCredential").unwrap_err();
        assert_eq!(err.code(), "document_type_is_null");
    }
}
