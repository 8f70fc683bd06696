//! The "CanonicalJsonWithJws" signature suite.
//!
//! The document, including every proof field except `jws`, is serialized
//! to canonical JSON and signed as an RFC 7797 detached payload. The
//! stored value is `base64url(header) + ".." + base64url(signature)`; the
//! empty middle segment marks the payload as detached.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde_json::{json, Value};
use tracing::debug;

use crate::canon::{self, CanonError};
use crate::constants;
use crate::crypto::KeyPair;
use crate::errors::UnacceptableDocumentError;
use crate::jwk::SigningAlgorithm;
use crate::proof::context::{ProofContext, VerifyContext};
use crate::proof::model::Proof;
use crate::proof::{salt, ProofError};
use crate::vc::provable::Provable;

/// The proof type written and required by this suite.
pub const PROOF_TYPE_CANONICAL_JSON_WITH_JWS: &str = "CanonicalJsonWithJws";

/// A signature suite that can attach a proof to a document and verify the
/// proof found in a document.
pub trait CryptoProver {
    /// Create a proof over the document and attach it. The proof's
    /// non-signature fields are themselves part of what is signed.
    fn attach_proof<P: Provable>(
        &self,
        context: &mut ProofContext,
        document: &mut P,
        key_pair: &KeyPair,
    ) -> Result<(), ProofError>;

    /// Check a document's proof. `document` is the full JSON form of the
    /// document, proof included.
    fn verify_proof(
        &self,
        context: &mut VerifyContext<'_>,
        document: &Value,
        proof: &Proof,
    ) -> Result<(), ProofError>;
}

/// Implementation of the "Canonical JSON with JWS" signature method.
pub struct CanonicalJsonWithJws;

impl CryptoProver for CanonicalJsonWithJws {
    fn attach_proof<P: Provable>(
        &self,
        context: &mut ProofContext,
        document: &mut P,
        key_pair: &KeyPair,
    ) -> Result<(), ProofError> {
        let mut proof = document.proof().cloned().unwrap_or_default();

        // Set the standard proof fields. The salt decouples signatures
        // over otherwise identical documents.
        proof.remove("jws");
        proof.set_proof_type(PROOF_TYPE_CANONICAL_JSON_WITH_JWS);
        proof.set_created(constants::now_seconds());
        proof.set_verification_method(context.did_with_key().uri().to_owned());
        proof.set("salt", salt::create());
        document.set_proof(Some(proof.clone()));

        let to_sign = document.as_json()?;

        // The JWS header. See RFC 7797 for how the bytes-to-sign is defined.
        let header_json = serde_json::to_string(&json!({
            "alg": key_pair.algorithm().jwk_name(),
            "b64": false,
            "crit": ["b64"],
        }))
        .map_err(CanonError::new)?;
        let header = Base64UrlUnpadded::encode_string(header_json.as_bytes());

        let canonical = canon::to_vec(&to_sign)?;
        let mut signing_input = Vec::with_capacity(header.len() + 1 + canonical.len());
        signing_input.extend_from_slice(header.as_bytes());
        signing_input.push(b'.');
        signing_input.extend_from_slice(&canonical);
        context.set_bytes_to_sign(signing_input);

        context.sign(key_pair)?;

        let jws = format!("{header}..{}", Base64UrlUnpadded::encode_string(context.signature_value()));
        proof.set("jws", jws);
        document.set_proof(Some(proof));

        debug!(
            algorithm = key_pair.algorithm().jwk_name(),
            signer = context.did_with_key().uri(),
            "proof attached"
        );
        Ok(())
    }

    fn verify_proof(
        &self,
        context: &mut VerifyContext<'_>,
        document: &Value,
        proof: &Proof,
    ) -> Result<(), ProofError> {
        // The only proof type we support is 'CanonicalJsonWithJws'.
        if proof.proof_type() != PROOF_TYPE_CANONICAL_JSON_WITH_JWS {
            return Err(UnacceptableDocumentError::new(
                "proof_incorrect_type",
                "proof type is not \"CanonicalJsonWithJws\"",
            )
            .into());
        }

        // The proof must contain a "jws" value, which is the one proof
        // field that is not part of what was proved.
        let jws = match proof.get_str("jws") {
            Some(jws) if !jws.is_empty() => jws,
            _ => {
                return Err(UnacceptableDocumentError::new(
                    "proof_missing_jws",
                    "proof does not contain a \"jws\" value",
                )
                .into());
            }
        };

        // The payload must be detached, so ".." in the middle.
        let detached_at = jws.find("..").ok_or_else(|| {
            UnacceptableDocumentError::new("proof_jws_not_detached", "JWS value is not <header>..<signature>")
        })?;
        let header_b64 = &jws[..detached_at];
        let signature_b64 = &jws[detached_at + 2..];

        let header_bytes = Base64UrlUnpadded::decode_vec(header_b64).map_err(|_| {
            UnacceptableDocumentError::new(
                "proof_jws_header_bad_base64",
                "JWS header contains an invalid base64url character",
            )
            .with("header", header_b64)
        })?;

        // The header should be a valid JSON object.
        let bad_json = || {
            UnacceptableDocumentError::new("proof_jws_header_bad_json", "JWS header contains invalid JSON")
                .with("badJson", String::from_utf8_lossy(&header_bytes).into_owned())
        };
        let header_value: Value = serde_json::from_slice(&header_bytes).map_err(|_| bad_json())?;
        let header = header_value.as_object().ok_or_else(bad_json)?;

        // For a detached payload, the header must specify "b64":false.
        if header.get("b64") != Some(&Value::Bool(false)) {
            return Err(UnacceptableDocumentError::new(
                "proof_jws_header_missing_b64",
                "JWS header does not specify b64=false",
            )
            .into());
        }

        // The "alg" is required, must be known, and must not be NONE.
        let header_alg = match header.get("alg").and_then(Value::as_str) {
            Some(alg) if !alg.is_empty() => alg,
            _ => {
                return Err(UnacceptableDocumentError::new(
                    "proof_jws_header_missing_alg",
                    "JWS header does not specify an 'alg'",
                )
                .into());
            }
        };
        let algorithm = SigningAlgorithm::from_jwk_name(header_alg).map_err(|_| {
            UnacceptableDocumentError::new(
                "proof_jws_header_invalid_alg",
                "JWS header does not specify a valid 'alg'",
            )
            .with("alg", header_alg)
        })?;
        if algorithm == SigningAlgorithm::Null {
            return Err(UnacceptableDocumentError::new(
                "proof_jws_header_alg_is_none",
                "JWS header must not specify NONE for 'alg'",
            )
            .with("alg", header_alg)
            .into());
        }
        context.set_algorithm(algorithm);
        // JWS header is OK. Grab the signature value.

        let signature = Base64UrlUnpadded::decode_vec(signature_b64).map_err(|_| {
            UnacceptableDocumentError::new(
                "proof_jws_signature_bad_base64",
                "JWS signature contains an invalid base64url character",
            )
            .with("signature", signature_b64)
        })?;
        context.set_alleged_signature(signature);

        // The proof must name a verification method known to us.
        context.find_verification_method(proof)?;

        // Recreate the bytes-to-sign: the document without the jws value,
        // behind the original header bytes as they appear in the JWS.
        let mut unsigned = document.clone();
        if let Some(proof_object) = unsigned.get_mut("proof").and_then(Value::as_object_mut) {
            proof_object.remove("jws");
        }
        let canonical = canon::to_vec(&unsigned)?;
        let mut signing_input = Vec::with_capacity(header_b64.len() + 1 + canonical.len());
        signing_input.extend_from_slice(header_b64.as_bytes());
        signing_input.push(b'.');
        signing_input.extend_from_slice(&canonical);
        context.set_bytes_to_sign(signing_input);

        context.verify()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn code_of(err: ProofError) -> &'static str {
        match err {
            ProofError::Document(doc) => doc.code(),
            other => panic!("expected a document rejection: {other:?}"),
        }
    }

    // Header-level failures need no DID store; resolution is never reached.
    struct NoStore;
    impl crate::did::DidStore for NoStore {
        fn fetch(&self, did: &crate::did::DidId) -> Result<crate::did::DidDocument, crate::did::DidStoreError> {
            Err(crate::did::DidStoreError::NotFound(did.uri().to_owned()))
        }
    }

    fn verify_raw(proof: &Proof) -> ProofError {
        let store = NoStore;
        let mut context = VerifyContext::new(&store);
        let document = json!({"id": "urn:x", "proof": serde_json::to_value(proof).unwrap()});
        CanonicalJsonWithJws
            .verify_proof(&mut context, &document, proof)
            .unwrap_err()
    }

    fn jws_proof(jws: impl Into<Value>) -> Proof {
        let mut proof = Proof::default();
        proof.set_proof_type(PROOF_TYPE_CANONICAL_JSON_WITH_JWS);
        proof.set_verification_method("did:setl:abc#key-1");
        proof.set("jws", jws.into());
        proof
    }

    fn header_b64(json_text: &str) -> String {
        Base64UrlUnpadded::encode_string(json_text.as_bytes())
    }

    #[test]
    fn rejects_in_documented_order() {
        let mut wrong_type = jws_proof("a..b");
        wrong_type.set_proof_type("DataIntegrityProof");
        assert_eq!(code_of(verify_raw(&wrong_type)), "proof_incorrect_type");

        let mut missing = jws_proof("");
        assert_eq!(code_of(verify_raw(&missing)), "proof_missing_jws");
        missing.remove("jws");
        assert_eq!(code_of(verify_raw(&missing)), "proof_missing_jws");

        assert_eq!(code_of(verify_raw(&jws_proof("onlyonesegment"))), "proof_jws_not_detached");

        assert_eq!(code_of(verify_raw(&jws_proof("a!b..sig"))), "proof_jws_header_bad_base64");

        let not_json = format!("{}..sig", header_b64("not json"));
        assert_eq!(code_of(verify_raw(&jws_proof(not_json))), "proof_jws_header_bad_json");

        let not_object = format!("{}..sig", header_b64("[1,2]"));
        assert_eq!(code_of(verify_raw(&jws_proof(not_object))), "proof_jws_header_bad_json");

        let b64_true = format!("{}..sig", header_b64(r#"{"alg":"ES256","b64":true}"#));
        assert_eq!(code_of(verify_raw(&jws_proof(b64_true))), "proof_jws_header_missing_b64");

        let b64_absent = format!("{}..sig", header_b64(r#"{"alg":"ES256"}"#));
        assert_eq!(code_of(verify_raw(&jws_proof(b64_absent))), "proof_jws_header_missing_b64");

        let no_alg = format!("{}..sig", header_b64(r#"{"b64":false}"#));
        assert_eq!(code_of(verify_raw(&jws_proof(no_alg))), "proof_jws_header_missing_alg");

        let empty_alg = format!("{}..sig", header_b64(r#"{"alg":"","b64":false}"#));
        assert_eq!(code_of(verify_raw(&jws_proof(empty_alg))), "proof_jws_header_missing_alg");

        let bad_alg = format!("{}..sig", header_b64(r#"{"alg":"HS256","b64":false}"#));
        assert_eq!(code_of(verify_raw(&jws_proof(bad_alg))), "proof_jws_header_invalid_alg");

        let none_alg = format!("{}..sig", header_b64(r#"{"alg":"NONE","b64":false}"#));
        assert_eq!(code_of(verify_raw(&jws_proof(none_alg))), "proof_jws_header_alg_is_none");

        let bad_sig = format!("{}..si!g", header_b64(r#"{"alg":"ES256","b64":false}"#));
        assert_eq!(code_of(verify_raw(&jws_proof(bad_sig))), "proof_jws_signature_bad_base64");

        // With the JWS fully well-formed, resolution is next; the empty
        // store reports the DID as unknown.
        let resolvable = format!("{}..c2ln", header_b64(r#"{"alg":"ES256","b64":false}"#));
        assert_eq!(code_of(verify_raw(&jws_proof(resolvable))), "did_unknown");
    }

    #[test]
    fn missing_verification_method_is_detected_after_the_jws_checks() {
        let mut proof = jws_proof(format!("{}..c2ln", header_b64(r#"{"alg":"ES256","b64":false}"#)));
        proof.set_verification_method("");
        // An empty string is present but not a DID URL.
        assert_eq!(code_of(verify_raw(&proof)), "proof_verification_method_not_did");

        let store = NoStore;
        let mut context = VerifyContext::new(&store);
        let mut bare = Proof::default();
        bare.set_proof_type(PROOF_TYPE_CANONICAL_JSON_WITH_JWS);
        bare.set("jws", format!("{}..c2ln", header_b64(r#"{"alg":"ES256","b64":false}"#)));
        let document = json!({"proof": serde_json::to_value(&bare).unwrap()});
        let err = CanonicalJsonWithJws
            .verify_proof(&mut context, &document, &bare)
            .unwrap_err();
        assert_eq!(code_of(err), "proof_no_verification_method");

        let mut not_did = jws_proof(format!("{}..c2ln", header_b64(r#"{"alg":"ES256","b64":false}"#)));
        not_did.set_verification_method("did:setl:abc");
        // No fragment: cannot name a key.
        assert_eq!(code_of(verify_raw(&not_did)), "proof_verification_method_not_did");
    }
}
