//! Verifiable credentials and their signing and verification pipeline.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::constants::{self, log_safe, CREDENTIAL_CONTEXT, VERIFIABLE_CREDENTIAL_TYPE};
use crate::crypto::KeyPair;
use crate::errors::UnacceptableDocumentError;
use crate::proof::{CanonicalJsonWithJws, CryptoProver, Proof, ProofContext, ProofError, VerifyContext};
use crate::revocation::RevocationChecker;
use crate::vc::provable::{self, Provable};

const CREDENTIAL: &str = "Credential";

fn empty_object() -> Value {
    json!({})
}

/// The specification for how the status of a credential can be checked.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CredentialStatus {
    /// Where the status can be checked.
    pub id: String,

    /// The status check mechanism.
    #[serde(rename = "type")]
    pub status_type: String,
}

/// A verifiable credential.
///
/// A credential with a proof attached is logically immutable: every
/// setter panics until the proof is removed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// The applicable JSON-LD contexts.
    #[serde(rename = "@context")]
    context: Value,

    /// An optional URI identifying this credential. This is not the
    /// identifier of the subject nor of the holder.
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    /// The declared types. Always contains "VerifiableCredential".
    #[serde(rename = "type")]
    credential_type: Vec<String>,

    /// The DID of the issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    issuer: Option<String>,

    /// When this credential was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    issuance_date: Option<DateTime<Utc>>,

    /// When this credential ceases to be valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration_date: Option<DateTime<Utc>>,

    /// The claims this credential makes.
    #[serde(default = "empty_object")]
    credential_subject: Value,

    /// How to check whether this credential has been revoked.
    #[serde(skip_serializing_if = "Option::is_none")]
    credential_status: Option<CredentialStatus>,

    /// The cryptographic proof associated with this.
    #[serde(skip_serializing_if = "Option::is_none")]
    proof: Option<Proof>,
}

impl Default for Credential {
    fn default() -> Self {
        Self::new()
    }
}

impl Credential {
    /// New unproven credential with the standard context, issued now and
    /// expiring in 365 days.
    pub fn new() -> Self {
        let issuance = constants::now_seconds();
        Self {
            context: json!([CREDENTIAL_CONTEXT]),
            id: None,
            credential_type: vec![VERIFIABLE_CREDENTIAL_TYPE.to_owned()],
            issuer: None,
            issuance_date: Some(issuance),
            expiration_date: Some(issuance + Duration::days(365)),
            credential_subject: json!({}),
            credential_status: None,
            proof: None,
        }
    }

    pub fn context(&self) -> &Value {
        &self.context
    }

    pub fn set_context(&mut self, context: Value) {
        self.assert_unproven();
        self.context = context;
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.assert_unproven();
        self.id = Some(id.into());
    }

    pub fn types(&self) -> &[String] {
        &self.credential_type
    }

    /// Set the declared types. An empty set resets to the minimal type.
    ///
    /// # Panics
    ///
    /// Panics if the set is non-empty and omits "VerifiableCredential".
    pub fn set_types(&mut self, types: Vec<String>) {
        self.assert_unproven();
        if types.is_empty() {
            self.credential_type = vec![VERIFIABLE_CREDENTIAL_TYPE.to_owned()];
            return;
        }
        if !types.iter().any(|t| t == VERIFIABLE_CREDENTIAL_TYPE) {
            panic!("type set must contain: {VERIFIABLE_CREDENTIAL_TYPE}");
        }
        self.credential_type = types;
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    pub fn set_issuer(&mut self, issuer: impl Into<String>) {
        self.assert_unproven();
        self.issuer = Some(issuer.into());
    }

    pub fn issuance_date(&self) -> Option<DateTime<Utc>> {
        self.issuance_date
    }

    pub fn set_issuance_date(&mut self, date: Option<DateTime<Utc>>) {
        self.assert_unproven();
        self.issuance_date = date;
    }

    pub fn expiration_date(&self) -> Option<DateTime<Utc>> {
        self.expiration_date
    }

    pub fn set_expiration_date(&mut self, date: Option<DateTime<Utc>>) {
        self.assert_unproven();
        self.expiration_date = date;
    }

    pub fn credential_subject(&self) -> &Value {
        &self.credential_subject
    }

    pub fn set_credential_subject(&mut self, subject: Value) {
        self.assert_unproven();
        self.credential_subject = subject;
    }

    pub fn credential_status(&self) -> Option<&CredentialStatus> {
        self.credential_status.as_ref()
    }

    pub fn set_credential_status(&mut self, status: Option<CredentialStatus>) {
        self.assert_unproven();
        self.credential_status = status;
    }
}

impl Provable for Credential {
    fn proof(&self) -> Option<&Proof> {
        self.proof.as_ref()
    }

    fn set_proof(&mut self, proof: Option<Proof>) {
        self.proof = proof;
    }
}

/// Attach a proof to a credential. The credential must have an id, carry
/// the W3C context and type, and be inside its validity window: a
/// credential that would fail verification must not be signed.
pub fn prove(
    context: &mut ProofContext,
    credential: &mut Credential,
    key_pair: &KeyPair,
) -> Result<(), ProofError> {
    if credential.id().is_none() {
        return Err(UnacceptableDocumentError::new(
            "credential_missing_id",
            "credential is required to have an id",
        )
        .into());
    }

    verify_declarations(credential)?;
    verify_dates(credential)?;

    CanonicalJsonWithJws.attach_proof(context, credential, key_pair)
}

/// Verify a credential. The checks run in order and stop at the first
/// failure:
///
/// 1. It has the required JSON-LD context as the primary context.
/// 2. It lists "VerifiableCredential" among its types.
/// 3. It is inside its validity window.
/// 4. It has not been revoked.
/// 5. It has a valid proof.
pub fn verify(
    credential: &Credential,
    context: &mut VerifyContext<'_>,
    revocation: Option<&dyn RevocationChecker>,
) -> Result<(), UnacceptableDocumentError> {
    verify_declarations(credential)?;
    verify_dates(credential)?;
    verify_status(credential, revocation)?;
    provable::verify_proof(credential.proof(), credential, CREDENTIAL, credential.id(), context)
}

fn verify_declarations(credential: &Credential) -> Result<(), UnacceptableDocumentError> {
    provable::verify_context(Some(credential.context()), CREDENTIAL, credential.id())?;
    provable::verify_type(
        Some(credential.types()),
        CREDENTIAL,
        credential.id(),
        VERIFIABLE_CREDENTIAL_TYPE,
    )
}

/// The issuance date must not be in the future and the expiration date
/// must not be in the past.
fn verify_dates(credential: &Credential) -> Result<(), UnacceptableDocumentError> {
    let at_time = constants::now();
    let shown_id = log_safe(credential.id().unwrap_or("<unset>"));

    if let Some(expires) = credential.expiration_date() {
        if expires < at_time {
            return Err(UnacceptableDocumentError::new(
                "credential_expired",
                format!("Credential {shown_id} NOT verified as it expired at {expires} and it is now {at_time}"),
            )
            .with("id", credential.id().unwrap_or_default())
            .with("expires", expires.to_rfc3339())
            .with("now", at_time.to_rfc3339()));
        }
    }

    if let Some(issued) = credential.issuance_date() {
        if issued > at_time {
            return Err(UnacceptableDocumentError::new(
                "credential_not_issued_yet",
                format!(
                    "Credential {shown_id} NOT verified as it will not be issued until {issued} and it is now {at_time}"
                ),
            )
            .with("id", credential.id().unwrap_or_default())
            .with("issued", issued.to_rfc3339())
            .with("now", at_time.to_rfc3339()));
        }
    }

    Ok(())
}

fn verify_status(
    credential: &Credential,
    revocation: Option<&dyn RevocationChecker>,
) -> Result<(), UnacceptableDocumentError> {
    let (status, checker) = match (credential.credential_status(), revocation) {
        (Some(status), Some(checker)) => (status, checker),
        _ => return Ok(()),
    };

    if checker.is_revoked(
        &status.status_type,
        credential.issuer().unwrap_or_default(),
        credential.id().unwrap_or_default(),
    ) {
        let shown_id = log_safe(credential.id().unwrap_or("<unset>"));
        warn!(credential = %shown_id, "credential has been revoked");
        return Err(UnacceptableDocumentError::new(
            "credential_is_revoked",
            format!("Credential {shown_id} NOT verified as it has been revoked"),
        )
        .with("id", credential.id().unwrap_or_default())
        .with("issuer", credential.issuer().unwrap_or_default())
        .with("statusType", status.status_type.clone()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_credential_carries_defaults() {
        let credential = Credential::new();
        assert_eq!(credential.context(), &json!([CREDENTIAL_CONTEXT]));
        assert_eq!(credential.types(), [VERIFIABLE_CREDENTIAL_TYPE]);
        assert!(credential.issuance_date().is_some());
        let lifetime = credential.expiration_date().unwrap() - credential.issuance_date().unwrap();
        assert_eq!(lifetime, Duration::days(365));
        assert!(credential.proof().is_none());
    }

    #[test]
    #[should_panic(expected = "proof is attached")]
    fn setters_are_gated_once_proven() {
        let mut credential = Credential::new();
        credential.set_id("urn:uuid:1");
        credential.set_proof(Some(Proof::default()));
        credential.set_id("urn:uuid:2");
    }

    #[test]
    fn removing_the_proof_restores_mutability() {
        let mut credential = Credential::new();
        credential.set_proof(Some(Proof::default()));
        credential.set_proof(None);
        credential.set_id("urn:uuid:2");
        assert_eq!(credential.id(), Some("urn:uuid:2"));
    }

    #[test]
    #[should_panic(expected = "must contain")]
    fn types_must_keep_the_verifiable_credential_type() {
        let mut credential = Credential::new();
        credential.set_types(vec!["Diploma".to_owned()]);
    }

    #[test]
    fn empty_type_set_resets_to_minimal() {
        let mut credential = Credential::new();
        credential.set_types(vec![VERIFIABLE_CREDENTIAL_TYPE.to_owned(), "Diploma".to_owned()]);
        credential.set_types(Vec::new());
        assert_eq!(credential.types(), [VERIFIABLE_CREDENTIAL_TYPE]);
    }

    #[test]
    fn expired_credential_is_rejected_before_any_store_access() {
        let mut credential = Credential::new();
        credential.set_id("urn:uuid:expired");
        credential.set_expiration_date(Some(constants::now() - Duration::days(1)));

        let err = verify_dates(&credential).unwrap_err();
        assert_eq!(err.code(), "credential_expired");
        assert!(err.parameters().contains_key("expires"));
        assert!(err.parameters().contains_key("now"));
    }

    #[test]
    fn future_issuance_is_rejected() {
        let mut credential = Credential::new();
        credential.set_id("urn:uuid:future");
        credential.set_issuance_date(Some(constants::now() + Duration::days(2)));
        credential.set_expiration_date(Some(constants::now() + Duration::days(30)));

        let err = verify_dates(&credential).unwrap_err();
        assert_eq!(err.code(), "credential_not_issued_yet");
    }

    #[test]
    fn wire_form_round_trips() {
        let mut credential = Credential::new();
        credential.set_id("http://university.example/credentials/3732");
        credential.set_issuer("did:setl:issuer");
        credential.set_types(vec![VERIFIABLE_CREDENTIAL_TYPE.to_owned(), "AlumniCredential".to_owned()]);
        credential.set_credential_subject(json!({"id": "did:setl:alice", "degree": "MSc"}));
        credential.set_credential_status(Some(CredentialStatus {
            id: "https://status.example/1".to_owned(),
            status_type: "HttpStatusCheck".to_owned(),
        }));

        let value = serde_json::to_value(&credential).unwrap();
        assert_eq!(value["@context"][0], CREDENTIAL_CONTEXT);
        assert_eq!(value["type"][1], "AlumniCredential");
        assert_eq!(value["credentialStatus"]["type"], "HttpStatusCheck");
        assert!(value["issuanceDate"].is_string());

        let back: Credential = serde_json::from_value(value).unwrap();
        assert_eq!(back, credential);
    }
}
