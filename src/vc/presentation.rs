//! Verifiable presentations and their signing and verification pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::constants::{CREDENTIAL_CONTEXT, VERIFIABLE_PRESENTATION_TYPE};
use crate::crypto::KeyPair;
use crate::errors::UnacceptableDocumentError;
use crate::proof::{CanonicalJsonWithJws, CryptoProver, Proof, ProofContext, ProofError, VerifyContext};
use crate::vc::credential::Credential;
use crate::vc::provable::{self, Provable};

const PRESENTATION: &str = "Presentation";

/// A verifiable presentation: a holder-signed bundle of credentials.
///
/// Like a credential, a presentation with a proof attached is logically
/// immutable.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    /// The applicable JSON-LD contexts.
    #[serde(rename = "@context")]
    context: Value,

    /// An optional URI identifying this presentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    /// The declared types. Always contains "VerifiablePresentation".
    #[serde(rename = "type")]
    presentation_type: Vec<String>,

    /// The DID of the presenter.
    #[serde(skip_serializing_if = "Option::is_none")]
    holder: Option<String>,

    /// The credentials being presented.
    #[serde(default)]
    verifiable_credential: Vec<Credential>,

    /// The cryptographic proof associated with this.
    #[serde(skip_serializing_if = "Option::is_none")]
    proof: Option<Proof>,
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new()
    }
}

impl Presentation {
    pub fn new() -> Self {
        Self {
            context: json!([CREDENTIAL_CONTEXT]),
            id: None,
            presentation_type: vec![VERIFIABLE_PRESENTATION_TYPE.to_owned()],
            holder: None,
            verifiable_credential: Vec::new(),
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
        &self.presentation_type
    }

    /// Set the declared types. An empty set resets to the minimal type.
    ///
    /// # Panics
    ///
    /// Panics if the set is non-empty and omits "VerifiablePresentation".
    pub fn set_types(&mut self, types: Vec<String>) {
        self.assert_unproven();
        if types.is_empty() {
            self.presentation_type = vec![VERIFIABLE_PRESENTATION_TYPE.to_owned()];
            return;
        }
        if !types.iter().any(|t| t == VERIFIABLE_PRESENTATION_TYPE) {
            panic!("type set must contain: {VERIFIABLE_PRESENTATION_TYPE}");
        }
        self.presentation_type = types;
    }

    pub fn holder(&self) -> Option<&str> {
        self.holder.as_deref()
    }

    pub fn set_holder(&mut self, holder: impl Into<String>) {
        self.assert_unproven();
        self.holder = Some(holder.into());
    }

    pub fn credentials(&self) -> &[Credential] {
        &self.verifiable_credential
    }

    pub fn set_credentials(&mut self, credentials: Vec<Credential>) {
        self.assert_unproven();
        self.verifiable_credential = credentials;
    }
}

impl Provable for Presentation {
    fn proof(&self) -> Option<&Proof> {
        self.proof.as_ref()
    }

    fn set_proof(&mut self, proof: Option<Proof>) {
        self.proof = proof;
    }
}

/// Attach a proof to a presentation. The presentation must have an id and
/// declare the W3C context and presentation type.
pub fn prove(
    context: &mut ProofContext,
    presentation: &mut Presentation,
    key_pair: &KeyPair,
) -> Result<(), ProofError> {
    if presentation.id().is_none() {
        return Err(UnacceptableDocumentError::new(
            "presentation_missing_id",
            "presentation is required to have an id",
        )
        .into());
    }

    verify_declarations(presentation)?;

    CanonicalJsonWithJws.attach_proof(context, presentation, key_pair)
}

/// Verify the signature on a presentation. Does not verify the embedded
/// credentials.
pub fn verify(
    presentation: &Presentation,
    context: &mut VerifyContext<'_>,
) -> Result<(), UnacceptableDocumentError> {
    verify_declarations(presentation)?;
    provable::verify_proof(
        presentation.proof(),
        presentation,
        PRESENTATION,
        presentation.id(),
        context,
    )
}

fn verify_declarations(presentation: &Presentation) -> Result<(), UnacceptableDocumentError> {
    provable::verify_context(Some(presentation.context()), PRESENTATION, presentation.id())?;
    provable::verify_type(
        Some(presentation.types()),
        PRESENTATION,
        presentation.id(),
        VERIFIABLE_PRESENTATION_TYPE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "proof is attached")]
    fn setters_are_gated_once_proven() {
        let mut presentation = Presentation::new();
        presentation.set_proof(Some(Proof::default()));
        presentation.set_holder("did:setl:holder");
    }

    #[test]
    fn wire_form_round_trips_with_embedded_credentials() {
        let mut credential = Credential::new();
        credential.set_id("urn:uuid:inner");
        credential.set_issuer("did:setl:issuer");

        let mut presentation = Presentation::new();
        presentation.set_id("urn:uuid:outer");
        presentation.set_holder("did:setl:holder");
        presentation.set_credentials(vec![credential]);

        let value = serde_json::to_value(&presentation).unwrap();
        assert_eq!(value["type"][0], VERIFIABLE_PRESENTATION_TYPE);
        assert_eq!(value["verifiableCredential"][0]["id"], "urn:uuid:inner");
        assert_eq!(value["holder"], "did:setl:holder");

        let back: Presentation = serde_json::from_value(value).unwrap();
        assert_eq!(back, presentation);
    }

    #[test]
    fn declarations_are_checked_before_the_proof() {
        let mut presentation = Presentation::new();
        presentation.set_id("urn:uuid:vp");
        presentation.set_context(json!("https://example.com/other"));

        struct NoStore;
        impl crate::did::DidStore for NoStore {
            fn fetch(
                &self,
                did: &crate::did::DidId,
            ) -> Result<crate::did::DidDocument, crate::did::DidStoreError> {
                Err(crate::did::DidStoreError::NotFound(did.uri().to_owned()))
            }
        }
        let store = NoStore;
        let mut context = VerifyContext::new(&store);

        // Both the context and the proof are wrong; the context fails first.
        let err = verify(&presentation, &mut context).unwrap_err();
        assert_eq!(err.code(), "document_context_w3c_must_be_first");
    }
}
