//! The single-use workspaces shared by proof creation and verification.

use std::ops::{Deref, DerefMut};

use crate::crypto::{self, CryptoError, KeyPair, PublicKey};
use crate::did::{DidDocument, DidId, DidStore, Presence};
use crate::did::validate::validate_did_url;
use crate::constants::log_safe;
use crate::errors::UnacceptableDocumentError;
use crate::jwk::SigningAlgorithm;
use crate::proof::model::Proof;
use crate::proof::ProofError;
use crate::did::didcore::VerificationMethod;

/// Context used by both the prover and the verifier. Each instance serves
/// exactly one signing or verification operation and is then discarded;
/// instances are not thread-safe and must not be shared.
#[derive(Default)]
pub struct SharedContext {
    /// The bytes that were (or are to be) signed.
    bytes_to_sign: Option<Vec<u8>>,

    /// The DID URL including the key specifier as a fragment.
    did_with_key: Option<DidId>,

    /// The DID as extracted from `did_with_key`, without the fragment.
    did_id: Option<DidId>,

    /// The key id as extracted from `did_with_key`.
    key_id: Option<String>,
}

impl SharedContext {
    /// The bytes-to-sign.
    ///
    /// # Panics
    ///
    /// Panics if the bytes-to-sign have not been set.
    pub fn bytes_to_sign(&self) -> &[u8] {
        self.bytes_to_sign
            .as_deref()
            .unwrap_or_else(|| panic!("'bytes_to_sign' is not set yet"))
    }

    pub fn set_bytes_to_sign(&mut self, bytes: Vec<u8>) {
        self.bytes_to_sign = Some(bytes);
    }

    /// The signer's DID without the key fragment.
    ///
    /// # Panics
    ///
    /// Panics if the DID with key has not been set.
    pub fn did_id(&self) -> &DidId {
        self.did_id
            .as_ref()
            .unwrap_or_else(|| panic!("'did_id' is not set yet"))
    }

    /// The signer's DID including the key fragment.
    ///
    /// # Panics
    ///
    /// Panics if the DID with key has not been set.
    pub fn did_with_key(&self) -> &DidId {
        self.did_with_key
            .as_ref()
            .unwrap_or_else(|| panic!("'did_with_key' is not set yet"))
    }

    /// The key id naming the verification method.
    ///
    /// # Panics
    ///
    /// Panics if the DID with key has not been set.
    pub fn key_id(&self) -> &str {
        self.key_id
            .as_deref()
            .unwrap_or_else(|| panic!("'key_id' is not set yet, so the verification method is also unavailable"))
    }

    /// Set the DID-with-key-fragment URL. Also splits the URL, setting the
    /// fragment-less DID and the key id.
    ///
    /// # Panics
    ///
    /// A DID URL without a fragment cannot name a verification method, so
    /// passing one here is a programmer error and panics immediately.
    pub fn set_did_with_key(&mut self, id: DidId) {
        if validate_did_url(id.uri(), "", Presence::Optional, Presence::Optional, Presence::Required).is_err() {
            panic!("DID with key must be a valid DID URL with a fragment: {}", id.uri());
        }
        self.did_id = Some(id.without_fragment());
        self.key_id = id.fragment().map(str::to_owned);
        self.did_with_key = Some(id);
    }
}

/// Context for attaching a proof to a document.
#[derive(Default)]
pub struct ProofContext {
    shared: SharedContext,

    /// The signature over the bytes-to-sign.
    signature_value: Option<Vec<u8>>,
}

impl ProofContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The signature bytes created by signing.
    ///
    /// # Panics
    ///
    /// Panics if [`ProofContext::sign`] has not succeeded yet.
    pub fn signature_value(&self) -> &[u8] {
        self.signature_value
            .as_deref()
            .unwrap_or_else(|| panic!("signature value is not available; 'sign' must be invoked first"))
    }

    /// Sign the bytes-to-sign with the key pair's algorithm.
    pub fn sign(&mut self, key_pair: &KeyPair) -> Result<(), CryptoError> {
        let signature = crypto::sign(key_pair.algorithm(), key_pair.secret(), self.shared.bytes_to_sign())?;
        self.signature_value = Some(signature);
        Ok(())
    }
}

impl Deref for ProofContext {
    type Target = SharedContext;

    fn deref(&self) -> &SharedContext {
        &self.shared
    }
}

impl DerefMut for ProofContext {
    fn deref_mut(&mut self) -> &mut SharedContext {
        &mut self.shared
    }
}

/// Common information for document verification.
pub struct VerifyContext<'a> {
    shared: SharedContext,

    algorithm: Option<SigningAlgorithm>,

    alleged_signature: Option<Vec<u8>>,

    verification_method: Option<VerificationMethod>,

    did_store: &'a dyn DidStore,
}

impl<'a> VerifyContext<'a> {
    pub fn new(did_store: &'a dyn DidStore) -> Self {
        Self {
            shared: SharedContext::default(),
            algorithm: None,
            alleged_signature: None,
            verification_method: None,
            did_store,
        }
    }

    /// The algorithm claimed by the proof.
    ///
    /// # Panics
    ///
    /// Panics if the algorithm has not been set.
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
            .unwrap_or_else(|| panic!("signing algorithm has not been set"))
    }

    pub fn set_algorithm(&mut self, algorithm: SigningAlgorithm) {
        self.algorithm = Some(algorithm);
    }

    /// The signature bytes claimed by the proof.
    ///
    /// # Panics
    ///
    /// Panics if the alleged signature has not been set.
    pub fn alleged_signature(&self) -> &[u8] {
        self.alleged_signature
            .as_deref()
            .unwrap_or_else(|| panic!("alleged signature has not been set yet"))
    }

    pub fn set_alleged_signature(&mut self, signature: Vec<u8>) {
        self.alleged_signature = Some(signature);
    }

    pub fn did_store(&self) -> &dyn DidStore {
        self.did_store
    }

    /// The verification method resolved by
    /// [`VerifyContext::find_verification_method`].
    ///
    /// # Panics
    ///
    /// Panics if no verification method has been resolved.
    pub fn verification_method(&self) -> &VerificationMethod {
        self.verification_method
            .as_ref()
            .unwrap_or_else(|| panic!("verification method has not been resolved yet"))
    }

    /// Resolve the verification method named by a proof to a concrete
    /// entry of the signer's DID document.
    pub fn find_verification_method(
        &mut self,
        proof: &Proof,
    ) -> Result<&VerificationMethod, UnacceptableDocumentError> {
        let method = proof.verification_method().ok_or_else(|| {
            UnacceptableDocumentError::new(
                "proof_no_verification_method",
                "proof does not contain a 'verificationMethod'",
            )
        })?;

        // The reference must be a DID URL whose fragment names the key.
        let did_with_key: DidId = match validate_did_url(
            method,
            "",
            Presence::Optional,
            Presence::Optional,
            Presence::Required,
        )
        .and_then(|()| method.parse())
        {
            Ok(id) => id,
            Err(_) => {
                return Err(UnacceptableDocumentError::new(
                    "proof_verification_method_not_did",
                    format!(
                        "specified 'verificationMethod' is not a DID URL with a key fragment: {}",
                        log_safe(method)
                    ),
                )
                .with("verificationMethod", method));
            }
        };
        self.shared.set_did_with_key(did_with_key);

        // Fetch by the fragment-less DID. A store failure is
        // indistinguishable from an unknown DID to the counterparty.
        let document: DidDocument = self.did_store.fetch(self.shared.did_id()).map_err(|e| {
            UnacceptableDocumentError::new(
                "did_unknown",
                format!("DID document could not be retrieved: {}", log_safe(&e.to_string())),
            )
            .with("did", self.shared.did_id().uri())
        })?;

        // Exact match on the full DID URL with fragment; first match wins.
        match document
            .verification_method
            .iter()
            .find(|vm| vm.id.as_deref() == Some(method))
        {
            Some(found) => Ok(self.verification_method.insert(found.clone())),
            None => Err(UnacceptableDocumentError::new(
                "proof_verification_method_not_matched",
                format!("no such verification method in specified DID: {}", log_safe(method)),
            )
            .with("verificationMethod", method)),
        }
    }

    /// Check the alleged signature over the bytes-to-sign against the
    /// resolved verification method.
    pub fn verify(&self) -> Result<(), ProofError> {
        let algorithm = self.algorithm();
        let jwk = self.verification_method().public_key_jwk.as_ref().ok_or_else(|| {
            CryptoError::InvalidKeyEncoding("verification method carries no public key".to_owned())
        })?;
        let public_key = PublicKey::from_jwk(&jwk.key)?;

        match crypto::verify(algorithm, &public_key, self.shared.bytes_to_sign(), self.alleged_signature()) {
            Ok(()) => Ok(()),
            Err(CryptoError::BadSignature) => Err(UnacceptableDocumentError::new(
                "proof_incorrect_signature",
                "incorrect signature",
            )
            .into()),
            Err(CryptoError::KeyMismatch) => Err(UnacceptableDocumentError::new(
                "proof_wrong_signature_method",
                "declared JWS signature algorithm does not match the declared verification method",
            )
            .into()),
            Err(fault) => Err(fault.into()),
        }
    }
}

impl Deref for VerifyContext<'_> {
    type Target = SharedContext;

    fn deref(&self) -> &SharedContext {
        &self.shared
    }
}

impl DerefMut for VerifyContext<'_> {
    fn deref_mut(&mut self) -> &mut SharedContext {
        &mut self.shared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_did_with_key_splits_the_parts() {
        let mut shared = SharedContext::default();
        shared.set_did_with_key("did:setl:abc/p?q=1#key-7".parse().unwrap());
        assert_eq!(shared.did_with_key().uri(), "did:setl:abc/p?q=1#key-7");
        assert_eq!(shared.did_id().uri(), "did:setl:abc/p?q=1");
        assert_eq!(shared.key_id(), "key-7");
    }

    #[test]
    #[should_panic(expected = "fragment")]
    fn set_did_with_key_rejects_a_missing_fragment() {
        let mut shared = SharedContext::default();
        shared.set_did_with_key("did:setl:abc".parse().unwrap());
    }

    #[test]
    #[should_panic(expected = "not set yet")]
    fn reading_bytes_to_sign_before_set_is_a_contract_violation() {
        SharedContext::default().bytes_to_sign();
    }

    #[test]
    #[should_panic(expected = "'sign' must be invoked first")]
    fn signature_value_requires_a_prior_sign() {
        ProofContext::new().signature_value();
    }
}
