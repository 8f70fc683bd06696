//! Shared fixtures: an in-memory DID store and issuer setup.

use std::collections::HashMap;

use vc_utils::crypto::KeyPair;
use vc_utils::did::{DidDocument, DidId, DidStore, DidStoreError, KeyUsage, VerificationMethod};
use vc_utils::jwk::{PublicKeyJwk, SigningAlgorithm};

pub struct MemoryDidStore {
    documents: HashMap<String, DidDocument>,
}

impl MemoryDidStore {
    pub fn new() -> Self {
        Self { documents: HashMap::new() }
    }

    pub fn put(&mut self, document: DidDocument) {
        self.documents.insert(document.id.clone(), document);
    }
}

impl DidStore for MemoryDidStore {
    fn fetch(&self, did: &DidId) -> Result<DidDocument, DidStoreError> {
        self.documents
            .get(did.uri())
            .cloned()
            .ok_or_else(|| DidStoreError::NotFound(did.uri().to_owned()))
    }
}

pub struct Issuer {
    pub did: String,
    pub key_url: String,
    pub key_pair: KeyPair,
}

/// Generate a key pair for the algorithm and register its verification
/// method in the store under `did` with the given key fragment.
pub fn register_issuer(
    store: &mut MemoryDidStore,
    algorithm: SigningAlgorithm,
    did: &str,
    fragment: &str,
) -> Issuer {
    let key_pair = KeyPair::generate(algorithm).expect("key generation");
    let key_url = format!("{did}#{fragment}");

    let jwk = PublicKeyJwk::new(key_pair.public_key().to_jwk().expect("public key to JWK"))
        .with_key_id(&key_url);
    let mut method = VerificationMethod {
        controller: vec![did.to_owned()],
        ..VerificationMethod::default()
    };
    method.set_public_key_jwk(jwk);

    let mut document = DidDocument::new(did);
    document.add_verification_method(method, [KeyUsage::Assertion]);
    store.put(document);

    Issuer {
        did: did.to_owned(),
        key_url,
        key_pair,
    }
}
