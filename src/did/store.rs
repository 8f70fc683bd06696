use thiserror::Error;

use crate::did::didcore::DidDocument;
use crate::did::didid::DidId;

/// A failure to produce a DID document from the store.
#[derive(Debug, Clone, Error)]
pub enum DidStoreError {
    /// The store has no document for the identifier.
    #[error("DID document not found: {0}")]
    NotFound(String),

    /// The store itself failed. Callers wanting retry semantics implement
    /// them inside their store; the verification layer treats this the
    /// same as an unknown DID.
    #[error("DID store failure: {0}")]
    Store(String),
}

/// The source of DID documents consulted during verification.
///
/// The identifier passed to [`DidStore::fetch`] never carries a fragment;
/// the fragment selects a verification method inside the fetched document
/// and is resolved by the caller.
pub trait DidStore {
    fn fetch(&self, did: &DidId) -> Result<DidDocument, DidStoreError>;
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct MapStore(HashMap<String, DidDocument>);

    impl DidStore for MapStore {
        fn fetch(&self, did: &DidId) -> Result<DidDocument, DidStoreError> {
            self.0
                .get(did.uri())
                .cloned()
                .ok_or_else(|| DidStoreError::NotFound(did.uri().to_owned()))
        }
    }

    #[test]
    fn fetch_by_fragmentless_identifier() {
        let doc = DidDocument::new("did:setl:abc");
        let store = MapStore(HashMap::from([("did:setl:abc".to_owned(), doc.clone())]));

        let did: DidId = "did:setl:abc#key-1".parse().unwrap();
        let fetched = store.fetch(&did.without_fragment()).unwrap();
        assert_eq!(fetched, doc);

        let missing: DidId = "did:setl:unknown".parse().unwrap();
        assert!(matches!(store.fetch(&missing), Err(DidStoreError::NotFound(_))));
    }
}
