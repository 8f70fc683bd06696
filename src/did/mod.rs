//! Decentralized identifiers: grammar validation, identifier
//! decomposition, the DID document model, and the store the verification
//! layer resolves documents from.

pub mod didcore;
pub mod didid;
pub mod store;
pub mod validate;

pub use didcore::{Context, DidDocument, KeyUsage, VerificationMethod};
pub use didid::DidId;
pub use store::{DidStore, DidStoreError};
pub use validate::{validate_did_uri, validate_did_url, DidSyntaxError, Presence};
