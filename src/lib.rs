//! Issue and verify cryptographically signed, self-describing documents
//! whose signer identity is resolved through a DID document rather than a
//! central PKI.
//!
//! ## Modules
//!
//! - [`canon`]:      Deterministic JSON serialization used as the signing payload.
//! - [`constants`]:  Shared constants plus the injectable clock and log-sanitizer hooks.
//! - [`crypto`]:     Native key pairs and multi-algorithm signature dispatch.
//! - [`did`]:        DID grammar validation, identifier decomposition, DID documents.
//! - [`errors`]:     The structured document-rejection error.
//! - [`jwk`]:        Key types, the signing-algorithm registry, and JSON Web Keys.
//! - [`proof`]:      Detached-JWS proofs over canonical JSON.
//! - [`revocation`]: The revocation checker consumed during credential verification.
//! - [`vc`]:         Verifiable credentials, presentations, and their pipelines.

pub mod canon;
pub mod constants;
pub mod crypto;
pub mod did;
pub mod errors;
pub mod jwk;
pub mod proof;
pub mod revocation;
pub mod vc;
