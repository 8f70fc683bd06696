//! Detached-JWS proofs over canonical JSON.

pub mod canonical_jws;
pub mod context;
pub mod model;
pub mod salt;

use thiserror::Error;

use crate::canon::CanonError;
use crate::crypto::CryptoError;
use crate::errors::UnacceptableDocumentError;

// public re-exports
pub use canonical_jws::{CanonicalJsonWithJws, CryptoProver, PROOF_TYPE_CANONICAL_JSON_WITH_JWS};
pub use context::{ProofContext, SharedContext, VerifyContext};
pub use model::Proof;

/// A failure while attaching or verifying a proof.
///
/// `Document` is an ordinary rejection with a stable reason code. The
/// other variants are cryptographic-provider or serialization faults:
/// fatal on the signing path, and folded into a `document_proof_error`
/// rejection by the verification pipeline.
#[derive(Debug, Error)]
pub enum ProofError {
    #[error(transparent)]
    Document(#[from] UnacceptableDocumentError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Canonical(#[from] CanonError),
}
