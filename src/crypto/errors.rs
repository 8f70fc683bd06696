use thiserror::Error;

/// The set of errors that can occur during key and signature operations.
#[derive(Debug, Clone, Error)]
pub enum CryptoError {
    /// The named signature algorithm is not in the registry.
    #[error("unknown signature algorithm: {0}")]
    UnknownAlgorithm(String),

    /// The algorithm is registered but has no native implementation.
    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(&'static str),

    /// Key material could not be decoded into a usable key.
    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    /// The key does not belong to the signature algorithm's key family.
    #[error("key does not match the signature algorithm")]
    KeyMismatch,

    /// The signature did not verify against the payload.
    #[error("signature rejected")]
    BadSignature,

    /// Key generation failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Producing a signature failed.
    #[error("signing failed: {0}")]
    Signing(String),
}
