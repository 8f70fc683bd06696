//! Types and utilities for handling JSON Web Keys (JWKs).
//!
//! ## Submodules
//!
//! - [`alg`]:      The signing-algorithm registry (RFC 7518 names).
//! - [`bytes`]:    Byte sequences serialized as unpadded base64url.
//! - [`ec`]:       Elliptic-curve keys.
//! - [`factory`]:  Building JWKs from DER-encoded public keys.
//! - [`jwk`]:      The JWK container and its `kty`-tagged key union.
//! - [`key_type`]: The closed set of key families.
//! - [`okp`]:      Octet key pairs (Ed25519, Ed448).
//! - [`rsa`]:      RSA keys.

pub mod alg;
pub mod bytes;
pub mod ec;
pub mod factory;
pub mod jwk;
pub mod key_type;
pub mod okp;
pub mod rsa;

// Re-exports
pub use alg::{KeyGenParams, SigningAlgorithm};
pub use bytes::Bytes;
pub use ec::{Ec, EcCurves};
pub use factory::JwkFactory;
pub use jwk::{Key, Parameters, PublicKeyJwk};
pub use key_type::KeyType;
pub use okp::{Okp, OkpCurves};
pub use rsa::Rsa;
