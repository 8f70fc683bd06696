//! The registry of JWS signing algorithms this crate understands.
//!
//! See <https://www.iana.org/assignments/jose/jose.xhtml#web-signature-encryption-algorithms>

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::log_safe;
use crate::crypto::CryptoError;
use crate::jwk::ec::EcCurves;
use crate::jwk::key_type::KeyType;
use crate::jwk::okp::OkpCurves;

/// Key-generation parameters for a signing algorithm.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyGenParams {
    /// RSA modulus size in bits; the public exponent is always 65537.
    Rsa { modulus_bits: usize },
    /// An ECDSA named curve.
    Ec(EcCurves),
    /// An Edwards curve.
    Okp(OkpCurves),
}

/// A JWS signature scheme.
///
/// `Null` is a sentinel for "no valid algorithm" (JWK name `NONE`); it can
/// be parsed, but it is never accepted for signing or verification.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum SigningAlgorithm {
    RS256,
    RS384,
    RS512,
    PS256,
    PS384,
    PS512,
    ES256K,
    ES256,
    ES384,
    ES512,
    Ed25519,
    Ed448,
    Null,
}

use SigningAlgorithm::*;

/// Every registered algorithm, in registry order.
pub const ALL: [SigningAlgorithm; 13] = [
    RS256, RS384, RS512, PS256, PS384, PS512, ES256K, ES256, ES384, ES512, Ed25519, Ed448, Null,
];

impl SigningAlgorithm {
    /// Look up an algorithm by its JWK name, ignoring case.
    pub fn from_jwk_name(jwk_name: &str) -> Result<Self, CryptoError> {
        ALL.iter()
            .copied()
            .find(|alg| alg.jwk_name().eq_ignore_ascii_case(jwk_name))
            .ok_or_else(|| CryptoError::UnknownAlgorithm(log_safe(jwk_name)))
    }

    /// The name used in the `alg` member of a JWS header.
    pub fn jwk_name(&self) -> &'static str {
        match self {
            RS256 => "RS256",
            RS384 => "RS384",
            RS512 => "RS512",
            PS256 => "PS256",
            PS384 => "PS384",
            PS512 => "PS512",
            ES256K => "ES256K",
            ES256 => "ES256",
            ES384 => "ES384",
            ES512 => "ES512",
            Ed25519 => "Ed25519",
            Ed448 => "Ed448",
            Null => "NONE",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RS256 => "RSASSA-PKCS-v1_5 using SHA-256",
            RS384 => "RSASSA-PKCS-v1_5 using SHA-384",
            RS512 => "RSASSA-PKCS-v1_5 using SHA-512",
            PS256 => "RSASSA-PSS using SHA-256 and MGF1 with SHA-256",
            PS384 => "RSASSA-PSS using SHA-384 and MGF1 with SHA-384",
            PS512 => "RSASSA-PSS using SHA-512 and MGF1 with SHA-512",
            ES256K => "ECDSA using secp256k1 and SHA-256",
            ES256 => "ECDSA using P-256 and SHA-256",
            ES384 => "ECDSA using P-384 and SHA-384",
            ES512 => "ECDSA using P-521 and SHA-512",
            Ed25519 => "EdDSA signature algorithm with Curve25519",
            Ed448 => "EdDSA signature algorithm with Curve448",
            Null => "An invalid or deleted entry",
        }
    }

    /// The key family this algorithm signs with, or `None` for the sentinel.
    pub fn key_type(&self) -> Option<KeyType> {
        match self {
            RS256 | RS384 | RS512 | PS256 | PS384 | PS512 => Some(KeyType::Rsa),
            ES256K | ES256 | ES384 | ES512 => Some(KeyType::Ec),
            Ed25519 | Ed448 => Some(KeyType::Okp),
            Null => None,
        }
    }

    /// Parameters for generating a key pair appropriate to this algorithm,
    /// or `None` for the sentinel.
    pub fn key_gen_params(&self) -> Option<KeyGenParams> {
        match self {
            RS256 | PS256 => Some(KeyGenParams::Rsa { modulus_bits: 3072 }),
            RS384 | PS384 => Some(KeyGenParams::Rsa { modulus_bits: 7680 }),
            RS512 | PS512 => Some(KeyGenParams::Rsa { modulus_bits: 15360 }),
            ES256K => Some(KeyGenParams::Ec(EcCurves::Secp256k1)),
            ES256 => Some(KeyGenParams::Ec(EcCurves::P256)),
            ES384 => Some(KeyGenParams::Ec(EcCurves::P384)),
            ES512 => Some(KeyGenParams::Ec(EcCurves::P521)),
            Ed25519 => Some(KeyGenParams::Okp(OkpCurves::Ed25519)),
            Ed448 => Some(KeyGenParams::Okp(OkpCurves::Ed448)),
            Null => None,
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.jwk_name())
    }
}

impl Serialize for SigningAlgorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.jwk_name())
    }
}

impl<'de> Deserialize<'de> for SigningAlgorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        SigningAlgorithm::from_jwk_name(&name).map_err(D::Error::custom)
    }
}
