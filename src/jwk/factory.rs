//! Building JWKs from DER-encoded public keys.
//!
//! A DER `SubjectPublicKeyInfo` names its algorithm by OID. The factory
//! holds a table from OID to maker function; when the algorithm OID itself
//! has no entry and the algorithm parameters are a lone OID (as they are
//! for named elliptic curves), a second match is attempted on that
//! parameter. The table is a value with copy-on-write update so concurrent
//! readers always observe a complete table, never a partial one.

use std::collections::BTreeMap;
use std::sync::Arc;

use spki::{DecodePublicKey, ObjectIdentifier, SubjectPublicKeyInfoRef};

use crate::crypto::{CryptoError, PublicKey};
use crate::jwk::bytes::Bytes;
use crate::jwk::jwk::Key;
use crate::jwk::okp::{Okp, OkpCurves};

/// Converts a DER `SubjectPublicKeyInfo` into a JWK body.
pub type JwkMaker = fn(&[u8]) -> Result<Key, CryptoError>;

pub const OID_RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
pub const OID_ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");
pub const OID_ED448: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.113");
pub const OID_SECP256R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
pub const OID_SECP256K1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.10");
pub const OID_SECP384R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
pub const OID_SECP521R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.35");

/// The OID-keyed registry of JWK makers.
#[derive(Clone)]
pub struct JwkFactory {
    makers: Arc<BTreeMap<ObjectIdentifier, JwkMaker>>,
}

impl Default for JwkFactory {
    fn default() -> Self {
        Self::standard()
    }
}

impl JwkFactory {
    /// The standard table: RSA, the four ECDSA curves, Ed25519 and Ed448.
    pub fn standard() -> Self {
        let mut makers: BTreeMap<ObjectIdentifier, JwkMaker> = BTreeMap::new();
        makers.insert(OID_RSA_ENCRYPTION, rsa_maker);
        makers.insert(OID_ED25519, ed25519_maker);
        makers.insert(OID_ED448, ed448_maker);
        makers.insert(OID_SECP256R1, p256_maker);
        makers.insert(OID_SECP256K1, secp256k1_maker);
        makers.insert(OID_SECP384R1, p384_maker);
        makers.insert(OID_SECP521R1, p521_maker);
        Self { makers: Arc::new(makers) }
    }

    /// A copy of this factory with one entry added or replaced. Existing
    /// clones keep the table they already hold.
    pub fn with_maker(&self, oid: ObjectIdentifier, maker: JwkMaker) -> Self {
        let mut makers = (*self.makers).clone();
        makers.insert(oid, maker);
        Self { makers: Arc::new(makers) }
    }

    /// A copy of this factory with the whole table replaced.
    pub fn with_table(makers: BTreeMap<ObjectIdentifier, JwkMaker>) -> Self {
        Self { makers: Arc::new(makers) }
    }

    /// Build the JWK body for a DER-encoded public key.
    pub fn key_from_der(&self, der: &[u8]) -> Result<Key, CryptoError> {
        let info = SubjectPublicKeyInfoRef::try_from(der)
            .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?;

        let algorithm_oid = info.algorithm.oid;
        let maker = self.makers.get(&algorithm_oid).copied().or_else(|| {
            // No match on the algorithm itself; elliptic curves carry the
            // curve OID as the algorithm parameter.
            info.algorithm
                .parameters_oid()
                .ok()
                .and_then(|curve| self.makers.get(&curve).copied())
        });

        match maker {
            Some(make) => make(der),
            None => Err(CryptoError::UnknownAlgorithm(algorithm_oid.to_string())),
        }
    }
}

fn invalid(e: impl std::fmt::Display) -> CryptoError {
    CryptoError::InvalidKeyEncoding(e.to_string())
}

fn rsa_maker(der: &[u8]) -> Result<Key, CryptoError> {
    let key = rsa::RsaPublicKey::from_public_key_der(der).map_err(invalid)?;
    PublicKey::Rsa(key).to_jwk()
}

fn ed25519_maker(der: &[u8]) -> Result<Key, CryptoError> {
    let key = ed25519_dalek::VerifyingKey::from_public_key_der(der).map_err(invalid)?;
    PublicKey::Ed25519(key).to_jwk()
}

fn ed448_maker(der: &[u8]) -> Result<Key, CryptoError> {
    // No native Ed448 backend; the JWK is built from the raw key bits.
    let info = SubjectPublicKeyInfoRef::try_from(der).map_err(invalid)?;
    let raw = info
        .subject_public_key
        .as_bytes()
        .ok_or_else(|| CryptoError::InvalidKeyEncoding("Ed448 key bits are not octet-aligned".to_owned()))?;
    Ok(Key::Okp(Okp {
        crv: OkpCurves::Ed448,
        x: Bytes::new(raw.to_vec()),
    }))
}

fn p256_maker(der: &[u8]) -> Result<Key, CryptoError> {
    let key = p256::PublicKey::from_public_key_der(der).map_err(invalid)?;
    PublicKey::P256(key).to_jwk()
}

fn p384_maker(der: &[u8]) -> Result<Key, CryptoError> {
    let key = p384::PublicKey::from_public_key_der(der).map_err(invalid)?;
    PublicKey::P384(key).to_jwk()
}

fn p521_maker(der: &[u8]) -> Result<Key, CryptoError> {
    let key = p521::PublicKey::from_public_key_der(der).map_err(invalid)?;
    PublicKey::P521(key).to_jwk()
}

fn secp256k1_maker(der: &[u8]) -> Result<Key, CryptoError> {
    let key = k256::PublicKey::from_public_key_der(der).map_err(invalid)?;
    PublicKey::Secp256k1(key).to_jwk()
}
