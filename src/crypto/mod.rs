//! Native key pairs and signature dispatch.
//!
//! The application supports many signature schemes over three key
//! families. This module gives them one interface: generate a key pair for
//! an algorithm, sign bytes, verify bytes, and convert between native
//! keys, DER `SubjectPublicKeyInfo`, and the JWK model. Consuming modules
//! never touch an individual curve implementation.

pub mod errors;

use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use rsa::signature::{RandomizedSigner, SignatureEncoding, Signer, Verifier};
use rsa::traits::PublicKeyParts;
use sha2::{Sha256, Sha384, Sha512};
use spki::EncodePublicKey;

use crate::jwk::alg::KeyGenParams;
use crate::jwk::{Bytes, Ec, EcCurves, Key, Okp, OkpCurves, Rsa as RsaJwk, SigningAlgorithm};

pub use errors::CryptoError;

/// A native public key for any supported curve or modulus.
#[derive(Clone, Debug, PartialEq)]
pub enum PublicKey {
    Rsa(rsa::RsaPublicKey),
    P256(p256::PublicKey),
    P384(p384::PublicKey),
    P521(p521::PublicKey),
    Secp256k1(k256::PublicKey),
    Ed25519(ed25519_dalek::VerifyingKey),
}

/// A native private key. The inner types zeroize their own material on drop.
#[derive(Clone)]
pub enum SecretKey {
    Rsa(rsa::RsaPrivateKey),
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
    P521(p521::ecdsa::SigningKey),
    Secp256k1(k256::ecdsa::SigningKey),
    Ed25519(ed25519_dalek::SigningKey),
}

/// A private key bound to the signing algorithm it will be used with.
pub struct KeyPair {
    algorithm: SigningAlgorithm,
    secret: SecretKey,
}

impl KeyPair {
    /// Generate a fresh key pair appropriate to the signing algorithm.
    pub fn generate(algorithm: SigningAlgorithm) -> Result<Self, CryptoError> {
        let params = algorithm
            .key_gen_params()
            .ok_or(CryptoError::UnsupportedAlgorithm("NONE"))?;

        let secret = match params {
            KeyGenParams::Rsa { modulus_bits } => {
                let exponent = rsa::BigUint::from(65537u32);
                let key = rsa::RsaPrivateKey::new_with_exp(&mut OsRng, modulus_bits, &exponent)
                    .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
                SecretKey::Rsa(key)
            }
            KeyGenParams::Ec(EcCurves::P256) => SecretKey::P256(p256::ecdsa::SigningKey::random(&mut OsRng)),
            KeyGenParams::Ec(EcCurves::P384) => SecretKey::P384(p384::ecdsa::SigningKey::random(&mut OsRng)),
            KeyGenParams::Ec(EcCurves::P521) => SecretKey::P521(p521::ecdsa::SigningKey::random(&mut OsRng)),
            KeyGenParams::Ec(EcCurves::Secp256k1) => {
                SecretKey::Secp256k1(k256::ecdsa::SigningKey::random(&mut OsRng))
            }
            KeyGenParams::Okp(OkpCurves::Ed25519) => {
                SecretKey::Ed25519(ed25519_dalek::SigningKey::generate(&mut OsRng))
            }
            KeyGenParams::Okp(OkpCurves::Ed448) => {
                return Err(CryptoError::UnsupportedAlgorithm("Ed448"));
            }
        };

        Ok(Self { algorithm, secret })
    }

    /// Bind an existing private key to a signing algorithm. The key family
    /// and curve must match the algorithm.
    pub fn from_secret(algorithm: SigningAlgorithm, secret: SecretKey) -> Result<Self, CryptoError> {
        if !is_compatible(algorithm, &secret) {
            return Err(CryptoError::KeyMismatch);
        }
        Ok(Self { algorithm, secret })
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    /// The public half of this key pair.
    pub fn public_key(&self) -> PublicKey {
        match &self.secret {
            SecretKey::Rsa(k) => PublicKey::Rsa(k.to_public_key()),
            SecretKey::P256(k) => PublicKey::P256(p256::PublicKey::from(*k.verifying_key())),
            SecretKey::P384(k) => PublicKey::P384(p384::PublicKey::from(*k.verifying_key())),
            SecretKey::P521(k) => {
                // p521 0.13 has no PublicKey<->SigningKey conversion; round-trip
                // through the SEC1 encoded point, which is lossless for a valid key.
                let point = p521::ecdsa::VerifyingKey::from(k).to_encoded_point(false);
                PublicKey::P521(
                    p521::PublicKey::from_sec1_bytes(point.as_bytes())
                        .expect("verifying key is a valid P-521 point"),
                )
            }
            SecretKey::Secp256k1(k) => PublicKey::Secp256k1(k256::PublicKey::from(*k.verifying_key())),
            SecretKey::Ed25519(k) => PublicKey::Ed25519(k.verifying_key()),
        }
    }
}

fn is_compatible(algorithm: SigningAlgorithm, secret: &SecretKey) -> bool {
    use SigningAlgorithm::*;
    matches!(
        (algorithm, secret),
        (RS256 | RS384 | RS512 | PS256 | PS384 | PS512, SecretKey::Rsa(_))
            | (ES256, SecretKey::P256(_))
            | (ES384, SecretKey::P384(_))
            | (ES512, SecretKey::P521(_))
            | (ES256K, SecretKey::Secp256k1(_))
            | (Ed25519, SecretKey::Ed25519(_))
    )
}

/// Sign a payload under the algorithm's native signature scheme.
pub fn sign(algorithm: SigningAlgorithm, secret: &SecretKey, payload: &[u8]) -> Result<Vec<u8>, CryptoError> {
    use SigningAlgorithm::*;

    let failed = |e: rsa::signature::Error| CryptoError::Signing(e.to_string());

    match (algorithm, secret) {
        (RS256, SecretKey::Rsa(k)) => {
            let signer = rsa::pkcs1v15::SigningKey::<Sha256>::new(k.clone());
            Ok(signer.try_sign(payload).map_err(failed)?.to_vec())
        }
        (RS384, SecretKey::Rsa(k)) => {
            let signer = rsa::pkcs1v15::SigningKey::<Sha384>::new(k.clone());
            Ok(signer.try_sign(payload).map_err(failed)?.to_vec())
        }
        (RS512, SecretKey::Rsa(k)) => {
            let signer = rsa::pkcs1v15::SigningKey::<Sha512>::new(k.clone());
            Ok(signer.try_sign(payload).map_err(failed)?.to_vec())
        }
        (PS256, SecretKey::Rsa(k)) => {
            let signer = rsa::pss::BlindedSigningKey::<Sha256>::new(k.clone());
            Ok(signer.try_sign_with_rng(&mut OsRng, payload).map_err(failed)?.to_vec())
        }
        (PS384, SecretKey::Rsa(k)) => {
            let signer = rsa::pss::BlindedSigningKey::<Sha384>::new(k.clone());
            Ok(signer.try_sign_with_rng(&mut OsRng, payload).map_err(failed)?.to_vec())
        }
        (PS512, SecretKey::Rsa(k)) => {
            let signer = rsa::pss::BlindedSigningKey::<Sha512>::new(k.clone());
            Ok(signer.try_sign_with_rng(&mut OsRng, payload).map_err(failed)?.to_vec())
        }
        (ES256, SecretKey::P256(k)) => {
            let signature: p256::ecdsa::Signature = k.try_sign(payload).map_err(failed)?;
            Ok(signature.to_vec())
        }
        (ES384, SecretKey::P384(k)) => {
            let signature: p384::ecdsa::Signature = k.try_sign(payload).map_err(failed)?;
            Ok(signature.to_vec())
        }
        (ES512, SecretKey::P521(k)) => {
            let signature: p521::ecdsa::Signature = k.try_sign(payload).map_err(failed)?;
            Ok(signature.to_vec())
        }
        (ES256K, SecretKey::Secp256k1(k)) => {
            let signature: k256::ecdsa::Signature = k.try_sign(payload).map_err(failed)?;
            Ok(signature.to_vec())
        }
        (Ed25519, SecretKey::Ed25519(k)) => {
            let signature = k.try_sign(payload).map_err(failed)?;
            Ok(signature.to_bytes().to_vec())
        }
        (Null, _) => Err(CryptoError::UnsupportedAlgorithm("NONE")),
        (Ed448, _) => Err(CryptoError::UnsupportedAlgorithm("Ed448")),
        _ => Err(CryptoError::KeyMismatch),
    }
}

/// Verify a signature under the algorithm's native signature scheme.
///
/// A signature that does not verify (including one that cannot be parsed
/// as a signature of the scheme) fails with [`CryptoError::BadSignature`];
/// a key from the wrong family fails with [`CryptoError::KeyMismatch`].
pub fn verify(
    algorithm: SigningAlgorithm,
    public: &PublicKey,
    payload: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    use SigningAlgorithm::*;

    match (algorithm, public) {
        (RS256, PublicKey::Rsa(k)) => {
            let verifier = rsa::pkcs1v15::VerifyingKey::<Sha256>::new(k.clone());
            let signature =
                rsa::pkcs1v15::Signature::try_from(signature).map_err(|_| CryptoError::BadSignature)?;
            verifier.verify(payload, &signature).map_err(|_| CryptoError::BadSignature)
        }
        (RS384, PublicKey::Rsa(k)) => {
            let verifier = rsa::pkcs1v15::VerifyingKey::<Sha384>::new(k.clone());
            let signature =
                rsa::pkcs1v15::Signature::try_from(signature).map_err(|_| CryptoError::BadSignature)?;
            verifier.verify(payload, &signature).map_err(|_| CryptoError::BadSignature)
        }
        (RS512, PublicKey::Rsa(k)) => {
            let verifier = rsa::pkcs1v15::VerifyingKey::<Sha512>::new(k.clone());
            let signature =
                rsa::pkcs1v15::Signature::try_from(signature).map_err(|_| CryptoError::BadSignature)?;
            verifier.verify(payload, &signature).map_err(|_| CryptoError::BadSignature)
        }
        (PS256, PublicKey::Rsa(k)) => {
            let verifier = rsa::pss::VerifyingKey::<Sha256>::new(k.clone());
            let signature = rsa::pss::Signature::try_from(signature).map_err(|_| CryptoError::BadSignature)?;
            verifier.verify(payload, &signature).map_err(|_| CryptoError::BadSignature)
        }
        (PS384, PublicKey::Rsa(k)) => {
            let verifier = rsa::pss::VerifyingKey::<Sha384>::new(k.clone());
            let signature = rsa::pss::Signature::try_from(signature).map_err(|_| CryptoError::BadSignature)?;
            verifier.verify(payload, &signature).map_err(|_| CryptoError::BadSignature)
        }
        (PS512, PublicKey::Rsa(k)) => {
            let verifier = rsa::pss::VerifyingKey::<Sha512>::new(k.clone());
            let signature = rsa::pss::Signature::try_from(signature).map_err(|_| CryptoError::BadSignature)?;
            verifier.verify(payload, &signature).map_err(|_| CryptoError::BadSignature)
        }
        (ES256, PublicKey::P256(k)) => {
            let verifier = p256::ecdsa::VerifyingKey::from(*k);
            let signature =
                p256::ecdsa::Signature::from_slice(signature).map_err(|_| CryptoError::BadSignature)?;
            verifier.verify(payload, &signature).map_err(|_| CryptoError::BadSignature)
        }
        (ES384, PublicKey::P384(k)) => {
            let verifier = p384::ecdsa::VerifyingKey::from(*k);
            let signature =
                p384::ecdsa::Signature::from_slice(signature).map_err(|_| CryptoError::BadSignature)?;
            verifier.verify(payload, &signature).map_err(|_| CryptoError::BadSignature)
        }
        (ES512, PublicKey::P521(k)) => {
            // p521 0.13 has no PublicKey -> ecdsa::VerifyingKey conversion; round-trip
            // through the SEC1 encoded point, which is lossless for a valid key.
            let verifier =
                p521::ecdsa::VerifyingKey::from_sec1_bytes(k.to_encoded_point(false).as_bytes())
                    .map_err(|_| CryptoError::BadSignature)?;
            let signature =
                p521::ecdsa::Signature::from_slice(signature).map_err(|_| CryptoError::BadSignature)?;
            verifier.verify(payload, &signature).map_err(|_| CryptoError::BadSignature)
        }
        (ES256K, PublicKey::Secp256k1(k)) => {
            let verifier = k256::ecdsa::VerifyingKey::from(*k);
            let signature =
                k256::ecdsa::Signature::from_slice(signature).map_err(|_| CryptoError::BadSignature)?;
            verifier.verify(payload, &signature).map_err(|_| CryptoError::BadSignature)
        }
        (Ed25519, PublicKey::Ed25519(k)) => {
            let signature =
                ed25519_dalek::Signature::from_slice(signature).map_err(|_| CryptoError::BadSignature)?;
            k.verify(payload, &signature).map_err(|_| CryptoError::BadSignature)
        }
        (Null, _) => Err(CryptoError::UnsupportedAlgorithm("NONE")),
        (Ed448, _) => Err(CryptoError::UnsupportedAlgorithm("Ed448")),
        _ => Err(CryptoError::KeyMismatch),
    }
}

impl PublicKey {
    /// The DER `SubjectPublicKeyInfo` encoding of this key.
    pub fn to_der(&self) -> Result<Vec<u8>, CryptoError> {
        let document = match self {
            PublicKey::Rsa(k) => k.to_public_key_der(),
            PublicKey::P256(k) => k.to_public_key_der(),
            PublicKey::P384(k) => k.to_public_key_der(),
            PublicKey::P521(k) => k.to_public_key_der(),
            PublicKey::Secp256k1(k) => k.to_public_key_der(),
            PublicKey::Ed25519(k) => k.to_public_key_der(),
        }
        .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?;
        Ok(document.as_bytes().to_vec())
    }

    /// The JWK body for this key, with coordinates and integers in their
    /// canonical encodings.
    pub fn to_jwk(&self) -> Result<Key, CryptoError> {
        match self {
            PublicKey::Rsa(k) => Ok(Key::Rsa(RsaJwk {
                n: Bytes::minimal(&k.n().to_bytes_be()),
                e: Bytes::minimal(&k.e().to_bytes_be()),
            })),
            PublicKey::P256(k) => ec_jwk(EcCurves::P256, k.to_encoded_point(false).as_bytes()),
            PublicKey::P384(k) => ec_jwk(EcCurves::P384, k.to_encoded_point(false).as_bytes()),
            PublicKey::P521(k) => ec_jwk(EcCurves::P521, k.to_encoded_point(false).as_bytes()),
            PublicKey::Secp256k1(k) => ec_jwk(EcCurves::Secp256k1, k.to_encoded_point(false).as_bytes()),
            PublicKey::Ed25519(k) => Ok(Key::Okp(Okp {
                crv: OkpCurves::Ed25519,
                x: Bytes::new(k.to_bytes().to_vec()),
            })),
        }
    }

    /// Reconstruct a native public key from a JWK body. This is the inverse
    /// of [`PublicKey::to_jwk`].
    pub fn from_jwk(key: &Key) -> Result<Self, CryptoError> {
        match key {
            Key::Ec(ec) => {
                let width = ec.crv.field_size();
                if ec.x.len() != width || ec.y.len() != width {
                    return Err(CryptoError::InvalidKeyEncoding(format!(
                        "{} coordinates must be exactly {width} bytes",
                        ec.crv.name()
                    )));
                }

                let mut sec1 = Vec::with_capacity(1 + 2 * width);
                sec1.push(0x04);
                sec1.extend_from_slice(&ec.x);
                sec1.extend_from_slice(&ec.y);

                let off_curve =
                    |_| CryptoError::InvalidKeyEncoding(format!("point is not on curve {}", ec.crv.name()));
                match ec.crv {
                    EcCurves::P256 => p256::PublicKey::from_sec1_bytes(&sec1)
                        .map(PublicKey::P256)
                        .map_err(off_curve),
                    EcCurves::P384 => p384::PublicKey::from_sec1_bytes(&sec1)
                        .map(PublicKey::P384)
                        .map_err(off_curve),
                    EcCurves::P521 => p521::PublicKey::from_sec1_bytes(&sec1)
                        .map(PublicKey::P521)
                        .map_err(off_curve),
                    EcCurves::Secp256k1 => k256::PublicKey::from_sec1_bytes(&sec1)
                        .map(PublicKey::Secp256k1)
                        .map_err(off_curve),
                }
            }
            Key::Okp(okp) => match okp.crv {
                OkpCurves::Ed25519 => {
                    let bytes: [u8; 32] = okp.x.as_slice().try_into().map_err(|_| {
                        CryptoError::InvalidKeyEncoding("Ed25519 public key must be 32 bytes".to_owned())
                    })?;
                    ed25519_dalek::VerifyingKey::from_bytes(&bytes)
                        .map(PublicKey::Ed25519)
                        .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))
                }
                OkpCurves::Ed448 => Err(CryptoError::UnsupportedAlgorithm("Ed448")),
            },
            Key::Rsa(jwk) => {
                let n = rsa::BigUint::from_bytes_be(&jwk.n);
                let e = rsa::BigUint::from_bytes_be(&jwk.e);
                rsa::RsaPublicKey::new(n, e)
                    .map(PublicKey::Rsa)
                    .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))
            }
        }
    }
}

fn ec_jwk(crv: EcCurves, sec1: &[u8]) -> Result<Key, CryptoError> {
    let width = crv.field_size();
    // Uncompressed SEC1: 0x04 || x || y.
    if sec1.len() != 1 + 2 * width || sec1[0] != 0x04 {
        return Err(CryptoError::InvalidKeyEncoding(format!(
            "not an uncompressed {} point",
            crv.name()
        )));
    }
    Ok(Key::Ec(Ec {
        crv,
        x: Bytes::fixed_width(&sec1[1..1 + width], width),
        y: Bytes::fixed_width(&sec1[1 + width..], width),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwk::KeyType;

    // Algorithms with a live native backend that is fast enough to
    // exercise key generation in a test run.
    const FAST_ALGORITHMS: [SigningAlgorithm; 5] = [
        SigningAlgorithm::ES256,
        SigningAlgorithm::ES256K,
        SigningAlgorithm::ES384,
        SigningAlgorithm::ES512,
        SigningAlgorithm::Ed25519,
    ];

    #[test]
    fn sign_and_verify_round_trip() {
        for algorithm in FAST_ALGORITHMS {
            let pair = KeyPair::generate(algorithm).unwrap();
            let signature = sign(algorithm, pair.secret(), b"payload").unwrap();
            verify(algorithm, &pair.public_key(), b"payload", &signature).unwrap();
        }
    }

    #[test]
    fn tampered_payload_is_rejected() {
        for algorithm in FAST_ALGORITHMS {
            let pair = KeyPair::generate(algorithm).unwrap();
            let signature = sign(algorithm, pair.secret(), b"payload").unwrap();
            let err = verify(algorithm, &pair.public_key(), b"payloaD", &signature).unwrap_err();
            assert!(matches!(err, CryptoError::BadSignature), "{algorithm}: {err:?}");
        }
    }

    #[test]
    fn jwk_conversion_round_trips_key_bytes_exactly() {
        for algorithm in FAST_ALGORITHMS {
            let pair = KeyPair::generate(algorithm).unwrap();
            let public = pair.public_key();
            let der = public.to_der().unwrap();

            let jwk = public.to_jwk().unwrap();
            assert_eq!(Some(jwk.key_type()), algorithm.key_type());

            let rebuilt = PublicKey::from_jwk(&jwk).unwrap();
            assert_eq!(rebuilt.to_der().unwrap(), der, "{algorithm}");
        }
    }

    #[test]
    fn wrong_key_family_is_a_mismatch_not_a_bad_signature() {
        let ec_pair = KeyPair::generate(SigningAlgorithm::ES256).unwrap();
        let ed_pair = KeyPair::generate(SigningAlgorithm::Ed25519).unwrap();
        let signature = sign(SigningAlgorithm::ES256, ec_pair.secret(), b"data").unwrap();

        let err = verify(SigningAlgorithm::ES256, &ed_pair.public_key(), b"data", &signature).unwrap_err();
        assert!(matches!(err, CryptoError::KeyMismatch));

        let err = sign(SigningAlgorithm::Ed25519, ec_pair.secret(), b"data").unwrap_err();
        assert!(matches!(err, CryptoError::KeyMismatch));
    }

    #[test]
    fn sentinel_and_ed448_never_sign_or_verify() {
        let pair = KeyPair::generate(SigningAlgorithm::Ed25519).unwrap();
        assert!(matches!(
            sign(SigningAlgorithm::Null, pair.secret(), b"x"),
            Err(CryptoError::UnsupportedAlgorithm("NONE"))
        ));
        assert!(matches!(
            KeyPair::generate(SigningAlgorithm::Ed448),
            Err(CryptoError::UnsupportedAlgorithm("Ed448"))
        ));
        assert!(matches!(
            KeyPair::generate(SigningAlgorithm::Null),
            Err(CryptoError::UnsupportedAlgorithm("NONE"))
        ));
    }

    #[test]
    fn from_secret_enforces_family_and_curve() {
        let pair = KeyPair::generate(SigningAlgorithm::ES256).unwrap();
        let secret = pair.secret().clone();
        assert!(KeyPair::from_secret(SigningAlgorithm::ES256, secret.clone()).is_ok());
        assert!(matches!(
            KeyPair::from_secret(SigningAlgorithm::ES384, secret),
            Err(CryptoError::KeyMismatch)
        ));
    }

    #[test]
    fn malformed_jwk_coordinates_fail_with_invalid_key_encoding() {
        let short = Key::Ec(Ec {
            crv: EcCurves::P256,
            x: Bytes::new(vec![1u8; 16]),
            y: Bytes::new(vec![2u8; 32]),
        });
        assert!(matches!(
            PublicKey::from_jwk(&short),
            Err(CryptoError::InvalidKeyEncoding(_))
        ));

        // Correct widths but not a point on the curve.
        let off_curve = Key::Ec(Ec {
            crv: EcCurves::P256,
            x: Bytes::new(vec![0u8; 32]),
            y: Bytes::new(vec![1u8; 32]),
        });
        assert!(matches!(
            PublicKey::from_jwk(&off_curve),
            Err(CryptoError::InvalidKeyEncoding(_))
        ));
        assert_eq!(off_curve.key_type(), KeyType::Ec);
    }
}
