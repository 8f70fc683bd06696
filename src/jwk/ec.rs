use serde::{Deserialize, Serialize};

use crate::jwk::bytes::Bytes;

/// An elliptic-curve public key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ec {
    /// The elliptic curve identifier.
    pub crv: EcCurves,

    /// The public x coordinate, zero-padded to the curve field width.
    pub x: Bytes,

    /// The public y coordinate, zero-padded to the curve field width.
    pub y: Bytes,
}

/// The elliptic curve.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EcCurves {
    /// P-256
    #[serde(rename = "P-256")]
    P256,

    /// P-384
    #[serde(rename = "P-384")]
    P384,

    /// P-521
    #[serde(rename = "P-521")]
    P521,

    /// secp256k1
    #[serde(rename = "secp256k1")]
    Secp256k1,
}

impl EcCurves {
    /// The width of one field element in bytes: `ceil(field_bits / 8)`.
    pub fn field_size(&self) -> usize {
        match self {
            EcCurves::P256 | EcCurves::Secp256k1 => 32,
            EcCurves::P384 => 48,
            EcCurves::P521 => 66,
        }
    }

    /// The curve name used in the `crv` member.
    pub fn name(&self) -> &'static str {
        match self {
            EcCurves::P256 => "P-256",
            EcCurves::P384 => "P-384",
            EcCurves::P521 => "P-521",
            EcCurves::Secp256k1 => "secp256k1",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_names_match_the_wire_form() {
        for crv in [EcCurves::P256, EcCurves::P384, EcCurves::P521, EcCurves::Secp256k1] {
            let json = serde_json::to_string(&crv).unwrap();
            assert_eq!(json, format!("\"{}\"", crv.name()));
        }
    }

    #[test]
    fn p521_field_width_covers_the_odd_bit() {
        // 521 bits is 65 bytes plus one extra bit.
        assert_eq!(EcCurves::P521.field_size(), 66);
    }
}
