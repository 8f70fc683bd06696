use serde::{Deserialize, Serialize};

use crate::jwk::bytes::Bytes;

/// An octet key pair public key (CFRG Edwards curves, RFC 8037).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Okp {
    /// The Edwards curve identifier.
    pub crv: OkpCurves,

    /// The raw public key bytes.
    pub x: Bytes,
}

/// The Edwards curve.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OkpCurves {
    Ed25519,
    Ed448,
}

impl OkpCurves {
    pub fn name(&self) -> &'static str {
        match self {
            OkpCurves::Ed25519 => "Ed25519",
            OkpCurves::Ed448 => "Ed448",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_uses_curve_and_raw_bytes() {
        let okp = Okp {
            crv: OkpCurves::Ed25519,
            x: Bytes::new(vec![1u8; 32]),
        };
        let json = serde_json::to_value(&okp).unwrap();
        assert_eq!(json["crv"], "Ed25519");
        assert_eq!(json["x"].as_str().unwrap().len(), 43); // 32 bytes, unpadded
    }
}
