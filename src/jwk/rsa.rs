use serde::{Deserialize, Serialize};

use crate::jwk::bytes::Bytes;

/// An RSA public key. Both integers are minimal big-endian encodings: any
/// leading zero sign byte is stripped before base64url encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rsa {
    /// The modulus.
    pub n: Bytes,

    /// The public exponent.
    pub e: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_uses_n_and_e() {
        let rsa = Rsa {
            n: Bytes::minimal(&[0x00, 0xc0, 0xff, 0xee]),
            e: Bytes::minimal(&[0x01, 0x00, 0x01]),
        };
        let json = serde_json::to_value(&rsa).unwrap();
        assert_eq!(json["n"], "wP_u");
        assert_eq!(json["e"], "AQAB");
    }
}
