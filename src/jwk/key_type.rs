use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::log_safe;
use crate::crypto::CryptoError;

/// The family a JWK belongs to. Serializes to lowercase and parses
/// case-insensitively.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// Elliptic curve. See RFC 7517.
    #[serde(rename = "ec", alias = "EC", alias = "Ec")]
    Ec,

    /// Octet key pair, used for the Edwards curves. See RFC 8037.
    #[serde(rename = "okp", alias = "OKP", alias = "Okp")]
    Okp,

    /// Rivest-Shamir-Adleman key. See RFC 7517.
    #[serde(rename = "rsa", alias = "RSA", alias = "Rsa")]
    Rsa,
}

impl KeyType {
    /// The lowercase identifier used on the wire.
    pub fn id(&self) -> &'static str {
        match self {
            KeyType::Ec => "ec",
            KeyType::Okp => "okp",
            KeyType::Rsa => "rsa",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for KeyType {
    type Err = CryptoError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        match id.to_ascii_lowercase().as_str() {
            "ec" => Ok(KeyType::Ec),
            "okp" => Ok(KeyType::Okp),
            "rsa" => Ok(KeyType::Rsa),
            _ => Err(CryptoError::UnknownAlgorithm(log_safe(id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_lowercase() {
        assert_eq!(serde_json::to_string(&KeyType::Okp).unwrap(), r#""okp""#);
    }

    #[test]
    fn parses_case_insensitively() {
        for id in ["ec", "EC", "Ec", "eC"] {
            assert_eq!(id.parse::<KeyType>().unwrap(), KeyType::Ec);
        }
        assert!("dsa".parse::<KeyType>().is_err());
    }

    #[test]
    fn round_trips_through_json() {
        for kty in [KeyType::Ec, KeyType::Okp, KeyType::Rsa] {
            let text = serde_json::to_string(&kty).unwrap();
            assert_eq!(serde_json::from_str::<KeyType>(&text).unwrap(), kty);
        }
        assert_eq!(serde_json::from_str::<KeyType>(r#""RSA""#).unwrap(), KeyType::Rsa);
    }
}
