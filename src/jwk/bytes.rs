//! Byte sequences that serialize as unpadded base64url, plus the integer
//! canonicalization rules shared by the EC and RSA key encodings.

use std::fmt;
use std::ops::Deref;

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An octet string represented on the wire as base64url without padding.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// A big-endian unsigned integer padded, or stripped of a leading sign
    /// byte, to exactly `width` bytes. This is the encoding required of EC
    /// point coordinates.
    pub fn fixed_width(value: &[u8], width: usize) -> Self {
        let mut out = vec![0u8; width];
        if value.len() < width {
            out[width - value.len()..].copy_from_slice(value);
        } else {
            out.copy_from_slice(&value[value.len() - width..]);
        }
        Self(out)
    }

    /// A big-endian unsigned integer with any leading zero bytes stripped,
    /// as required of RSA parameters. Zero encodes as a single zero byte.
    pub fn minimal(value: &[u8]) -> Self {
        let start = value
            .iter()
            .position(|b| *b != 0)
            .unwrap_or(value.len().saturating_sub(1));
        Self(value[start..].to_vec())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn to_base64url(&self) -> String {
        Base64UrlUnpadded::encode_string(&self.0)
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes({})", self.to_base64url())
    }
}

impl Serialize for Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64url())
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Base64UrlUnpadded::decode_vec(&text)
            .map(Self)
            .map_err(|_| D::Error::custom("invalid base64url"))
    }
}
