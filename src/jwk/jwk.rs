use serde::{Deserialize, Serialize};

use crate::jwk::ec::Ec;
use crate::jwk::key_type::KeyType;
use crate::jwk::okp::Okp;
use crate::jwk::rsa::Rsa;

/// A key that can be contained in a JWK, discriminated by the `kty`
/// member. The tag round-trips case-insensitively for the common spellings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kty")]
pub enum Key {
    /// An elliptic-curve key.
    #[serde(rename = "ec", alias = "EC", alias = "Ec")]
    Ec(Ec),

    /// A CFRG Edwards-curve key.
    #[serde(rename = "okp", alias = "OKP", alias = "Okp")]
    Okp(Okp),

    /// An RSA key.
    #[serde(rename = "rsa", alias = "RSA", alias = "Rsa")]
    Rsa(Rsa),
}

impl Key {
    pub fn key_type(&self) -> KeyType {
        match self {
            Key::Ec(_) => KeyType::Ec,
            Key::Okp(_) => KeyType::Okp,
            Key::Rsa(_) => KeyType::Rsa,
        }
    }
}

impl From<Ec> for Key {
    fn from(key: Ec) -> Self {
        Self::Ec(key)
    }
}

impl From<Okp> for Key {
    fn from(key: Okp) -> Self {
        Self::Okp(key)
    }
}

impl From<Rsa> for Key {
    fn from(key: Rsa) -> Self {
        Self::Rsa(key)
    }
}

fn default_use() -> String {
    "sig".to_owned()
}

/// JWK parameters unrelated to the key material.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    /// The key identifier: a DID URL whose fragment names the verification
    /// method holding this key.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub kid: Option<String>,

    /// The expected key use. Typically "sig" for signing.
    #[serde(rename = "use", default = "default_use")]
    pub cls: String,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            kid: None,
            cls: default_use(),
        }
    }
}

/// A public JSON Web Key: key material plus its identifying parameters,
/// both flattened into a single JSON object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyJwk {
    #[serde(flatten)]
    pub key: Key,

    #[serde(flatten)]
    pub prm: Parameters,
}

impl PublicKeyJwk {
    /// New instance with the default "sig" use and no key id.
    pub fn new(key: impl Into<Key>) -> Self {
        Self {
            key: key.into(),
            prm: Parameters::default(),
        }
    }

    /// Builder-style assignment of the key id.
    pub fn with_key_id(mut self, kid: impl Into<String>) -> Self {
        self.prm.kid = Some(kid.into());
        self
    }

    pub fn key_id(&self) -> Option<&str> {
        self.prm.kid.as_deref()
    }
}
