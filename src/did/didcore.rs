//! The DID document model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{log_safe, DID_CONTEXT};
use crate::jwk::PublicKeyJwk;

/// The only verification method type the credential layer accepts.
pub const JWS_VERIFICATION_KEY_2020: &str = "JwsVerificationKey2020";

// The @context property defines the vocabulary used in the JSON-LD document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Context {
    SingleString(String),
    SetOfString(Vec<String>),
}

impl Default for Context {
    fn default() -> Self {
        Context::SingleString(DID_CONTEXT.to_owned())
    }
}

/// The operations a verification method may be referenced for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyUsage {
    #[serde(rename = "Assertion")]
    Assertion,
    #[serde(rename = "Authentication")]
    Authentication,
    #[serde(rename = "CapabilityDelegation")]
    CapabilityDelegation,
    #[serde(rename = "CapabilityInvocation")]
    CapabilityInvocation,
}

impl KeyUsage {
    pub fn id(&self) -> &'static str {
        match self {
            KeyUsage::Assertion => "Assertion",
            KeyUsage::Authentication => "Authentication",
            KeyUsage::CapabilityDelegation => "CapabilityDelegation",
            KeyUsage::CapabilityInvocation => "CapabilityInvocation",
        }
    }

    pub fn for_id(id: &str) -> Option<Self> {
        match id {
            "Assertion" => Some(KeyUsage::Assertion),
            "Authentication" => Some(KeyUsage::Authentication),
            "CapabilityDelegation" => Some(KeyUsage::CapabilityDelegation),
            "CapabilityInvocation" => Some(KeyUsage::CapabilityInvocation),
            _ => None,
        }
    }
}

/// A named public key entry in a DID document.
/// See <https://www.w3.org/TR/did-core/#verification-methods>
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controller: Vec<String>,

    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub method_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<PublicKeyJwk>,
}

impl VerificationMethod {
    /// Attach the public key. The method type becomes
    /// `JwsVerificationKey2020`, and a missing id defaults to the key's
    /// own key id.
    pub fn set_public_key_jwk(&mut self, jwk: PublicKeyJwk) {
        self.method_type = JWS_VERIFICATION_KEY_2020.to_owned();
        if self.id.is_none() {
            self.id = jwk.key_id().map(str::to_owned);
        }
        self.public_key_jwk = Some(jwk);
    }

    pub fn is_jws_verification_key(&self) -> bool {
        self.method_type == JWS_VERIFICATION_KEY_2020
    }
}

/// A DID document.
/// See <https://www.w3.org/TR/did-core/>
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    #[serde(rename = "@context", default)]
    pub context: Context,

    // Identifier property is mandatory in a did document.
    // See https://www.w3.org/TR/did-core/#dfn-id
    pub id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controller: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verification_method: Vec<VerificationMethod>,

    // === Verification relationships: DID-URL references into
    // verification_method ===
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertion_method: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authentication: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capability_delegation: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capability_invocation: Vec<String>,
}

impl DidDocument {
    /// Instantiate a new document for the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            context: Context::default(),
            id: id.into(),
            controller: Vec::new(),
            created: None,
            updated: None,
            verification_method: Vec::new(),
            assertion_method: Vec::new(),
            authentication: Vec::new(),
            capability_delegation: Vec::new(),
            capability_invocation: Vec::new(),
        }
    }

    /// Add a verification method and reference it from the given usage
    /// lists. A method whose id is already present is left untouched.
    ///
    /// # Panics
    ///
    /// Panics if the method has no assigned id.
    pub fn add_verification_method(
        &mut self,
        method: VerificationMethod,
        usages: impl IntoIterator<Item = KeyUsage>,
    ) {
        let method_id = match &method.id {
            Some(id) => id.clone(),
            None => panic!("verification method has no assigned id"),
        };
        if self.verification_method.iter().any(|m| m.id.as_deref() == Some(&method_id)) {
            tracing::debug!(id = %log_safe(&method_id), "verification method already present");
            return;
        }
        self.verification_method.push(method);
        for usage in usages {
            let list = self.usage_list(usage);
            if !list.contains(&method_id) {
                list.push(method_id.clone());
            }
        }
    }

    /// Remove a verification method and every reference to it.
    pub fn remove_verification_method(&mut self, method_id: &str) {
        self.verification_method.retain(|m| m.id.as_deref() != Some(method_id));
        for usage in [
            KeyUsage::Assertion,
            KeyUsage::Authentication,
            KeyUsage::CapabilityDelegation,
            KeyUsage::CapabilityInvocation,
        ] {
            self.usage_list(usage).retain(|id| id != method_id);
        }
    }

    fn usage_list(&mut self, usage: KeyUsage) -> &mut Vec<String> {
        match usage {
            KeyUsage::Assertion => &mut self.assertion_method,
            KeyUsage::Authentication => &mut self.authentication,
            KeyUsage::CapabilityDelegation => &mut self.capability_delegation,
            KeyUsage::CapabilityInvocation => &mut self.capability_invocation,
        }
    }
}
