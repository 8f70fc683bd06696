use std::collections::BTreeMap;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants;

/// A representation of a cryptographic proof.
///
/// Beyond the three standard members, a proof carries an ordered map of
/// extension properties. The canonical-JSON-with-JWS suite stores `salt`
/// there at creation time and `jws` last, once the signature exists.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// The identifier for the type of cryptographic proof.
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    proof_type: String,

    /// The time the proof was generated, to whole-second precision.
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<DateTime<Utc>>,

    /// The DID URL of the verification method that verifies this proof.
    #[serde(skip_serializing_if = "Option::is_none")]
    verification_method: Option<String>,

    #[serde(flatten)]
    properties: BTreeMap<String, Value>,
}

impl Default for Proof {
    fn default() -> Self {
        Self {
            proof_type: String::new(),
            created: Some(constants::now_seconds()),
            verification_method: None,
            properties: BTreeMap::new(),
        }
    }
}

impl Proof {
    pub fn proof_type(&self) -> &str {
        &self.proof_type
    }

    pub fn set_proof_type(&mut self, proof_type: impl Into<String>) {
        self.proof_type = proof_type.into();
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    /// Set the creation time, truncated to whole seconds.
    pub fn set_created(&mut self, created: DateTime<Utc>) {
        self.created = Some(created.trunc_subsecs(0));
    }

    pub fn verification_method(&self) -> Option<&str> {
        self.verification_method.as_deref()
    }

    pub fn set_verification_method(&mut self, method: impl Into<String>) {
        self.verification_method = Some(method.into());
    }

    /// Get an extension property.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Get an extension property if it is a string; a missing value and a
    /// value of another type both yield `None`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// Set an extension property.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Remove an extension property.
    pub fn remove(&mut self, key: &str) {
        self.properties.remove(key);
    }

    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};
    use serde_json::json;

    use super::*;

    #[test]
    fn created_is_truncated_to_whole_seconds() {
        let mut proof = Proof::default();
        assert_eq!(proof.created().unwrap().nanosecond(), 0);

        let ts = Utc.with_ymd_and_hms(2023, 3, 5, 19, 23, 24).unwrap() + chrono::Duration::milliseconds(123);
        proof.set_created(ts);
        assert_eq!(proof.created().unwrap().to_rfc3339(), "2023-03-05T19:23:24+00:00");
    }

    #[test]
    fn wire_form_is_flat() {
        let mut proof = Proof::default();
        proof.set_proof_type("CanonicalJsonWithJws");
        proof.set_created(Utc.with_ymd_and_hms(2023, 3, 5, 19, 23, 24).unwrap());
        proof.set_verification_method("did:setl:abc#key-1");
        proof.set("salt", "pepper");
        proof.set("jws", "eyJh..sig");

        let canonical = crate::canon::to_string(&proof).unwrap();
        assert_eq!(
            canonical,
            r#"{"created":"2023-03-05T19:23:24Z","jws":"eyJh..sig","salt":"pepper","type":"CanonicalJsonWithJws","verificationMethod":"did:setl:abc#key-1"}"#
        );
    }

    #[test]
    fn typed_string_access_ignores_other_types() {
        let mut proof = Proof::default();
        proof.set("jws", json!(42));
        assert_eq!(proof.get_str("jws"), None);
        assert_eq!(proof.get("jws"), Some(&json!(42)));

        proof.set("jws", "text");
        assert_eq!(proof.get_str("jws"), Some("text"));

        proof.remove("jws");
        assert_eq!(proof.get("jws"), None);
    }

    #[test]
    fn deserializes_unknown_members_into_extension_properties() {
        let proof: Proof = serde_json::from_value(json!({
            "type": "CanonicalJsonWithJws",
            "created": "2023-03-05T19:23:24Z",
            "verificationMethod": "did:setl:abc#key-1",
            "salt": "grain",
            "jws": "aaa..bbb",
        }))
        .unwrap();
        assert_eq!(proof.proof_type(), "CanonicalJsonWithJws");
        assert_eq!(proof.get_str("salt"), Some("grain"));
        assert_eq!(proof.get_str("jws"), Some("aaa..bbb"));
        assert_eq!(proof.properties().len(), 2);
    }
}
