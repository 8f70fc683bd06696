use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::did::validate::{validate_did_url, DidSyntaxError, Presence};

/// A decomposed DID URL.
///
/// Two values are equal exactly when their reconstructed URI text is
/// equal, so a `DidId` can stand in for the string it was parsed from.
#[derive(Clone, Debug)]
pub struct DidId {
    method: String,
    id: String,
    path: Option<String>,
    query: Option<String>,
    fragment: Option<String>,
    uri: String,
}

impl DidId {
    /// Assemble an identifier from its parts. The path includes its
    /// leading '/'; the query and fragment exclude their markers.
    pub fn from_parts(
        method: impl Into<String>,
        id: impl Into<String>,
        path: Option<String>,
        query: Option<String>,
        fragment: Option<String>,
    ) -> Self {
        let method = method.into();
        let id = id.into();
        let mut uri = format!("did:{method}:{id}");
        if let Some(p) = &path {
            uri.push_str(p);
        }
        if let Some(q) = &query {
            uri.push('?');
            uri.push_str(q);
        }
        if let Some(f) = &fragment {
            uri.push('#');
            uri.push_str(f);
        }
        Self { method, id, path, query, fragment, uri }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The path, from its initial '/'.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// The query, without the initial '?'.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The fragment, without the initial '#'.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// The full URI text including path, query and fragment.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// A copy of this identifier with the fragment removed.
    pub fn without_fragment(&self) -> Self {
        if self.fragment.is_none() {
            return self.clone();
        }
        Self::from_parts(
            self.method.clone(),
            self.id.clone(),
            self.path.clone(),
            self.query.clone(),
            None,
        )
    }
}

impl FromStr for DidId {
    type Err = DidSyntaxError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        validate_did_url(value, "", Presence::Optional, Presence::Optional, Presence::Optional)?;

        // Grammar is already established; carve the parts off back to front.
        let rest = value.strip_prefix("did:").ok_or(DidSyntaxError::BadScheme)?;
        let (rest, fragment) = match rest.split_once('#') {
            Some((head, f)) => (head, Some(f.to_owned())),
            None => (rest, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((head, q)) => (head, Some(q.to_owned())),
            None => (rest, None),
        };
        let (rest, path) = match rest.find('/') {
            Some(at) => (&rest[..at], Some(rest[at..].to_owned())),
            None => (rest, None),
        };
        let (method, id) = rest.split_once(':').ok_or(DidSyntaxError::MissingMethod)?;

        Ok(Self::from_parts(method, id, path, query, fragment))
    }
}

impl fmt::Display for DidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl PartialEq for DidId {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for DidId {}

impl Hash for DidId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

impl Serialize for DidId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.uri)
    }
}

impl<'de> Deserialize<'de> for DidId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}
