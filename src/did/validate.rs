//! Enforces the DID URL grammar:
//!
//! ```text
//! did-url = did path-abempty [ "?" query ] [ "#" fragment ]
//!
//! did                = "did:" method-name ":" method-specific-id
//! method-name        = 1*method-char
//! method-char        = %x61-7A / DIGIT
//! method-specific-id = *( *idchar ":" ) 1*idchar
//! idchar             = ALPHA / DIGIT / "." / "-" / "_"
//!
//! path-abempty  = *( "/" segment )
//! segment       = *pchar
//! query         = *( pchar / "/" / "?" )
//! fragment      = *( pchar / "/" / "?" )
//! pchar         = unreserved / pct-encoded / sub-delims / ":" / "@"
//! unreserved    = ALPHA / DIGIT / "-" / "." / "_" / "~"
//! pct-encoded   = "%" HEXDIG HEXDIG
//! sub-delims    = "!" / "$" / "&" / "'" / "(" / ")" / "*" / "+" / "," / ";" / "="
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    /// A DID method must only use these characters.
    static ref DID_METHOD: Regex = Regex::new(r"^[a-z0-9]+$").unwrap();

    /// A method-specific id must match this.
    static ref DID_ID: Regex = Regex::new(r"^(?:[A-Za-z0-9._-]*:)*[A-Za-z0-9._-]+$").unwrap();

    /// Fragments and queries validate on the same expression.
    static ref DID_FRAGMENT: Regex =
        Regex::new(r"^(?:[A-Za-z0-9._~!$&'()*+,;=:@/?-]|%[0-9A-Fa-f]{2})*$").unwrap();

    static ref PATH_ABEMPTY: Regex =
        Regex::new(r"^(?:/(?:[A-Za-z0-9._~!$&'()*+,;=:@-]|%[0-9A-Fa-f]{2})*)*$").unwrap();
}

/// Whether a DID URL component must, must not, or may appear.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Presence {
    Required,
    Forbidden,
    Optional,
}

/// The specific way a string failed DID grammar validation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum DidSyntaxError {
    #[error("scheme is not 'did'")]
    BadScheme,
    #[error("no method separator after the method name")]
    MissingMethod,
    #[error("method name must be lower-case letters and digits")]
    BadMethod,
    #[error("invalid method-specific id")]
    BadId,
    #[error("fragment is not allowed here")]
    FragmentPresent,
    #[error("a fragment is required")]
    FragmentMissing,
    #[error("malformed fragment")]
    BadFragment,
    #[error("query is not allowed here")]
    QueryPresent,
    #[error("a query is required")]
    QueryMissing,
    #[error("malformed query")]
    BadQuery,
    #[error("path is not allowed here")]
    PathPresent,
    #[error("a path is required")]
    PathMissing,
    #[error("malformed path")]
    BadPath,
    #[error("path does not start with the required prefix")]
    BadPathPrefix,
}

/// Validate a DID URL, with independent requirements for the path, query
/// and fragment components and an optional required path prefix.
pub fn validate_did_url(
    value: &str,
    path_prefix: &str,
    path: Presence,
    query: Presence,
    fragment: Presence,
) -> Result<(), DidSyntaxError> {
    // Scheme must be "did", lower case.
    let rest = value.strip_prefix("did:").ok_or(DidSyntaxError::BadScheme)?;

    // Components are carved off back to front: the fragment may contain
    // '?' and '/', and the query may contain '/'.
    let (rest, found_fragment) = match rest.split_once('#') {
        Some((head, frag)) => (head, Some(frag)),
        None => (rest, None),
    };
    match (found_fragment, fragment) {
        (Some(_), Presence::Forbidden) => return Err(DidSyntaxError::FragmentPresent),
        (None, Presence::Required) => return Err(DidSyntaxError::FragmentMissing),
        _ => {}
    }
    if let Some(frag) = found_fragment {
        if !DID_FRAGMENT.is_match(frag) {
            return Err(DidSyntaxError::BadFragment);
        }
    }

    let (rest, found_query) = match rest.split_once('?') {
        Some((head, q)) => (head, Some(q)),
        None => (rest, None),
    };
    match (found_query, query) {
        (Some(_), Presence::Forbidden) => return Err(DidSyntaxError::QueryPresent),
        (None, Presence::Required) => return Err(DidSyntaxError::QueryMissing),
        _ => {}
    }
    if let Some(q) = found_query {
        if !DID_FRAGMENT.is_match(q) {
            return Err(DidSyntaxError::BadQuery);
        }
    }

    let (rest, found_path) = match rest.find('/') {
        Some(at) => (&rest[..at], Some(&rest[at..])),
        None => (rest, None),
    };
    match (found_path, path) {
        (Some(_), Presence::Forbidden) => return Err(DidSyntaxError::PathPresent),
        (None, Presence::Required) => return Err(DidSyntaxError::PathMissing),
        _ => {}
    }
    if let Some(p) = found_path {
        if !PATH_ABEMPTY.is_match(p) {
            return Err(DidSyntaxError::BadPath);
        }
        if !p.starts_with(path_prefix) {
            return Err(DidSyntaxError::BadPathPrefix);
        }
    }

    // What remains is "method-name ':' method-specific-id".
    let (method, id) = rest.split_once(':').ok_or(DidSyntaxError::MissingMethod)?;
    if !DID_METHOD.is_match(method) {
        return Err(DidSyntaxError::BadMethod);
    }
    if !DID_ID.is_match(id) {
        return Err(DidSyntaxError::BadId);
    }

    Ok(())
}

/// Validate a bare DID identifier reference. Only the fragment is
/// forbidden; a verification-method reference instead requires one.
pub fn validate_did_uri(value: &str) -> Result<(), DidSyntaxError> {
    validate_did_url(value, "", Presence::Optional, Presence::Optional, Presence::Forbidden)
}
