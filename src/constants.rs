//! Constants shared across the credential layer, plus the two process-wide
//! hooks: the clock consulted by temporal checks and proof timestamps, and
//! the sanitizer applied to untrusted text before it enters error messages.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, SubsecRound, Utc};
use lazy_static::lazy_static;

/// The required primary JSON-LD context for a verifiable credential or presentation.
pub const CREDENTIAL_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// The JSON-LD context of a DID document.
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// The type used to identify the Verifiable Credential container.
pub const VERIFIABLE_CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// The type used to identify the Verifiable Presentation container.
pub const VERIFIABLE_PRESENTATION_TYPE: &str = "VerifiablePresentation";

fn system_now() -> DateTime<Utc> {
    Utc::now()
}

fn identity(text: &str) -> String {
    text.to_owned()
}

lazy_static! {
    static ref CLOCK: RwLock<fn() -> DateTime<Utc>> = RwLock::new(system_now);
    static ref LOG_SAFE: RwLock<fn(&str) -> String> = RwLock::new(identity);
}

/// Current time according to the configured clock. Defaults to the system UTC clock.
pub fn now() -> DateTime<Utc> {
    let clock = *CLOCK.read().unwrap_or_else(PoisonError::into_inner);
    clock()
}

/// Current time truncated to whole seconds, the precision used in proofs.
pub fn now_seconds() -> DateTime<Utc> {
    now().trunc_subsecs(0)
}

/// Replace the clock. Intended for tests and deterministic replay.
pub fn set_clock(clock: fn() -> DateTime<Utc>) {
    *CLOCK.write().unwrap_or_else(PoisonError::into_inner) = clock;
}

/// Render externally supplied text safe for inclusion in error messages and
/// log files. The default is the identity function.
pub fn log_safe(text: &str) -> String {
    let sanitize = *LOG_SAFE.read().unwrap_or_else(PoisonError::into_inner);
    sanitize(text)
}

/// Replace the sanitizer applied by [`log_safe`].
pub fn set_log_safe(sanitize: fn(&str) -> String) {
    *LOG_SAFE.write().unwrap_or_else(PoisonError::into_inner) = sanitize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_seconds_has_no_subsecond_part() {
        use chrono::Timelike;
        assert_eq!(now_seconds().nanosecond(), 0);
    }

    #[test]
    fn log_safe_defaults_to_identity() {
        assert_eq!(log_safe("did:example:123"), "did:example:123");
    }
}
