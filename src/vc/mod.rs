//! Verifiable credentials and presentations, and the pipelines that sign
//! and verify them.

pub mod credential;
pub mod presentation;
pub mod provable;

pub use credential::{Credential, CredentialStatus};
pub use presentation::Presentation;
pub use provable::Provable;
