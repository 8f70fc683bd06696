/// An external check for whether a credential's status indicates it has
/// been invalidated after issuance.
pub trait RevocationChecker {
    /// Test a credential against the revocation mechanism named by its
    /// status entry.
    ///
    /// * `status_type` - the type of the credential's status entry
    /// * `issuer` - the DID of the credential's issuer
    /// * `credential_id` - the URI identifying the credential
    fn is_revoked(&self, status_type: &str, issuer: &str, credential_id: &str) -> bool;
}
