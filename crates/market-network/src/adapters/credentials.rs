//! PGP credential checkers.
//!
//! A profile's PGP credential is a public key plus a clearsigned statement
//! that must mention the owner's GUID. The PGP signature check itself is
//! supplied by the embedding application.

use crate::domain::{Guid, PgpCredential};
use crate::ports::CredentialVerifier;

/// Rejects every credential, so embedded credentials are always stripped.
///
/// Used when no PGP backend is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPgpBackend;

impl CredentialVerifier for NoPgpBackend {
    fn verify(&self, _credential: &PgpCredential, _guid: &Guid) -> bool {
        false
    }
}

/// Requires the clearsigned text to name the GUID, then defers to a PGP
/// signature check.
pub struct GuidBoundVerifier<F> {
    signature_check: F,
}

impl<F> GuidBoundVerifier<F>
where
    F: Fn(&PgpCredential) -> bool + Send + Sync,
{
    /// Wrap a PGP signature check.
    pub fn new(signature_check: F) -> Self {
        Self { signature_check }
    }
}

impl<F> CredentialVerifier for GuidBoundVerifier<F>
where
    F: Fn(&PgpCredential) -> bool + Send + Sync,
{
    fn verify(&self, credential: &PgpCredential, guid: &Guid) -> bool {
        credential.signature.contains(&guid.hex()) && (self.signature_check)(credential)
    }
}
