//! Auth collaborator contract.

use super::{AuthError, Identity};

/// Verifies a client-supplied token and returns the identity it carries.
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}
