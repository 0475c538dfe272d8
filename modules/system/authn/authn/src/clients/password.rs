use std::sync::Arc;

use authn_sdk::{AuthNError, CredentialBackend, Identity, Request};

/// Reason reported when every password backend rejected the credentials.
pub const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Verifies a username and password against the configured backends in
/// order (directory first, then the local database).
///
/// Shared by the basic and form clients.
pub struct PasswordClient {
    backends: Vec<Arc<dyn CredentialBackend>>,
}

impl PasswordClient {
    #[must_use]
    pub fn new(backends: Vec<Arc<dyn CredentialBackend>>) -> Self {
        Self { backends }
    }

    /// # Errors
    ///
    /// `Unauthenticated("invalid username or password")` carrying every
    /// backend failure when no backend accepts the credentials.
    pub async fn authenticate_password(
        &self,
        r: &Request,
        username: &str,
        password: &str,
    ) -> Result<Identity, AuthNError> {
        let mut causes = Vec::with_capacity(self.backends.len());
        for backend in &self.backends {
            match backend.authenticate_password(r, username, password).await {
                Ok(identity) => return Ok(identity),
                Err(e) => {
                    tracing::debug!(backend = backend.name(), error = %e, "Password backend rejected credentials");
                    causes.push(e);
                }
            }
        }

        Err(AuthNError::Unauthenticated {
            reason: INVALID_CREDENTIALS.to_owned(),
            causes,
        })
    }
}
