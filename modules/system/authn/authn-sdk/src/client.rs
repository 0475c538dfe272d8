//! Client (authentication strategy) traits.
//!
//! Every client implements [`AuthNClient`]. Optional capabilities are exposed
//! through the capability queries on that trait rather than through
//! downcasting:
//!
//! - [`ContextAwareClient`] clients can be selected automatically by
//!   `AuthNService::authenticate` based on [`ContextAwareClient::test`] and
//!   [`ContextAwareClient::priority`].
//! - [`RedirectClient`] clients support an external authorization hop.

use async_trait::async_trait;

use crate::error::AuthNError;
use crate::models::Identity;
use crate::request::Request;

/// Base client contract.
#[async_trait]
pub trait AuthNClient: Send + Sync {
    /// Stable, unique client name.
    fn name(&self) -> &str;

    /// Check the request credentials and produce an identity.
    ///
    /// Clients never run post-auth hooks themselves.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if credentials are absent or invalid
    /// - any more specific kind the client can report
    async fn authenticate(&self, r: &Request) -> Result<Identity, AuthNError>;

    /// Returns `Some` if the client can be selected by dispatch.
    fn as_context_aware(&self) -> Option<&dyn ContextAwareClient> {
        None
    }

    /// Returns `Some` if the client supports the redirect flow.
    fn as_redirect(&self) -> Option<&dyn RedirectClient> {
        None
    }
}

/// Clients that can decide for themselves whether they apply to a request.
pub trait ContextAwareClient: AuthNClient {
    /// Cheap, side-effect-free precondition check (header present, cookie
    /// present, ...). Evaluated for every request.
    fn test(&self, r: &Request) -> bool;

    /// Lower values are tried first.
    fn priority(&self) -> i16;
}

/// Clients that require an external authorization hop (OAuth-style).
#[async_trait]
pub trait RedirectClient: AuthNClient {
    /// URL the user agent should be sent to.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be built.
    async fn redirect_url(&self, r: &Request) -> Result<String, AuthNError>;
}

/// Credential verifier behind the password and proxy clients
/// (directory bind, local password database).
#[async_trait]
pub trait CredentialBackend: Send + Sync {
    /// Backend name used in logs.
    fn name(&self) -> &str;

    /// Verify a username and password.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` if the credentials are rejected.
    async fn authenticate_password(
        &self,
        r: &Request,
        username: &str,
        password: &str,
    ) -> Result<Identity, AuthNError>;

    /// Resolve a username asserted by a trusted authenticating proxy.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` if the user cannot be resolved.
    async fn authenticate_proxy(
        &self,
        r: &Request,
        username: &str,
        additional: &std::collections::HashMap<String, String>,
    ) -> Result<Identity, AuthNError>;
}
