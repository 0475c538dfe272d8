//! Public API trait for the `AuthN` module.
//!
//! This trait defines the interface that consumers (typically the API
//! gateway middleware and the login handlers) use to authenticate requests.

use async_trait::async_trait;

use crate::error::AuthNError;
use crate::models::Identity;
use crate::request::Request;

/// Public API trait for the `AuthN` service.
///
/// ```ignore
/// let authn: Arc<dyn AuthNService> = Arc::new(AuthNLocalClient::new(svc));
///
/// // Pick a client automatically
/// let identity = authn.authenticate(&mut req).await?;
///
/// // Explicit login issues a session token
/// let identity = authn.login("auth.client.form", &mut req).await?;
/// let token = identity.session_token.expect("set by login");
/// ```
#[async_trait]
pub trait AuthNService: Send + Sync {
    /// Authenticate a request with the first context-aware client that
    /// matches it and succeeds.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if no client matched, or every matching client failed
    /// - `IdentityDisabled` if the identity is disabled
    /// - `Cancelled` if the request was cancelled
    async fn authenticate(&self, r: &mut Request) -> Result<Identity, AuthNError>;

    /// Authenticate with the named client and issue a session token.
    ///
    /// # Errors
    ///
    /// - `ClientNotConfigured` if no client is registered under `client`
    /// - `UnsupportedIdentity` if the identity is not a user
    /// - any error from the client, its hooks or session issuance
    async fn login(&self, client: &str, r: &mut Request) -> Result<Identity, AuthNError>;

    /// Build the redirect URL for the named client.
    ///
    /// # Errors
    ///
    /// - `ClientNotConfigured` if no client is registered under `client`
    /// - `UnsupportedClient` if the client cannot redirect
    async fn redirect_url(&self, client: &str, r: &Request) -> Result<String, AuthNError>;
}
