//! Hook traits run by the `AuthN` service around authentication.

use async_trait::async_trait;

use crate::error::AuthNError;
use crate::models::Identity;
use crate::request::Request;

/// Enrichment or validation step run after a client authenticated a request.
///
/// Hooks run in registration order. A hook returning an error aborts the
/// remaining hooks and fails the attempt for the client that produced the
/// identity. Hooks may set `is_disabled`; the service rejects disabled
/// identities only after every hook has run.
#[async_trait]
pub trait PostAuthHook: Send + Sync {
    /// Hook name used in logs.
    fn name(&self) -> &str;

    /// # Errors
    ///
    /// Any error aborts the authentication attempt.
    async fn run(&self, identity: &mut Identity, r: &Request) -> Result<(), AuthNError>;
}

/// Observer notified after every login attempt, successful or not.
///
/// Observers cannot fail the login.
#[async_trait]
pub trait PostLoginHook: Send + Sync {
    async fn run(&self, identity: Option<&Identity>, r: &Request, err: Option<&AuthNError>);
}
