//! Local (in-process) client for the `AuthN` service.

use std::sync::Arc;

use async_trait::async_trait;
use authn_sdk::{AuthNError, AuthNService, Identity, Request};

use super::Service;

/// Local client wrapping the service.
///
/// Handed to the gateway middleware and login handlers as
/// `Arc<dyn AuthNService>`.
pub struct AuthNLocalClient {
    svc: Arc<Service>,
}

impl AuthNLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_pass(op: &str, e: AuthNError) -> AuthNError {
    match &e {
        // Expected outcomes of bad or missing credentials.
        AuthNError::Unauthenticated { .. }
        | AuthNError::IdentityDisabled
        | AuthNError::BadRequest(_)
        | AuthNError::Cancelled => {
            tracing::debug!(operation = op, error = %e, "authn call rejected");
        }
        _ => tracing::error!(operation = op, error = ?e, "authn call failed"),
    }
    e
}

#[async_trait]
impl AuthNService for AuthNLocalClient {
    async fn authenticate(&self, r: &mut Request) -> Result<Identity, AuthNError> {
        self.svc
            .authenticate(r)
            .await
            .map_err(|e| log_and_pass("authenticate", e))
    }

    async fn login(&self, client: &str, r: &mut Request) -> Result<Identity, AuthNError> {
        self.svc
            .login(client, r)
            .await
            .map_err(|e| log_and_pass("login", e))
    }

    async fn redirect_url(&self, client: &str, r: &Request) -> Result<String, AuthNError> {
        self.svc
            .redirect_url(client, r)
            .await
            .map_err(|e| log_and_pass("redirect_url", e))
    }
}
