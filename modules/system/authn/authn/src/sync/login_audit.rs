use async_trait::async_trait;
use authn_sdk::{AuthNError, Identity, PostLoginHook, Request};

use crate::domain::network::remote_addr;

/// Logs every login attempt.
#[derive(Default)]
pub struct LoginAudit;

#[async_trait]
impl PostLoginHook for LoginAudit {
    async fn run(&self, identity: Option<&Identity>, r: &Request, err: Option<&AuthNError>) {
        let addr = remote_addr(r).unwrap_or_default();
        match (identity, err) {
            (Some(identity), _) => tracing::info!(
                id = %identity.id(),
                login = %identity.login,
                auth_module = identity.auth_module.as_deref().unwrap_or_default(),
                remote_addr = addr,
                "Login succeeded"
            ),
            (None, Some(err)) => tracing::warn!(remote_addr = addr, error = %err, "Login failed"),
            (None, None) => {}
        }
    }
}
