use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use authn_sdk::ports::UserTokenService;
use authn_sdk::{AuthNError, Identity, PostAuthHook, Request};
use chrono::Utc;

use crate::clients::CLIENT_SESSION;
use crate::domain::network::{ip_from_address, remote_addr};

/// Rotates the session token of session-authenticated identities once it is
/// older than the rotation interval.
///
/// A failed rotation keeps the current token.
pub struct SessionRefreshHook {
    tokens: Arc<dyn UserTokenService>,
    rotation_interval: Duration,
}

impl SessionRefreshHook {
    #[must_use]
    pub fn new(tokens: Arc<dyn UserTokenService>, rotation_interval: Duration) -> Self {
        Self {
            tokens,
            rotation_interval,
        }
    }
}

#[async_trait]
impl PostAuthHook for SessionRefreshHook {
    fn name(&self) -> &str {
        "session-refresh"
    }

    async fn run(&self, identity: &mut Identity, r: &Request) -> Result<(), AuthNError> {
        if identity.auth_module.as_deref() != Some(CLIENT_SESSION) {
            return Ok(());
        }
        let Some(token) = identity.session_token.as_ref() else {
            return Ok(());
        };

        let age = (Utc::now() - token.rotated_at).to_std().unwrap_or_default();
        if age < self.rotation_interval {
            return Ok(());
        }

        let token_id = token.id;
        let client_ip = remote_addr(r).and_then(|addr| ip_from_address(addr).ok());
        let rotated = self
            .tokens
            .rotate_token(token, client_ip, r.user_agent())
            .await;

        match rotated {
            Ok(rotated) => {
                tracing::debug!(token_id, "Rotated session token");
                identity.session_token = Some(rotated);
            }
            Err(e) => {
                tracing::warn!(token_id, error = %e, "Failed to rotate session token");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::test_support::{FakeTokenService, user_token};
    use authn_sdk::NamespacedId;
    use secrecy::ExposeSecret;

    fn session_identity(rotated_minutes_ago: i64, module: &str) -> Identity {
        let mut token = user_token(3, 1, "current");
        token.rotated_at = Utc::now() - chrono::Duration::minutes(rotated_minutes_ago);
        Identity::builder(NamespacedId::user(1))
            .auth_module(module)
            .session_token(token)
            .build()
    }

    fn hook(tokens: Arc<FakeTokenService>) -> SessionRefreshHook {
        SessionRefreshHook::new(tokens, Duration::from_secs(600))
    }

    #[tokio::test]
    async fn old_token_is_rotated() {
        let tokens = Arc::new(FakeTokenService::default());
        let mut identity = session_identity(15, CLIENT_SESSION);

        hook(tokens.clone())
            .run(&mut identity, &Request::detached())
            .await
            .unwrap();

        assert_eq!(tokens.rotated.lock().as_slice(), [3]);
        let token = identity.session_token.unwrap();
        assert_eq!(token.unhashed_token.expose_secret(), "rotated-3");
    }

    #[tokio::test]
    async fn fresh_token_is_kept() {
        let tokens = Arc::new(FakeTokenService::default());
        let mut identity = session_identity(2, CLIENT_SESSION);

        hook(tokens.clone())
            .run(&mut identity, &Request::detached())
            .await
            .unwrap();

        assert!(tokens.rotated.lock().is_empty());
    }

    #[tokio::test]
    async fn other_clients_are_ignored() {
        let tokens = Arc::new(FakeTokenService::default());
        let mut identity = session_identity(15, "auth.client.form");

        hook(tokens.clone())
            .run(&mut identity, &Request::detached())
            .await
            .unwrap();

        assert!(tokens.rotated.lock().is_empty());
    }
}
