use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use authn_sdk::ports::UserTokenService;
use authn_sdk::{
    AuthNClient, AuthNError, ClientParams, ContextAwareClient, Identity, NamespacedId, Request,
};
use chrono::Utc;

use super::{CLIENT_SESSION, PRIORITY_SESSION};

/// Authenticates the session cookie issued by login.
pub struct SessionClient {
    cookie_name: String,
    max_lifetime: Duration,
    tokens: Arc<dyn UserTokenService>,
}

impl SessionClient {
    #[must_use]
    pub fn new(cookie_name: &str, max_lifetime: Duration, tokens: Arc<dyn UserTokenService>) -> Self {
        Self {
            cookie_name: cookie_name.to_owned(),
            max_lifetime,
            tokens,
        }
    }
}

#[async_trait]
impl AuthNClient for SessionClient {
    fn name(&self) -> &str {
        CLIENT_SESSION
    }

    async fn authenticate(&self, r: &Request) -> Result<Identity, AuthNError> {
        let value = r
            .cookie(&self.cookie_name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AuthNError::unauthenticated("missing session cookie"))?;

        let token = self.tokens.lookup_token(value).await?;

        let age = (Utc::now() - token.created_at).to_std().unwrap_or_default();
        if age > self.max_lifetime {
            return Err(AuthNError::unauthenticated("session token has expired"));
        }

        Ok(Identity::builder(NamespacedId::user(token.user_id))
            .org_id(r.org_id)
            .session_token(token)
            .client_params(ClientParams {
                fetch_user: true,
                sync_org_roles: true,
                ..ClientParams::default()
            })
            .build())
    }

    fn as_context_aware(&self) -> Option<&dyn ContextAwareClient> {
        Some(self)
    }
}

impl ContextAwareClient for SessionClient {
    fn test(&self, r: &Request) -> bool {
        !self.cookie_name.is_empty() && r.cookie(&self.cookie_name).is_some_and(|v| !v.is_empty())
    }

    fn priority(&self) -> i16 {
        PRIORITY_SESSION
    }
}
