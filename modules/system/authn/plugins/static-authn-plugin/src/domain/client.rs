//! Client implementation for the static `AuthN` plugin.
//!
//! Exposes the domain service as a context-aware `AuthNClient`.

use async_trait::async_trait;
use authn_sdk::{AuthNClient, AuthNError, ContextAwareClient, Identity, Request};

use super::service::Service;

pub const CLIENT_STATIC: &str = "auth.client.static";

const AUTHORIZATION: &str = "authorization";

impl Service {
    fn token<'r>(&self, r: &'r Request) -> Option<&'r str> {
        if self.header_name.eq_ignore_ascii_case(AUTHORIZATION) {
            r.bearer_token()
        } else {
            r.header(&self.header_name).filter(|v| !v.is_empty())
        }
    }
}

#[async_trait]
impl AuthNClient for Service {
    fn name(&self) -> &str {
        CLIENT_STATIC
    }

    async fn authenticate(&self, r: &Request) -> Result<Identity, AuthNError> {
        let token = self
            .token(r)
            .ok_or_else(|| AuthNError::unauthenticated("missing token"))?;
        Self::authenticate(self, token).ok_or_else(|| AuthNError::unauthenticated("invalid token"))
    }

    fn as_context_aware(&self) -> Option<&dyn ContextAwareClient> {
        Some(self)
    }
}

impl ContextAwareClient for Service {
    fn test(&self, r: &Request) -> bool {
        self.token(r).is_some()
    }

    fn priority(&self) -> i16 {
        self.priority
    }
}
