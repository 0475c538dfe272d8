use std::sync::Arc;

use async_trait::async_trait;
use authn_sdk::ports::RenderKeyStore;
use authn_sdk::{
    AuthNClient, AuthNError, ClientParams, ContextAwareClient, Identity, Namespace, NamespacedId,
    Request,
};

use super::{CLIENT_RENDER, PRIORITY_RENDER};

/// Cookie set on requests issued by the image renderer.
pub const RENDER_KEY_COOKIE: &str = "renderKey";

/// Authenticates callbacks from the image renderer by their render key.
pub struct RenderClient {
    keys: Arc<dyn RenderKeyStore>,
}

impl RenderClient {
    #[must_use]
    pub fn new(keys: Arc<dyn RenderKeyStore>) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl AuthNClient for RenderClient {
    fn name(&self) -> &str {
        CLIENT_RENDER
    }

    async fn authenticate(&self, r: &Request) -> Result<Identity, AuthNError> {
        let key = r
            .cookie(RENDER_KEY_COOKIE)
            .ok_or_else(|| AuthNError::unauthenticated("missing render key"))?;

        let render_user = self
            .keys
            .get_render_user(key)
            .await
            .ok_or_else(|| AuthNError::unauthenticated("invalid render key"))?;

        if render_user.user_id <= 0 {
            return Ok(
                Identity::builder(NamespacedId::new(Namespace::RenderService, 0))
                    .org_id(render_user.org_id)
                    .org_role(render_user.org_id, render_user.org_role)
                    .build(),
            );
        }

        Ok(Identity::builder(NamespacedId::user(render_user.user_id))
            .org_id(render_user.org_id)
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

impl ContextAwareClient for RenderClient {
    fn test(&self, r: &Request) -> bool {
        r.cookie(RENDER_KEY_COOKIE).is_some_and(|k| !k.is_empty())
    }

    fn priority(&self) -> i16 {
        PRIORITY_RENDER
    }
}
