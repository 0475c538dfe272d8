use std::sync::Arc;

use async_trait::async_trait;
use authn_sdk::ports::UserDirectory;
use authn_sdk::{AuthNError, Identity, Namespace, PostAuthHook, Request};

/// Copies the stored user record onto identities whose client asked for it
/// with `fetch_user`.
pub struct UserSync {
    users: Arc<dyn UserDirectory>,
}

impl UserSync {
    #[must_use]
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl PostAuthHook for UserSync {
    fn name(&self) -> &str {
        "user-sync"
    }

    async fn run(&self, identity: &mut Identity, _r: &Request) -> Result<(), AuthNError> {
        if !identity.client_params.fetch_user {
            return Ok(());
        }
        if !matches!(
            identity.namespace(),
            Namespace::User | Namespace::ServiceAccount
        ) {
            return Ok(());
        }

        let id = identity.id().id();
        let user = self
            .users
            .get_user(id)
            .await?
            .ok_or_else(|| AuthNError::unauthenticated("user not found"))?;

        identity.login = user.login;
        identity.name = user.name;
        if identity.email.is_empty() {
            identity.email = user.email;
        }
        identity.is_server_admin = user.is_server_admin;
        identity.last_seen_at = user.last_seen_at;

        if user.is_disabled && identity.client_params.enable_disabled_users {
            self.users.set_disabled(id, false).await?;
            tracing::info!(user_id = id, "Re-enabled disabled user");
            identity.is_disabled = false;
        } else {
            identity.is_disabled = user.is_disabled;
        }

        Ok(())
    }
}
