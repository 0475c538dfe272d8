//! Background bookkeeping of when users and API keys were last active.
//!
//! Updates run on spawned tasks and never delay or fail the request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use authn_sdk::ports::{ApiKeyStore, UserDirectory};
use authn_sdk::{AuthNError, Identity, PostAuthHook, Request};
use chrono::Utc;

use crate::clients::api_key::API_KEY_ID_CLAIM;

/// Users seen more recently than this are not updated again.
pub const LAST_SEEN_INTERVAL: Duration = Duration::from_secs(5 * 60);

pub struct UserLastSeenSync {
    users: Arc<dyn UserDirectory>,
    interval: Duration,
}

impl UserLastSeenSync {
    #[must_use]
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self {
            users,
            interval: LAST_SEEN_INTERVAL,
        }
    }

    fn is_stale(&self, identity: &Identity) -> bool {
        identity.last_seen_at.is_none_or(|at| {
            (Utc::now() - at)
                .to_std()
                .is_ok_and(|elapsed| elapsed >= self.interval)
        })
    }
}

#[async_trait]
impl PostAuthHook for UserLastSeenSync {
    fn name(&self) -> &str {
        "user-last-seen-sync"
    }

    async fn run(&self, identity: &mut Identity, _r: &Request) -> Result<(), AuthNError> {
        if !identity.id().is_user() || !self.is_stale(identity) {
            return Ok(());
        }

        let user_id = identity.id().id();
        let users = Arc::clone(&self.users);
        tokio::spawn(async move {
            if let Err(e) = users.update_last_seen(user_id).await {
                tracing::warn!(user_id, error = %e, "Failed to update user last seen");
            }
        });
        Ok(())
    }
}

pub struct ApiKeyLastSeenSync {
    keys: Arc<dyn ApiKeyStore>,
}

impl ApiKeyLastSeenSync {
    #[must_use]
    pub fn new(keys: Arc<dyn ApiKeyStore>) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl PostAuthHook for ApiKeyLastSeenSync {
    fn name(&self) -> &str {
        "api-key-last-seen-sync"
    }

    async fn run(&self, identity: &mut Identity, _r: &Request) -> Result<(), AuthNError> {
        let Some(key_id) = identity
            .claims
            .get(API_KEY_ID_CLAIM)
            .and_then(serde_json::Value::as_i64)
        else {
            return Ok(());
        };

        let keys = Arc::clone(&self.keys);
        tokio::spawn(async move {
            if let Err(e) = keys.update_last_used(key_id).await {
                tracing::warn!(key_id, error = %e, "Failed to update API key last used");
            }
        });
        Ok(())
    }
}
