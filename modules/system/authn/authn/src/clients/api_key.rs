use std::sync::Arc;

use async_trait::async_trait;
use authn_sdk::ports::ApiKeyStore;
use authn_sdk::{
    AuthNClient, AuthNError, ClientParams, ContextAwareClient, Identity, Namespace, NamespacedId,
    Request,
};
use chrono::Utc;

use super::{
    API_KEY_BASIC_USER, CLIENT_API_KEY, PRIORITY_API_KEY, basic_auth_credentials,
    basic_auth_username,
};

/// Claim carrying the id of the key an identity authenticated with.
pub const API_KEY_ID_CLAIM: &str = "api_key_id";

/// Authenticates API keys and service account tokens.
///
/// The key is read from `Authorization: Bearer <key>`, or from basic auth
/// with the username `api_key`.
pub struct ApiKeyClient {
    keys: Arc<dyn ApiKeyStore>,
}

impl ApiKeyClient {
    #[must_use]
    pub fn new(keys: Arc<dyn ApiKeyStore>) -> Self {
        Self { keys }
    }
}

fn key_from_request(r: &Request) -> Result<Option<String>, AuthNError> {
    if let Some(token) = r.bearer_token() {
        return Ok(Some(token.to_owned()));
    }
    Ok(basic_auth_credentials(r)?
        .filter(|(user, _)| user == API_KEY_BASIC_USER)
        .map(|(_, key)| key))
}

#[async_trait]
impl AuthNClient for ApiKeyClient {
    fn name(&self) -> &str {
        CLIENT_API_KEY
    }

    async fn authenticate(&self, r: &Request) -> Result<Identity, AuthNError> {
        let key = key_from_request(r)?.ok_or_else(|| AuthNError::unauthenticated("missing API key"))?;

        let record = self
            .keys
            .get_by_key(&key)
            .await?
            .ok_or_else(|| AuthNError::unauthenticated("invalid API key"))?;

        if record.expires_at.is_some_and(|at| at <= Utc::now()) {
            return Err(AuthNError::unauthenticated("API key has expired"));
        }
        if record.is_revoked {
            return Err(AuthNError::unauthenticated("API key has been revoked"));
        }

        let key_id = serde_json::Value::from(record.id);
        if let Some(service_account_id) = record.service_account_id {
            return Ok(Identity::builder(NamespacedId::new(
                Namespace::ServiceAccount,
                service_account_id,
            ))
            .org_id(record.org_id)
            .claim(API_KEY_ID_CLAIM, key_id)
            .client_params(ClientParams {
                fetch_user: true,
                sync_org_roles: true,
                ..ClientParams::default()
            })
            .build());
        }

        Ok(Identity::builder(NamespacedId::new(Namespace::ApiKey, record.id))
            .org_id(record.org_id)
            .org_role(record.org_id, record.role)
            .claim(API_KEY_ID_CLAIM, key_id)
            .build())
    }

    fn as_context_aware(&self) -> Option<&dyn ContextAwareClient> {
        Some(self)
    }
}

impl ContextAwareClient for ApiKeyClient {
    fn test(&self, r: &Request) -> bool {
        r.bearer_token().is_some()
            || basic_auth_username(r).is_some_and(|user| user == API_KEY_BASIC_USER)
    }

    fn priority(&self) -> i16 {
        PRIORITY_API_KEY
    }
}
