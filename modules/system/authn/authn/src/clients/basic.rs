use std::sync::Arc;

use async_trait::async_trait;
use authn_sdk::{AuthNClient, AuthNError, ContextAwareClient, Identity, Request};

use super::password::PasswordClient;
use super::{
    API_KEY_BASIC_USER, CLIENT_BASIC, PRIORITY_BASIC, basic_auth_credentials, basic_auth_payload,
    basic_auth_username,
};

/// HTTP basic authentication against the password backends.
pub struct BasicClient {
    password: Arc<PasswordClient>,
}

impl BasicClient {
    #[must_use]
    pub fn new(password: Arc<PasswordClient>) -> Self {
        Self { password }
    }
}

#[async_trait]
impl AuthNClient for BasicClient {
    fn name(&self) -> &str {
        CLIENT_BASIC
    }

    async fn authenticate(&self, r: &Request) -> Result<Identity, AuthNError> {
        let (username, password) = basic_auth_credentials(r)?
            .ok_or_else(|| AuthNError::unauthenticated("missing basic auth header"))?;
        self.password
            .authenticate_password(r, &username, &password)
            .await
    }

    fn as_context_aware(&self) -> Option<&dyn ContextAwareClient> {
        Some(self)
    }
}

impl ContextAwareClient for BasicClient {
    /// Any basic auth header not addressed to the API key client. Malformed
    /// headers match so that the decoding error is reported.
    fn test(&self, r: &Request) -> bool {
        basic_auth_payload(r).is_some()
            && basic_auth_username(r).is_none_or(|user| user != API_KEY_BASIC_USER)
    }

    fn priority(&self) -> i16 {
        PRIORITY_BASIC
    }
}
