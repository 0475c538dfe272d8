use std::sync::Arc;

use async_trait::async_trait;
use authn_sdk::{AuthNClient, AuthNError, Identity, Request};
use serde::Deserialize;

use super::CLIENT_FORM;
use super::password::PasswordClient;

#[derive(Deserialize)]
struct LoginForm {
    user: String,
    password: String,
}

/// Login form: a JSON body `{"user": ..., "password": ...}` checked against
/// the password backends. Reachable through login only.
pub struct FormClient {
    password: Arc<PasswordClient>,
}

impl FormClient {
    #[must_use]
    pub fn new(password: Arc<PasswordClient>) -> Self {
        Self { password }
    }
}

#[async_trait]
impl AuthNClient for FormClient {
    fn name(&self) -> &str {
        CLIENT_FORM
    }

    async fn authenticate(&self, r: &Request) -> Result<Identity, AuthNError> {
        let body = r
            .body()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| AuthNError::bad_request("missing login form"))?;
        let form: LoginForm = serde_json::from_slice(body)
            .map_err(|e| AuthNError::bad_request(format!("invalid login form: {e}")))?;

        self.password
            .authenticate_password(r, &form.user, &form.password)
            .await
    }
}
