use std::sync::Arc;

use async_trait::async_trait;
use authn_sdk::ports::UserDirectory;
use authn_sdk::{
    AuthNClient, AuthNError, ClientParams, ContextAwareClient, Identity, NamespacedId, Request,
};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::ExposeSecret;
use serde_json::{Map, Value};

use super::{CLIENT_JWT, PRIORITY_JWT};
use crate::config::JwtConfig;

#[derive(Debug, thiserror::Error)]
pub enum JwtConfigError {
    #[error("jwt secret is not configured")]
    MissingSecret,
}

/// Authenticates requests carrying an HS256-signed JWT in a configured header.
///
/// The token must resolve to an existing user by its login claim.
pub struct JwtClient {
    header_name: String,
    login_claim: String,
    email_claim: String,
    key: DecodingKey,
    validation: Validation,
    users: Arc<dyn UserDirectory>,
}

impl JwtClient {
    /// # Errors
    ///
    /// Returns [`JwtConfigError::MissingSecret`] if no secret is configured.
    pub fn new(cfg: &JwtConfig, users: Arc<dyn UserDirectory>) -> Result<Self, JwtConfigError> {
        let secret = cfg.secret.as_ref().ok_or(JwtConfigError::MissingSecret)?;
        Ok(Self {
            header_name: cfg.header_name.clone(),
            login_claim: cfg.login_claim.clone(),
            email_claim: cfg.email_claim.clone(),
            key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            users,
        })
    }

    fn token<'a>(&self, r: &'a Request) -> Option<&'a str> {
        let value = r.header(&self.header_name)?.trim();
        let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
        let looks_like_jwt = token.split('.').count() == 3 && token.split('.').all(|s| !s.is_empty());
        looks_like_jwt.then_some(token)
    }

    fn decode_claims(&self, token: &str) -> Result<Map<String, Value>, AuthNError> {
        decode::<Map<String, Value>>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthNError::unauthenticated("token has expired"),
                ErrorKind::InvalidSignature => {
                    AuthNError::unauthenticated("invalid token signature")
                }
                _ => AuthNError::unauthenticated(format!("invalid token: {e}")),
            })
    }
}

fn claim_str<'a>(claims: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    claims.get(name).and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[async_trait]
impl AuthNClient for JwtClient {
    fn name(&self) -> &str {
        CLIENT_JWT
    }

    async fn authenticate(&self, r: &Request) -> Result<Identity, AuthNError> {
        let token = self
            .token(r)
            .ok_or_else(|| AuthNError::unauthenticated("missing token"))?;
        let claims = self.decode_claims(token)?;

        let login = claim_str(&claims, &self.login_claim)
            .ok_or_else(|| AuthNError::unauthenticated("missing login claim"))?;
        let user = self
            .users
            .get_user_by_login(login)
            .await?
            .ok_or_else(|| AuthNError::unauthenticated("user not found"))?;

        let email = claim_str(&claims, &self.email_claim).unwrap_or(&user.email);
        let mut builder = Identity::builder(NamespacedId::user(user.id))
            .org_id(r.org_id)
            .login(&user.login)
            .name(&user.name)
            .email(email)
            .client_params(ClientParams {
                fetch_user: true,
                sync_org_roles: true,
                ..ClientParams::default()
            });
        if let Some(sub) = claim_str(&claims, "sub") {
            builder = builder.auth_id(sub);
        }
        let mut identity = builder.build();
        identity.claims = claims;

        Ok(identity)
    }

    fn as_context_aware(&self) -> Option<&dyn ContextAwareClient> {
        Some(self)
    }
}

impl ContextAwareClient for JwtClient {
    fn test(&self, r: &Request) -> bool {
        self.token(r).is_some()
    }

    fn priority(&self) -> i16 {
        PRIORITY_JWT
    }
}
