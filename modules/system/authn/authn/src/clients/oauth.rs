use std::sync::Arc;

use async_trait::async_trait;
use authn_sdk::ports::{OAuthConnector, UserDirectory};
use authn_sdk::{
    AuthNClient, AuthNError, ClientParams, Identity, NamespacedId, RedirectClient, Request,
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use url::Url;

use super::oauth_client_name;
use crate::config::OAuthProviderConfig;

/// Cookie in which the caller keeps the state of the pending authorization.
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

const STATE_PARAM: &str = "state";

/// Authorization-code login with an external OAuth provider.
///
/// `redirect_url` sends the user agent to the provider; the provider's
/// callback is then passed to login, which exchanges the `code` query
/// parameter and resolves the local user by login. The callback must echo
/// the issued state in its `state` query parameter and carry the same value
/// in the [`OAUTH_STATE_COOKIE`] cookie.
pub struct OAuthClient {
    name: String,
    cfg: OAuthProviderConfig,
    connector: Arc<dyn OAuthConnector>,
    users: Arc<dyn UserDirectory>,
}

impl OAuthClient {
    /// # Errors
    ///
    /// Returns an error if the provider's authorization URL is invalid.
    pub fn new(
        provider: &str,
        cfg: OAuthProviderConfig,
        connector: Arc<dyn OAuthConnector>,
        users: Arc<dyn UserDirectory>,
    ) -> Result<Self, url::ParseError> {
        Url::parse(&cfg.auth_url)?;
        Ok(Self {
            name: oauth_client_name(provider),
            cfg,
            connector,
            users,
        })
    }

    /// Builds the authorization URL and returns it with the state it carries.
    ///
    /// The caller stores the state in the [`OAUTH_STATE_COOKIE`] cookie.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the authorization URL cannot be parsed.
    pub fn redirect(&self) -> Result<(String, String), AuthNError> {
        let mut url = Url::parse(&self.cfg.auth_url)
            .map_err(|e| AuthNError::internal(format!("invalid authorization url: {e}")))?;
        let state = random_state();
        url.query_pairs_mut()
            .append_pair("client_id", &self.cfg.client_id)
            .append_pair("redirect_uri", &self.cfg.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.cfg.scopes.join(" "))
            .append_pair(STATE_PARAM, &state);
        Ok((url.into(), state))
    }
}

fn check_state(r: &Request) -> Result<(), AuthNError> {
    let expected = r.cookie(OAUTH_STATE_COOKIE).filter(|s| !s.is_empty());
    let received = r.query_param(STATE_PARAM).filter(|s| !s.is_empty());
    match (expected, received) {
        (Some(expected), Some(received)) if expected == received => Ok(()),
        (Some(_), Some(_)) => Err(AuthNError::unauthenticated("invalid oauth state")),
        _ => Err(AuthNError::unauthenticated("missing oauth state")),
    }
}

fn random_state() -> String {
    let mut bytes = [0u8; 24];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[async_trait]
impl AuthNClient for OAuthClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn authenticate(&self, r: &Request) -> Result<Identity, AuthNError> {
        check_state(r)?;

        let code = r
            .query_param("code")
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AuthNError::unauthenticated("missing authorization code"))?;

        let info = self.connector.exchange_code(&code).await?;
        let user = self
            .users
            .get_user_by_login(&info.login)
            .await?
            .ok_or_else(|| AuthNError::unauthenticated("user not found"))?;

        let email = if info.email.is_empty() { &user.email } else { &info.email };
        Ok(Identity::builder(NamespacedId::user(user.id))
            .org_id(r.org_id)
            .login(&user.login)
            .name(&user.name)
            .email(email)
            .auth_id(&info.id)
            .client_params(ClientParams {
                fetch_user: true,
                sync_org_roles: true,
                ..ClientParams::default()
            })
            .build())
    }

    fn as_redirect(&self) -> Option<&dyn RedirectClient> {
        Some(self)
    }
}

#[async_trait]
impl RedirectClient for OAuthClient {
    async fn redirect_url(&self, _r: &Request) -> Result<String, AuthNError> {
        self.redirect().map(|(url, _)| url)
    }
}
