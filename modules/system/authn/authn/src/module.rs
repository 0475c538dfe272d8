//! Construction of the `AuthN` service from configuration.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use authn_sdk::ports::{
    ApiKeyStore, OAuthConnector, OrgDirectory, RenderKeyStore, UserDirectory, UserTokenService,
};
use authn_sdk::{AuthNService, CredentialBackend};
use tracing::{info, warn};

use crate::clients::{
    AnonymousClient, ApiKeyClient, BasicClient, FormClient, JwtClient, OAuthClient,
    PasswordClient, ProxyClient, RenderClient, SessionClient,
};
use crate::config::AuthNConfig;
use crate::domain::{AuthNLocalClient, Service};
use crate::sync::{
    ApiKeyLastSeenSync, LoginAudit, OrgSync, SessionRefreshHook, UserLastSeenSync, UserSync,
};

/// Collaborators the built-in clients and hooks are wired to.
#[derive(Clone)]
pub struct Dependencies {
    pub tokens: Arc<dyn UserTokenService>,
    pub users: Arc<dyn UserDirectory>,
    pub orgs: Arc<dyn OrgDirectory>,
    pub api_keys: Arc<dyn ApiKeyStore>,
    pub render_keys: Arc<dyn RenderKeyStore>,
    /// Directory password backend, used when `ldap_enabled` is set.
    pub ldap: Option<Arc<dyn CredentialBackend>>,
    /// Local password database.
    pub local: Arc<dyn CredentialBackend>,
    /// Code exchange per OAuth provider name.
    pub oauth: HashMap<String, Arc<dyn OAuthConnector>>,
}

/// Builds the service with every client and hook enabled by `cfg`.
///
/// # Errors
///
/// Returns an error if an enabled JWT or OAuth client is misconfigured.
#[tracing::instrument(skip_all)]
pub fn provide_service(cfg: &AuthNConfig, deps: &Dependencies) -> anyhow::Result<Service> {
    let mut svc = Service::new(Arc::clone(&deps.tokens));

    svc.register_client(Arc::new(RenderClient::new(Arc::clone(&deps.render_keys))));
    svc.register_client(Arc::new(ApiKeyClient::new(Arc::clone(&deps.api_keys))));

    if !cfg.login_cookie_name.is_empty() {
        svc.register_client(Arc::new(SessionClient::new(
            &cfg.login_cookie_name,
            cfg.login_max_lifetime,
            Arc::clone(&deps.tokens),
        )));
        svc.register_post_auth_hook(Arc::new(SessionRefreshHook::new(
            Arc::clone(&deps.tokens),
            cfg.token_rotation_interval,
        )));
    }

    if cfg.anonymous.enabled {
        svc.register_client(Arc::new(AnonymousClient::new(
            cfg.anonymous.clone(),
            Arc::clone(&deps.orgs),
        )));
    }

    let ldap = deps.ldap.as_ref().filter(|_| cfg.ldap_enabled);
    if cfg.ldap_enabled && ldap.is_none() {
        warn!("LDAP is enabled but no LDAP backend was provided");
    }

    let mut backends: Vec<Arc<dyn CredentialBackend>> = Vec::new();
    backends.extend(ldap.cloned());
    if !cfg.disable_login {
        backends.push(Arc::clone(&deps.local));
    }

    if !backends.is_empty() {
        let password = Arc::new(PasswordClient::new(backends.clone()));
        if cfg.basic_auth_enabled {
            svc.register_client(Arc::new(BasicClient::new(Arc::clone(&password))));
        }
        if !cfg.disable_login_form {
            svc.register_client(Arc::new(FormClient::new(password)));
        }
    }

    if cfg.auth_proxy.enabled {
        match ProxyClient::new(&cfg.auth_proxy, backends) {
            Ok(proxy) => svc.register_client(Arc::new(proxy)),
            Err(e) => warn!(error = %e, "Failed to configure auth proxy client"),
        }
    }

    if cfg.jwt.enabled {
        let jwt = JwtClient::new(&cfg.jwt, Arc::clone(&deps.users))
            .context("failed to configure jwt client")?;
        svc.register_client(Arc::new(jwt));
    }

    for (provider, provider_cfg) in &cfg.oauth {
        let Some(connector) = deps.oauth.get(provider) else {
            warn!(provider = %provider, "No OAuth connector for configured provider");
            continue;
        };
        let client = OAuthClient::new(
            provider,
            provider_cfg.clone(),
            Arc::clone(connector),
            Arc::clone(&deps.users),
        )
        .with_context(|| format!("invalid oauth configuration for '{provider}'"))?;
        svc.register_client(Arc::new(client));
    }

    svc.register_post_auth_hook(Arc::new(UserSync::new(Arc::clone(&deps.users))));
    svc.register_post_auth_hook(Arc::new(OrgSync::new(Arc::clone(&deps.users))));
    svc.register_post_auth_hook(Arc::new(UserLastSeenSync::new(Arc::clone(&deps.users))));
    svc.register_post_auth_hook(Arc::new(ApiKeyLastSeenSync::new(Arc::clone(
        &deps.api_keys,
    ))));
    svc.register_post_login_hook(Arc::new(LoginAudit));

    info!(clients = svc.registry().len(), "Initialized authn service");
    Ok(svc)
}

/// Builds the service and wraps it for consumers.
///
/// # Errors
///
/// See [`provide_service`].
pub fn provide_api(cfg: &AuthNConfig, deps: &Dependencies) -> anyhow::Result<Arc<dyn AuthNService>> {
    let svc = provide_service(cfg, deps)?;
    Ok(Arc::new(AuthNLocalClient::new(Arc::new(svc))))
}
