//! `AuthN` service: client dispatch, post-auth hooks and login.

use std::future::Future;
use std::sync::Arc;

use authn_sdk::ports::UserTokenService;
use authn_sdk::{AuthNClient, AuthNError, Identity, PostAuthHook, PostLoginHook, Request};
use tracing::{debug, warn};

use super::network::{ip_from_address, remote_addr};
use super::org::org_id_from_request;
use super::registry::ClientRegistry;

/// Orchestrates authentication over the registered clients.
///
/// Registration takes `&mut self`; once the service is shared behind an
/// `Arc` the client set and hook chains no longer change.
pub struct Service {
    registry: ClientRegistry,
    post_auth_hooks: Vec<Arc<dyn PostAuthHook>>,
    post_login_hooks: Vec<Arc<dyn PostLoginHook>>,
    session_service: Arc<dyn UserTokenService>,
}

impl Service {
    #[must_use]
    pub fn new(session_service: Arc<dyn UserTokenService>) -> Self {
        Self {
            registry: ClientRegistry::new(),
            post_auth_hooks: Vec::new(),
            post_login_hooks: Vec::new(),
            session_service,
        }
    }

    pub fn register_client(&mut self, client: Arc<dyn AuthNClient>) {
        self.registry.register(client);
    }

    pub fn register_post_auth_hook(&mut self, hook: Arc<dyn PostAuthHook>) {
        debug!(hook = hook.name(), "Registered post-auth hook");
        self.post_auth_hooks.push(hook);
    }

    pub fn register_post_login_hook(&mut self, hook: Arc<dyn PostLoginHook>) {
        self.post_login_hooks.push(hook);
    }

    #[must_use]
    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// Tries every context-aware client whose `test` matches `r`, in priority
    /// order, returning the first identity produced.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated("cannot authenticate request")` if no client matched
    /// - the failure itself if exactly one matching client failed
    /// - `Unauthenticated` with every failure as a cause otherwise
    /// - `Cancelled` as soon as the request is cancelled
    #[tracing::instrument(skip_all, fields(org_id))]
    pub async fn authenticate(&self, r: &mut Request) -> Result<Identity, AuthNError> {
        r.org_id = org_id_from_request(r);
        tracing::Span::current().record("org_id", r.org_id);

        let mut failures = Vec::new();
        for client in self.registry.ordered() {
            let Some(candidate) = client.as_context_aware() else {
                continue;
            };
            if !candidate.test(r) {
                continue;
            }

            match self.authenticate_with(client.as_ref(), r).await {
                Ok(identity) => return Ok(identity),
                Err(AuthNError::Cancelled) => return Err(AuthNError::Cancelled),
                Err(e) => {
                    warn!(client = client.name(), error = %e, "Failed to authenticate request");
                    failures.push(e);
                }
            }
        }

        Err(AuthNError::from_failures(failures))
    }

    /// Authenticates `r` with `client` and runs the post-auth hook chain.
    ///
    /// # Errors
    ///
    /// Returns the client's or the first failing hook's error,
    /// `IdentityDisabled` for disabled identities, or `Cancelled`.
    pub async fn authenticate_with(
        &self,
        client: &dyn AuthNClient,
        r: &mut Request,
    ) -> Result<Identity, AuthNError> {
        r.org_id = org_id_from_request(r);
        let r: &Request = r;

        let mut identity = cancellable(r, client.authenticate(r)).await?;
        if identity.auth_module.is_none() {
            identity.auth_module = Some(client.name().to_owned());
        }

        for hook in &self.post_auth_hooks {
            if let Err(e) = cancellable(r, hook.run(&mut identity, r)).await {
                debug!(client = client.name(), hook = hook.name(), error = %e, "Post-auth hook failed");
                return Err(e);
            }
        }

        if identity.is_disabled {
            return Err(AuthNError::IdentityDisabled);
        }

        Ok(identity)
    }

    /// Authenticates with the client named `client_name` and issues a session
    /// token for the resulting user.
    ///
    /// Every post-login hook observes the outcome, whichever way it went.
    ///
    /// # Errors
    ///
    /// - `ClientNotConfigured` if no client has that name
    /// - `UnsupportedIdentity` unless the identity is a persisted user
    /// - any authentication, hook or session issuance error
    #[tracing::instrument(skip_all, fields(client = %client_name))]
    pub async fn login(&self, client_name: &str, r: &mut Request) -> Result<Identity, AuthNError> {
        let result = self.login_inner(client_name, r).await;

        let (identity, err) = match &result {
            Ok(identity) => (Some(identity), None),
            Err(e) => (None, Some(e)),
        };
        for hook in &self.post_login_hooks {
            hook.run(identity, r, err).await;
        }

        result
    }

    async fn login_inner(&self, client_name: &str, r: &mut Request) -> Result<Identity, AuthNError> {
        let client = self
            .registry
            .lookup(client_name)
            .ok_or_else(|| AuthNError::ClientNotConfigured(client_name.to_owned()))?;

        let mut identity = self.authenticate_with(client.as_ref(), r).await?;

        let id = identity.id();
        if !id.is_user() {
            return Err(AuthNError::UnsupportedIdentity(id.namespace().to_string()));
        }

        let client_ip = remote_addr(r).and_then(|addr| match ip_from_address(addr) {
            Ok(ip) => Some(ip),
            Err(e) => {
                debug!(error = %e, "Failed to parse client IP address");
                None
            }
        });

        let token = cancellable(
            r,
            self.session_service
                .create_token(id.id(), client_ip, r.user_agent()),
        )
        .await?;
        identity.session_token = Some(token);

        Ok(identity)
    }

    /// Redirect URL of the redirect-capable client named `client_name`.
    ///
    /// # Errors
    ///
    /// `ClientNotConfigured` for unknown names, `UnsupportedClient` for
    /// clients without a redirect flow, or the client's own error.
    pub async fn redirect_url(&self, client_name: &str, r: &Request) -> Result<String, AuthNError> {
        let client = self
            .registry
            .lookup(client_name)
            .ok_or_else(|| AuthNError::ClientNotConfigured(client_name.to_owned()))?;

        let redirect = client
            .as_redirect()
            .ok_or_else(|| AuthNError::UnsupportedClient(client_name.to_owned()))?;

        cancellable(r, redirect.redirect_url(r)).await
    }
}

/// Races `fut` against the request's cancellation token.
async fn cancellable<T>(
    r: &Request,
    fut: impl Future<Output = Result<T, AuthNError>>,
) -> Result<T, AuthNError> {
    tokio::select! {
        biased;
        () = r.cancellation().cancelled() => Err(AuthNError::Cancelled),
        res = fut => res,
    }
}
