//! Service implementation for the static `AuthN` plugin.

use std::collections::HashMap;

use authn_sdk::{Identity, NamespacedId};

use crate::config::{AuthNMode, IdentityConfig, StaticAuthNPluginConfig};

/// Static `AuthN` service.
///
/// Provides token-to-identity mapping based on configuration mode:
/// - `accept_all`: Any non-empty token maps to the default identity
/// - `static_tokens`: Specific tokens map to specific identities
pub struct Service {
    pub(super) priority: i16,
    pub(super) header_name: String,
    mode: AuthNMode,
    default_identity: IdentityConfig,
    token_map: HashMap<String, IdentityConfig>,
}

impl Service {
    /// Create a service from plugin configuration.
    #[must_use]
    pub fn from_config(cfg: &StaticAuthNPluginConfig) -> Self {
        let token_map: HashMap<String, IdentityConfig> = cfg
            .tokens
            .iter()
            .map(|m| (m.token.clone(), m.identity.clone()))
            .collect();

        Self {
            priority: cfg.priority,
            header_name: cfg.header_name.clone(),
            mode: cfg.mode,
            default_identity: cfg.default_identity.clone(),
            token_map,
        }
    }

    /// Resolve a token to its identity.
    ///
    /// Returns `None` if the token is not recognized (in `static_tokens` mode)
    /// or empty.
    #[must_use]
    pub fn authenticate(&self, token: &str) -> Option<Identity> {
        if token.is_empty() {
            return None;
        }

        let identity = match self.mode {
            AuthNMode::AcceptAll => &self.default_identity,
            AuthNMode::StaticTokens => self.token_map.get(token)?,
        };

        Some(build_identity(identity))
    }
}

fn build_identity(cfg: &IdentityConfig) -> Identity {
    Identity::builder(NamespacedId::new(cfg.namespace, cfg.id))
        .org_id(cfg.org_id)
        .org_role(cfg.org_id, cfg.org_role)
        .login(&cfg.login)
        .build()
}
