//! Configuration for the static `AuthN` plugin.

use authn_sdk::{Namespace, OrgRole};
use serde::Deserialize;

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticAuthNPluginConfig {
    /// Client priority (lower = tried earlier). The default sits behind the
    /// built-in credential clients and ahead of anonymous access (100),
    /// which matches every request.
    pub priority: i16,

    /// Header carrying the token. For `Authorization` the `Bearer ` scheme
    /// is required and stripped; any other header is used verbatim.
    pub header_name: String,

    /// Authentication mode.
    pub mode: AuthNMode,

    /// Default identity returned in `accept_all` mode.
    pub default_identity: IdentityConfig,

    /// Static token-to-identity mappings for `static_tokens` mode.
    pub tokens: Vec<TokenMapping>,
}

impl Default for StaticAuthNPluginConfig {
    fn default() -> Self {
        Self {
            priority: 90,
            header_name: "Authorization".to_owned(),
            mode: AuthNMode::AcceptAll,
            default_identity: IdentityConfig::default(),
            tokens: Vec::new(),
        }
    }
}

/// Authentication mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthNMode {
    /// Accept any non-empty token and return the default identity.
    #[default]
    AcceptAll,
    /// Map specific tokens to specific identities.
    StaticTokens,
}

/// Identity handed out for a token.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    pub namespace: Namespace,
    pub id: i64,
    pub org_id: i64,
    pub org_role: OrgRole,
    pub login: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            namespace: Namespace::User,
            id: 1,
            org_id: 1,
            org_role: OrgRole::Admin,
            login: "admin".to_owned(),
        }
    }
}

/// Maps a static token to a specific identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenMapping {
    /// The token value to match.
    pub token: String,
    /// The identity to return when this token is presented.
    pub identity: IdentityConfig,
}
