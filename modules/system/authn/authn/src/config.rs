//! Configuration for the `AuthN` module.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use authn_sdk::OrgRole;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

/// Prefix of environment variables overriding the file configuration,
/// e.g. `AUTHN__JWT__ENABLED=true`.
pub const ENV_PREFIX: &str = "AUTHN__";

/// Configuration.
///
/// Every section is optional; an empty document yields the defaults.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthNConfig {
    /// Session cookie name. Session authentication is off when empty.
    pub login_cookie_name: String,

    /// Maximum age of a session token, e.g. `"30d"`.
    #[serde(deserialize_with = "deserialize_duration")]
    pub login_max_lifetime: Duration,

    /// Session tokens older than this are rotated, e.g. `"10m"`.
    #[serde(deserialize_with = "deserialize_duration")]
    pub token_rotation_interval: Duration,

    /// Disables the local password database.
    pub disable_login: bool,

    /// Disables the login form client.
    pub disable_login_form: bool,

    pub basic_auth_enabled: bool,

    /// Enables the LDAP password backend, when one is provided.
    pub ldap_enabled: bool,

    pub anonymous: AnonymousConfig,
    pub auth_proxy: AuthProxyConfig,
    pub jwt: JwtConfig,

    /// OAuth providers by name (`github`, `gitlab`, ...).
    pub oauth: BTreeMap<String, OAuthProviderConfig>,
}

impl Default for AuthNConfig {
    fn default() -> Self {
        Self {
            login_cookie_name: "grafana_session".to_owned(),
            login_max_lifetime: Duration::from_secs(30 * 24 * 60 * 60),
            token_rotation_interval: Duration::from_secs(10 * 60),
            disable_login: false,
            disable_login_form: false,
            basic_auth_enabled: true,
            ldap_enabled: false,
            anonymous: AnonymousConfig::default(),
            auth_proxy: AuthProxyConfig::default(),
            jwt: JwtConfig::default(),
            oauth: BTreeMap::new(),
        }
    }
}

impl AuthNConfig {
    /// Layers the YAML file at `path` (if any) and `AUTHN__*` environment
    /// variables over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or a value does not match the schema.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            anyhow::ensure!(
                path.is_file(),
                "authn config file not found: {}",
                path.display()
            );
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid authn configuration")
    }
}

/// Anonymous access.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnonymousConfig {
    pub enabled: bool,
    /// Org anonymous users are placed in.
    pub org_name: String,
    pub org_role: OrgRole,
}

impl Default for AnonymousConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            org_name: "Main Org.".to_owned(),
            org_role: OrgRole::Viewer,
        }
    }
}

/// Authentication by a trusted reverse proxy header.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthProxyConfig {
    pub enabled: bool,
    /// Header carrying the authenticated username.
    pub header_name: String,
    /// Additional profile headers, e.g. `Email: X-WEBAUTH-EMAIL`.
    pub headers: HashMap<String, String>,
    /// Comma-separated IPs or CIDR ranges allowed to send the header.
    /// Empty allows any peer.
    pub whitelist: String,
}

impl Default for AuthProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            header_name: "X-WEBAUTH-USER".to_owned(),
            headers: HashMap::new(),
            whitelist: String::new(),
        }
    }
}

/// JSON Web Token authentication.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JwtConfig {
    pub enabled: bool,
    pub header_name: String,
    /// HMAC secret used to verify token signatures.
    #[serde(deserialize_with = "deserialize_secret")]
    pub secret: Option<SecretString>,
    /// Claim holding the user's login.
    pub login_claim: String,
    pub email_claim: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            header_name: "X-JWT-Assertion".to_owned(),
            secret: None,
            login_claim: "login".to_owned(),
            email_claim: "email".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OAuthProviderConfig {
    pub client_id: String,
    /// Authorization endpoint of the provider.
    pub auth_url: String,
    /// Callback URL registered with the provider.
    pub redirect_url: String,
    pub scopes: Vec<String>,
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|s| !s.is_empty())
        .map(SecretString::from))
}
