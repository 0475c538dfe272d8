//! Domain models for the `AuthN` module.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Kind of subject an identity represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Namespace {
    User,
    ApiKey,
    ServiceAccount,
    Anonymous,
    #[serde(rename = "render")]
    RenderService,
    ExternalService,
}

impl Namespace {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::ApiKey => "api-key",
            Self::ServiceAccount => "service-account",
            Self::Anonymous => "anonymous",
            Self::RenderService => "render",
            Self::ExternalService => "external-service",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = ParseNamespacedIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "api-key" => Ok(Self::ApiKey),
            "service-account" => Ok(Self::ServiceAccount),
            "anonymous" => Ok(Self::Anonymous),
            "render" => Ok(Self::RenderService),
            "external-service" => Ok(Self::ExternalService),
            other => Err(ParseNamespacedIdError::UnknownNamespace(other.to_owned())),
        }
    }
}

/// Error returned when parsing a `"<namespace>:<id>"` string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseNamespacedIdError {
    #[error("expected '<namespace>:<id>', got '{0}'")]
    Malformed(String),

    #[error("unknown namespace '{0}'")]
    UnknownNamespace(String),

    #[error("invalid id '{0}'")]
    InvalidId(String),
}

/// Namespace-qualified subject identifier, e.g. `user:42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespacedId {
    namespace: Namespace,
    id: i64,
}

impl NamespacedId {
    #[must_use]
    pub fn new(namespace: Namespace, id: i64) -> Self {
        Self { namespace, id }
    }

    #[must_use]
    pub fn user(id: i64) -> Self {
        Self::new(Namespace::User, id)
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(Namespace::Anonymous, 0)
    }

    #[must_use]
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    #[must_use]
    pub fn id(&self) -> i64 {
        self.id
    }

    /// True for a user account with a persisted (positive) id.
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.namespace == Namespace::User && self.id > 0
    }
}

impl fmt::Display for NamespacedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.id)
    }
}

impl FromStr for NamespacedId {
    type Err = ParseNamespacedIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, id) = s
            .split_once(':')
            .ok_or_else(|| ParseNamespacedIdError::Malformed(s.to_owned()))?;
        let namespace = namespace.parse()?;
        let id = id
            .parse()
            .map_err(|_| ParseNamespacedIdError::InvalidId(id.to_owned()))?;
        Ok(Self { namespace, id })
    }
}

/// Role of an identity within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrgRole {
    #[default]
    None,
    Viewer,
    Editor,
    Admin,
}

/// Instructions from the authenticating client to the post-auth hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientParams {
    /// Load the backing user record and copy its profile onto the identity.
    pub fetch_user: bool,
    /// Replace the identity's org roles with the user's stored memberships.
    pub sync_org_roles: bool,
    /// Re-enable a disabled user record instead of rejecting the identity.
    pub enable_disabled_users: bool,
}

/// Persisted session token issued on login.
#[derive(Debug, Clone)]
pub struct UserToken {
    pub id: i64,
    pub user_id: i64,
    /// Value handed to the client (cookie). Redacted in `Debug`.
    pub unhashed_token: SecretString,
    pub client_ip: Option<IpAddr>,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
    pub rotated_at: DateTime<Utc>,
}

/// Canonical result of a successful authentication.
///
/// The namespaced id is fixed by the client that created the identity;
/// post-auth hooks can only touch the remaining fields.
#[derive(Debug, Clone)]
pub struct Identity {
    id: NamespacedId,
    pub org_id: i64,
    pub org_name: String,
    pub org_roles: BTreeMap<i64, OrgRole>,
    pub login: String,
    pub name: String,
    pub email: String,
    pub is_server_admin: bool,
    pub is_disabled: bool,
    /// Name of the client that authenticated this identity.
    pub auth_module: Option<String>,
    /// Subject identifier at the external provider (JWT `sub`, LDAP DN, ...).
    pub auth_id: Option<String>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub claims: serde_json::Map<String, serde_json::Value>,
    /// Token issued by login, or the session token the request authenticated with.
    pub session_token: Option<UserToken>,
    pub client_params: ClientParams,
}

impl Identity {
    #[must_use]
    pub fn builder(id: NamespacedId) -> IdentityBuilder {
        IdentityBuilder::new(id)
    }

    #[must_use]
    pub fn id(&self) -> NamespacedId {
        self.id
    }

    #[must_use]
    pub fn namespace(&self) -> Namespace {
        self.id.namespace()
    }

    /// Role in the identity's current org.
    #[must_use]
    pub fn role(&self) -> OrgRole {
        self.org_roles.get(&self.org_id).copied().unwrap_or_default()
    }
}

pub struct IdentityBuilder {
    identity: Identity,
}

impl IdentityBuilder {
    fn new(id: NamespacedId) -> Self {
        Self {
            identity: Identity {
                id,
                org_id: 0,
                org_name: String::new(),
                org_roles: BTreeMap::new(),
                login: String::new(),
                name: String::new(),
                email: String::new(),
                is_server_admin: false,
                is_disabled: false,
                auth_module: None,
                auth_id: None,
                last_seen_at: None,
                claims: serde_json::Map::new(),
                session_token: None,
                client_params: ClientParams::default(),
            },
        }
    }

    #[must_use]
    pub fn org_id(mut self, org_id: i64) -> Self {
        self.identity.org_id = org_id;
        self
    }

    #[must_use]
    pub fn org_name(mut self, org_name: &str) -> Self {
        self.identity.org_name = org_name.to_owned();
        self
    }

    #[must_use]
    pub fn org_role(mut self, org_id: i64, role: OrgRole) -> Self {
        self.identity.org_roles.insert(org_id, role);
        self
    }

    #[must_use]
    pub fn login(mut self, login: &str) -> Self {
        self.identity.login = login.to_owned();
        self
    }

    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.identity.name = name.to_owned();
        self
    }

    #[must_use]
    pub fn email(mut self, email: &str) -> Self {
        self.identity.email = email.to_owned();
        self
    }

    #[must_use]
    pub fn auth_module(mut self, module: &str) -> Self {
        self.identity.auth_module = Some(module.to_owned());
        self
    }

    #[must_use]
    pub fn auth_id(mut self, auth_id: &str) -> Self {
        self.identity.auth_id = Some(auth_id.to_owned());
        self
    }

    #[must_use]
    pub fn claim(mut self, key: &str, value: serde_json::Value) -> Self {
        self.identity.claims.insert(key.to_owned(), value);
        self
    }

    #[must_use]
    pub fn session_token(mut self, token: UserToken) -> Self {
        self.identity.session_token = Some(token);
        self
    }

    #[must_use]
    pub fn client_params(mut self, params: ClientParams) -> Self {
        self.identity.client_params = params;
        self
    }

    #[must_use]
    pub fn build(self) -> Identity {
        self.identity
    }
}
