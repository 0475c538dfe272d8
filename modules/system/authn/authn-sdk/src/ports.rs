//! Outbound collaborators used by the built-in clients and hooks.
//!
//! Storage and verification details live behind these traits; the `AuthN`
//! module only orchestrates calls to them.

use std::net::IpAddr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AuthNError;
use crate::models::{OrgRole, UserToken};

/// Session token persistence.
#[async_trait]
pub trait UserTokenService: Send + Sync {
    /// Issue and persist a new session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be persisted.
    async fn create_token(
        &self,
        user_id: i64,
        client_ip: Option<IpAddr>,
        user_agent: &str,
    ) -> Result<UserToken, AuthNError>;

    /// Resolve a token from its unhashed (cookie) value.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` if the token is unknown or revoked.
    async fn lookup_token(&self, unhashed_token: &str) -> Result<UserToken, AuthNError>;

    /// Replace the token value, returning the rotated token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be rotated.
    async fn rotate_token(
        &self,
        token: &UserToken,
        client_ip: Option<IpAddr>,
        user_agent: &str,
    ) -> Result<UserToken, AuthNError>;
}

/// Stored user account.
#[derive(Debug, Clone, Default)]
pub struct UserRecord {
    pub id: i64,
    pub login: String,
    pub name: String,
    pub email: String,
    pub is_server_admin: bool,
    pub is_disabled: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// Membership of a user in an organization.
#[derive(Debug, Clone)]
pub struct OrgMembership {
    pub org_id: i64,
    pub org_name: String,
    pub role: OrgRole,
}

#[derive(Debug, Clone)]
pub struct Org {
    pub id: i64,
    pub name: String,
}

/// User account lookups and updates.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the directory cannot be queried.
    async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>, AuthNError>;

    /// # Errors
    ///
    /// Returns an error if the directory cannot be queried.
    async fn get_user_by_login(&self, login: &str) -> Result<Option<UserRecord>, AuthNError>;

    /// Memberships ordered by preference; the first entry is the default org.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be queried.
    async fn get_org_memberships(&self, user_id: i64) -> Result<Vec<OrgMembership>, AuthNError>;

    /// # Errors
    ///
    /// Returns an error if the update fails.
    async fn update_last_seen(&self, user_id: i64) -> Result<(), AuthNError>;

    /// # Errors
    ///
    /// Returns an error if the update fails.
    async fn set_disabled(&self, user_id: i64, disabled: bool) -> Result<(), AuthNError>;
}

/// Organization lookups.
#[async_trait]
pub trait OrgDirectory: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the directory cannot be queried.
    async fn get_org_by_name(&self, name: &str) -> Result<Option<Org>, AuthNError>;
}

/// Stored API key.
#[derive(Debug, Clone)]
pub struct ApiKeyRecord {
    pub id: i64,
    pub org_id: i64,
    pub role: OrgRole,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_revoked: bool,
    /// Set when the key belongs to a service account.
    pub service_account_id: Option<i64>,
}

/// API key lookups.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    async fn get_by_key(&self, key: &str) -> Result<Option<ApiKeyRecord>, AuthNError>;

    /// # Errors
    ///
    /// Returns an error if the update fails.
    async fn update_last_used(&self, key_id: i64) -> Result<(), AuthNError>;
}

/// User on whose behalf the image renderer calls back.
#[derive(Debug, Clone)]
pub struct RenderUser {
    pub org_id: i64,
    /// Zero or negative when the render runs without a backing user.
    pub user_id: i64,
    pub org_role: OrgRole,
}

/// Render key lookups.
#[async_trait]
pub trait RenderKeyStore: Send + Sync {
    async fn get_render_user(&self, key: &str) -> Option<RenderUser>;
}

/// Profile returned by an external identity provider.
#[derive(Debug, Clone, Default)]
pub struct ExternalUserInfo {
    pub id: String,
    pub login: String,
    pub email: String,
    pub name: String,
}

/// Authorization-code exchange with an OAuth provider.
#[async_trait]
pub trait OAuthConnector: Send + Sync {
    /// Exchange the callback `code` for the user's profile.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` if the provider rejects the code.
    async fn exchange_code(&self, code: &str) -> Result<ExternalUserInfo, AuthNError>;
}
