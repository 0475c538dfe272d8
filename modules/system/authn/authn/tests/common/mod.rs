#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! In-memory backing store wired into every collaborator slot.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use authn::{AuthNConfig, Dependencies};
use authn_sdk::ports::{
    ApiKeyRecord, ApiKeyStore, ExternalUserInfo, OAuthConnector, Org, OrgDirectory,
    OrgMembership, RenderKeyStore, RenderUser, UserDirectory, UserRecord, UserTokenService,
};
use authn_sdk::{
    AuthNError, CredentialBackend, Identity, NamespacedId, OrgRole, Request, UserToken,
};
use bytes::Bytes;
use chrono::Utc;
use figment::Figment;
use figment::providers::{Format, Yaml};
use parking_lot::Mutex;
use secrecy::ExposeSecret;

pub struct StoredUser {
    pub record: UserRecord,
    pub password: String,
    pub orgs: Vec<OrgMembership>,
}

#[derive(Default)]
pub struct Store {
    users: Mutex<Vec<StoredUser>>,
    orgs: Vec<Org>,
    api_keys: HashMap<String, ApiKeyRecord>,
    tokens: Mutex<Vec<UserToken>>,
    next_token: AtomicI64,
    pub last_seen: Mutex<Vec<i64>>,
}

impl Store {
    pub fn seeded() -> Arc<Self> {
        let main = OrgMembership {
            org_id: 1,
            org_name: "Main Org.".to_owned(),
            role: OrgRole::Admin,
        };
        let users = vec![
            StoredUser {
                record: UserRecord {
                    id: 42,
                    login: "alice".to_owned(),
                    name: "Alice".to_owned(),
                    email: "alice@example.com".to_owned(),
                    ..UserRecord::default()
                },
                password: "alice-pw".to_owned(),
                orgs: vec![main.clone()],
            },
            StoredUser {
                record: UserRecord {
                    id: 43,
                    login: "bob".to_owned(),
                    is_disabled: true,
                    ..UserRecord::default()
                },
                password: "bob-pw".to_owned(),
                orgs: vec![main],
            },
        ];
        let api_keys = HashMap::from([(
            "glsa_key".to_owned(),
            ApiKeyRecord {
                id: 5,
                org_id: 1,
                role: OrgRole::Viewer,
                expires_at: None,
                is_revoked: false,
                service_account_id: None,
            },
        )]);
        Arc::new(Self {
            users: Mutex::new(users),
            orgs: vec![Org {
                id: 1,
                name: "Main Org.".to_owned(),
            }],
            api_keys,
            ..Self::default()
        })
    }

    pub fn deps(self: &Arc<Self>) -> Dependencies {
        let github: Arc<dyn OAuthConnector> = Arc::new(GithubStub);
        Dependencies {
            tokens: self.clone(),
            users: self.clone(),
            orgs: self.clone(),
            api_keys: self.clone(),
            render_keys: self.clone(),
            ldap: None,
            local: self.clone(),
            oauth: HashMap::from([("github".to_owned(), github)]),
        }
    }

    fn user_where(&self, pred: impl Fn(&UserRecord) -> bool) -> Option<UserRecord> {
        self.users
            .lock()
            .iter()
            .find(|u| pred(&u.record))
            .map(|u| u.record.clone())
    }
}

pub fn config(yaml: &str) -> AuthNConfig {
    Figment::new().merge(Yaml::string(yaml)).extract().unwrap()
}

pub fn request(uri: &str, headers: &[(&str, &str)], body: &str) -> Request {
    let mut builder = http::Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    Request::new(builder.body(Bytes::from(body.to_owned())).unwrap())
        .with_remote_addr("192.0.2.10:52000")
}

#[async_trait]
impl UserTokenService for Store {
    async fn create_token(
        &self,
        user_id: i64,
        client_ip: Option<IpAddr>,
        user_agent: &str,
    ) -> Result<UserToken, AuthNError> {
        let id = self.next_token.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let token = UserToken {
            id,
            user_id,
            unhashed_token: format!("token-{id}").into(),
            client_ip,
            user_agent: user_agent.to_owned(),
            created_at: now,
            rotated_at: now,
        };
        self.tokens.lock().push(token.clone());
        Ok(token)
    }

    async fn lookup_token(&self, unhashed_token: &str) -> Result<UserToken, AuthNError> {
        self.tokens
            .lock()
            .iter()
            .find(|t| t.unhashed_token.expose_secret() == unhashed_token)
            .cloned()
            .ok_or_else(|| AuthNError::unauthenticated("user token not found"))
    }

    async fn rotate_token(
        &self,
        token: &UserToken,
        _client_ip: Option<IpAddr>,
        _user_agent: &str,
    ) -> Result<UserToken, AuthNError> {
        Ok(token.clone())
    }
}

#[async_trait]
impl UserDirectory for Store {
    async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>, AuthNError> {
        Ok(self.user_where(|u| u.id == user_id))
    }

    async fn get_user_by_login(&self, login: &str) -> Result<Option<UserRecord>, AuthNError> {
        Ok(self.user_where(|u| u.login == login))
    }

    async fn get_org_memberships(&self, user_id: i64) -> Result<Vec<OrgMembership>, AuthNError> {
        Ok(self
            .users
            .lock()
            .iter()
            .find(|u| u.record.id == user_id)
            .map(|u| u.orgs.clone())
            .unwrap_or_default())
    }

    async fn update_last_seen(&self, user_id: i64) -> Result<(), AuthNError> {
        self.last_seen.lock().push(user_id);
        Ok(())
    }

    async fn set_disabled(&self, user_id: i64, disabled: bool) -> Result<(), AuthNError> {
        if let Some(user) = self.users.lock().iter_mut().find(|u| u.record.id == user_id) {
            user.record.is_disabled = disabled;
        }
        Ok(())
    }
}

#[async_trait]
impl OrgDirectory for Store {
    async fn get_org_by_name(&self, name: &str) -> Result<Option<Org>, AuthNError> {
        Ok(self.orgs.iter().find(|o| o.name == name).cloned())
    }
}

#[async_trait]
impl ApiKeyStore for Store {
    async fn get_by_key(&self, key: &str) -> Result<Option<ApiKeyRecord>, AuthNError> {
        Ok(self.api_keys.get(key).cloned())
    }

    async fn update_last_used(&self, _key_id: i64) -> Result<(), AuthNError> {
        Ok(())
    }
}

#[async_trait]
impl RenderKeyStore for Store {
    async fn get_render_user(&self, _key: &str) -> Option<RenderUser> {
        None
    }
}

#[async_trait]
impl CredentialBackend for Store {
    fn name(&self) -> &str {
        "grafana"
    }

    async fn authenticate_password(
        &self,
        r: &Request,
        username: &str,
        password: &str,
    ) -> Result<Identity, AuthNError> {
        let users = self.users.lock();
        let user = users
            .iter()
            .find(|u| u.record.login == username && u.password == password)
            .ok_or_else(|| AuthNError::unauthenticated("invalid username or password"))?;
        Ok(Identity::builder(NamespacedId::user(user.record.id))
            .org_id(r.org_id)
            .login(&user.record.login)
            .client_params(authn_sdk::ClientParams {
                fetch_user: true,
                sync_org_roles: true,
                ..authn_sdk::ClientParams::default()
            })
            .build())
    }

    async fn authenticate_proxy(
        &self,
        _r: &Request,
        _username: &str,
        _additional: &HashMap<String, String>,
    ) -> Result<Identity, AuthNError> {
        Err(AuthNError::unauthenticated("proxy login not supported"))
    }
}

struct GithubStub;

#[async_trait]
impl OAuthConnector for GithubStub {
    async fn exchange_code(&self, code: &str) -> Result<ExternalUserInfo, AuthNError> {
        if code != "gh-code" {
            return Err(AuthNError::unauthenticated("invalid authorization code"));
        }
        Ok(ExternalUserInfo {
            id: "1001".to_owned(),
            login: "alice".to_owned(),
            ..ExternalUserInfo::default()
        })
    }
}
