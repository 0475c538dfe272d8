#![allow(clippy::unwrap_used, clippy::expect_used)]

//! In-memory clients, hooks and collaborators shared by the unit tests.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use authn_sdk::ports::{
    ApiKeyRecord, ApiKeyStore, ExternalUserInfo, OAuthConnector, Org, OrgDirectory,
    OrgMembership, RenderKeyStore, RenderUser, UserDirectory, UserRecord, UserTokenService,
};
use authn_sdk::{
    AuthNClient, AuthNError, ContextAwareClient, CredentialBackend, Identity, NamespacedId,
    PostAuthHook, PostLoginHook, RedirectClient, Request, UserToken,
};
use bytes::Bytes;
use chrono::Utc;
use parking_lot::Mutex;

type IdentityFn = Box<dyn Fn(&Request) -> Result<Identity, AuthNError> + Send + Sync>;

/// Configurable client: context-aware when given a priority, redirect-capable
/// when given a URL.
pub struct MockClient {
    name: String,
    priority: Option<i16>,
    matches: bool,
    redirect: Option<String>,
    result: IdentityFn,
    calls: Arc<AtomicUsize>,
    tests: Arc<AtomicUsize>,
}

impl MockClient {
    pub fn new(
        name: &str,
        result: impl Fn(&Request) -> Result<Identity, AuthNError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.to_owned(),
            priority: None,
            matches: true,
            redirect: None,
            result: Box::new(result),
            calls: Arc::new(AtomicUsize::new(0)),
            tests: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns `user:<id>` with the request's org.
    pub fn user(name: &str, id: i64) -> Self {
        Self::new(name, move |r| {
            Ok(Identity::builder(NamespacedId::user(id))
                .org_id(r.org_id)
                .login(&format!("user{id}"))
                .build())
        })
    }

    pub fn failing(name: &str, reason: &str) -> Self {
        let reason = reason.to_owned();
        Self::new(name, move |_| Err(AuthNError::unauthenticated(reason.clone())))
    }

    #[must_use]
    pub fn dispatch(mut self, priority: i16) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn not_matching(mut self) -> Self {
        self.matches = false;
        self
    }

    #[must_use]
    pub fn redirect(mut self, url: &str) -> Self {
        self.redirect = Some(url.to_owned());
        self
    }

    /// Counter of `authenticate` calls.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Counter of `test` calls.
    pub fn tests(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.tests)
    }

    pub fn into_arc(self) -> Arc<dyn AuthNClient> {
        Arc::new(self)
    }
}

#[async_trait]
impl AuthNClient for MockClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn authenticate(&self, r: &Request) -> Result<Identity, AuthNError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.result)(r)
    }

    fn as_context_aware(&self) -> Option<&dyn ContextAwareClient> {
        self.priority.map(|_| self as &dyn ContextAwareClient)
    }

    fn as_redirect(&self) -> Option<&dyn RedirectClient> {
        self.redirect.as_ref().map(|_| self as &dyn RedirectClient)
    }
}

impl ContextAwareClient for MockClient {
    fn test(&self, _r: &Request) -> bool {
        self.tests.fetch_add(1, Ordering::SeqCst);
        self.matches
    }

    fn priority(&self) -> i16 {
        self.priority.unwrap_or_default()
    }
}

#[async_trait]
impl RedirectClient for MockClient {
    async fn redirect_url(&self, _r: &Request) -> Result<String, AuthNError> {
        Ok(self.redirect.clone().unwrap_or_default())
    }
}

type HookFn = Box<dyn Fn(&mut Identity) -> Result<(), AuthNError> + Send + Sync>;

/// Post-auth hook driven by a closure, recording the ids it saw.
pub struct FnHook {
    name: String,
    f: HookFn,
    seen: Arc<Mutex<Vec<NamespacedId>>>,
}

impl FnHook {
    pub fn new(
        name: &str,
        f: impl Fn(&mut Identity) -> Result<(), AuthNError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.to_owned(),
            f: Box::new(f),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn noop(name: &str) -> Self {
        Self::new(name, |_| Ok(()))
    }

    pub fn seen(&self) -> Arc<Mutex<Vec<NamespacedId>>> {
        Arc::clone(&self.seen)
    }
}

#[async_trait]
impl PostAuthHook for FnHook {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, identity: &mut Identity, _r: &Request) -> Result<(), AuthNError> {
        self.seen.lock().push(identity.id());
        (self.f)(identity)
    }
}

/// What a post-login hook observed.
#[derive(Debug, Clone)]
pub struct LoginObservation {
    pub id: Option<NamespacedId>,
    pub has_session: bool,
    pub error: Option<String>,
}

#[derive(Default)]
pub struct RecordingLoginHook {
    pub observed: Mutex<Vec<LoginObservation>>,
}

#[async_trait]
impl PostLoginHook for RecordingLoginHook {
    async fn run(&self, identity: Option<&Identity>, _r: &Request, err: Option<&AuthNError>) {
        self.observed.lock().push(LoginObservation {
            id: identity.map(Identity::id),
            has_session: identity.is_some_and(|i| i.session_token.is_some()),
            error: err.map(ToString::to_string),
        });
    }
}

/// Session token store keyed by the unhashed token value.
#[derive(Default)]
pub struct FakeTokenService {
    next_id: AtomicI64,
    pub tokens: Mutex<HashMap<String, UserToken>>,
    pub created: Mutex<Vec<(i64, Option<IpAddr>, String)>>,
    pub rotated: Mutex<Vec<i64>>,
    pub fail_create: bool,
}

impl FakeTokenService {
    /// Store whose `create_token` always fails.
    pub fn failing() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    pub fn with_token(self, value: &str, token: UserToken) -> Self {
        self.tokens.lock().insert(value.to_owned(), token);
        self
    }
}

pub fn user_token(id: i64, user_id: i64, value: &str) -> UserToken {
    let now = Utc::now();
    UserToken {
        id,
        user_id,
        unhashed_token: value.to_owned().into(),
        client_ip: None,
        user_agent: String::new(),
        created_at: now,
        rotated_at: now,
    }
}

#[async_trait]
impl UserTokenService for FakeTokenService {
    async fn create_token(
        &self,
        user_id: i64,
        client_ip: Option<IpAddr>,
        user_agent: &str,
    ) -> Result<UserToken, AuthNError> {
        if self.fail_create {
            return Err(AuthNError::internal("token store unavailable"));
        }
        self.created
            .lock()
            .push((user_id, client_ip, user_agent.to_owned()));
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let value = format!("session-{id}");
        let mut token = user_token(id, user_id, &value);
        token.client_ip = client_ip;
        token.user_agent = user_agent.to_owned();
        self.tokens.lock().insert(value, token.clone());
        Ok(token)
    }

    async fn lookup_token(&self, unhashed_token: &str) -> Result<UserToken, AuthNError> {
        self.tokens
            .lock()
            .get(unhashed_token)
            .cloned()
            .ok_or_else(|| AuthNError::unauthenticated("user token not found"))
    }

    async fn rotate_token(
        &self,
        token: &UserToken,
        _client_ip: Option<IpAddr>,
        _user_agent: &str,
    ) -> Result<UserToken, AuthNError> {
        self.rotated.lock().push(token.id);
        let mut rotated = token.clone();
        rotated.unhashed_token = format!("rotated-{}", token.id).into();
        rotated.rotated_at = Utc::now();
        Ok(rotated)
    }
}

#[derive(Default)]
pub struct FakeUserDirectory {
    pub users: Mutex<HashMap<i64, UserRecord>>,
    pub memberships: Mutex<HashMap<i64, Vec<OrgMembership>>>,
    pub last_seen_updates: Mutex<Vec<i64>>,
    pub disabled_updates: Mutex<Vec<(i64, bool)>>,
}

impl FakeUserDirectory {
    pub fn with_user(self, user: UserRecord) -> Self {
        self.users.lock().insert(user.id, user);
        self
    }

    pub fn with_memberships(self, user_id: i64, memberships: Vec<OrgMembership>) -> Self {
        self.memberships.lock().insert(user_id, memberships);
        self
    }
}

pub fn user_record(id: i64, login: &str) -> UserRecord {
    UserRecord {
        id,
        login: login.to_owned(),
        name: format!("{login} name"),
        email: format!("{login}@example.com"),
        ..UserRecord::default()
    }
}

#[async_trait]
impl UserDirectory for FakeUserDirectory {
    async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>, AuthNError> {
        Ok(self.users.lock().get(&user_id).cloned())
    }

    async fn get_user_by_login(&self, login: &str) -> Result<Option<UserRecord>, AuthNError> {
        Ok(self
            .users
            .lock()
            .values()
            .find(|u| u.login == login)
            .cloned())
    }

    async fn get_org_memberships(&self, user_id: i64) -> Result<Vec<OrgMembership>, AuthNError> {
        Ok(self
            .memberships
            .lock()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_last_seen(&self, user_id: i64) -> Result<(), AuthNError> {
        self.last_seen_updates.lock().push(user_id);
        Ok(())
    }

    async fn set_disabled(&self, user_id: i64, disabled: bool) -> Result<(), AuthNError> {
        self.disabled_updates.lock().push((user_id, disabled));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeOrgDirectory {
    pub orgs: Vec<Org>,
}

#[async_trait]
impl OrgDirectory for FakeOrgDirectory {
    async fn get_org_by_name(&self, name: &str) -> Result<Option<Org>, AuthNError> {
        Ok(self.orgs.iter().find(|o| o.name == name).cloned())
    }
}

#[derive(Default)]
pub struct FakeApiKeyStore {
    pub keys: HashMap<String, ApiKeyRecord>,
    pub used: Mutex<Vec<i64>>,
}

#[async_trait]
impl ApiKeyStore for FakeApiKeyStore {
    async fn get_by_key(&self, key: &str) -> Result<Option<ApiKeyRecord>, AuthNError> {
        Ok(self.keys.get(key).cloned())
    }

    async fn update_last_used(&self, key_id: i64) -> Result<(), AuthNError> {
        self.used.lock().push(key_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeRenderKeyStore {
    pub users: HashMap<String, RenderUser>,
}

#[async_trait]
impl RenderKeyStore for FakeRenderKeyStore {
    async fn get_render_user(&self, key: &str) -> Option<RenderUser> {
        self.users.get(key).cloned()
    }
}

/// Accepts a single username/password pair and resolves proxy users by login.
pub struct FakeBackend {
    pub name: String,
    pub username: String,
    pub password: String,
    pub user_id: i64,
    pub calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new(name: &str, username: &str, password: &str, user_id: i64) -> Self {
        Self {
            name: name.to_owned(),
            username: username.to_owned(),
            password: password.to_owned(),
            user_id,
            calls: AtomicUsize::new(0),
        }
    }

    fn identity(&self, r: &Request) -> Identity {
        Identity::builder(NamespacedId::user(self.user_id))
            .org_id(r.org_id)
            .login(&self.username)
            .auth_module(&self.name)
            .build()
    }
}

#[async_trait]
impl CredentialBackend for FakeBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn authenticate_password(
        &self,
        r: &Request,
        username: &str,
        password: &str,
    ) -> Result<Identity, AuthNError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if username == self.username && password == self.password {
            Ok(self.identity(r))
        } else {
            Err(AuthNError::unauthenticated(format!(
                "{}: invalid username or password",
                self.name
            )))
        }
    }

    async fn authenticate_proxy(
        &self,
        r: &Request,
        username: &str,
        additional: &HashMap<String, String>,
    ) -> Result<Identity, AuthNError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if username != self.username {
            return Err(AuthNError::unauthenticated(format!(
                "{}: user not found",
                self.name
            )));
        }
        let mut identity = self.identity(r);
        if let Some(email) = additional.get("Email") {
            identity.email.clone_from(email);
        }
        Ok(identity)
    }
}

pub struct FakeOAuthConnector {
    pub code: String,
    pub user: ExternalUserInfo,
}

#[async_trait]
impl OAuthConnector for FakeOAuthConnector {
    async fn exchange_code(&self, code: &str) -> Result<ExternalUserInfo, AuthNError> {
        if code == self.code {
            Ok(self.user.clone())
        } else {
            Err(AuthNError::unauthenticated("invalid authorization code"))
        }
    }
}

/// Builds a request from a URI and header pairs.
pub fn http_request(uri: &str, headers: &[(&str, &str)]) -> Request {
    http_request_with_body(uri, headers, Bytes::new())
}

pub fn http_request_with_body(uri: &str, headers: &[(&str, &str)], body: Bytes) -> Request {
    let mut builder = http::Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    Request::new(builder.body(body).unwrap())
}
