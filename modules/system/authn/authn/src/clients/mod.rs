//! Built-in authentication clients.
//!
//! | client | priority | matches |
//! |---|---|---|
//! | [`RenderClient`] | 10 | `renderKey` cookie |
//! | [`JwtClient`] | 20 | configured JWT header |
//! | [`ApiKeyClient`] | 30 | bearer token, or basic auth as `api_key` |
//! | [`BasicClient`] | 40 | basic auth |
//! | [`ProxyClient`] | 50 | configured proxy header |
//! | [`SessionClient`] | 60 | session cookie |
//! | [`AnonymousClient`] | 100 | every request |
//!
//! [`FormClient`] and [`OAuthClient`] are only reachable through login and
//! redirect by name.

use authn_sdk::{AuthNError, Request};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::header;

pub mod anonymous;
pub mod api_key;
pub mod basic;
pub mod form;
pub mod jwt;
pub mod oauth;
pub mod password;
pub mod proxy;
pub mod render;
pub mod session;

pub use anonymous::AnonymousClient;
pub use api_key::ApiKeyClient;
pub use basic::BasicClient;
pub use form::FormClient;
pub use jwt::JwtClient;
pub use oauth::OAuthClient;
pub use password::PasswordClient;
pub use proxy::ProxyClient;
pub use render::RenderClient;
pub use session::SessionClient;

pub const CLIENT_RENDER: &str = "auth.client.render";
pub const CLIENT_JWT: &str = "auth.client.jwt";
pub const CLIENT_API_KEY: &str = "auth.client.api-key";
pub const CLIENT_BASIC: &str = "auth.client.basic";
pub const CLIENT_PROXY: &str = "auth.client.proxy";
pub const CLIENT_SESSION: &str = "auth.client.session";
pub const CLIENT_ANONYMOUS: &str = "auth.client.anonymous";
pub const CLIENT_FORM: &str = "auth.client.form";

pub(crate) const PRIORITY_RENDER: i16 = 10;
pub(crate) const PRIORITY_JWT: i16 = 20;
pub(crate) const PRIORITY_API_KEY: i16 = 30;
pub(crate) const PRIORITY_BASIC: i16 = 40;
pub(crate) const PRIORITY_PROXY: i16 = 50;
pub(crate) const PRIORITY_SESSION: i16 = 60;
pub(crate) const PRIORITY_ANONYMOUS: i16 = 100;

/// Name of the OAuth client for `provider`, e.g. `auth.client.github`.
#[must_use]
pub fn oauth_client_name(provider: &str) -> String {
    format!("auth.client.{provider}")
}

/// Username that marks basic credentials as an API key.
pub(crate) const API_KEY_BASIC_USER: &str = "api_key";

fn basic_auth_payload(r: &Request) -> Option<&str> {
    r.header(header::AUTHORIZATION.as_str())?
        .strip_prefix("Basic ")
        .map(str::trim)
}

/// Username of a basic auth header, without checking the password.
pub(crate) fn basic_auth_username(r: &Request) -> Option<String> {
    let payload = basic_auth_payload(r)?;
    decode_basic_auth(payload).ok().map(|(user, _)| user)
}

/// Credentials of a `Basic` authorization header.
///
/// `Ok(None)` when the request has no basic auth header.
pub(crate) fn basic_auth_credentials(
    r: &Request,
) -> Result<Option<(String, String)>, AuthNError> {
    basic_auth_payload(r).map(decode_basic_auth).transpose()
}

fn decode_basic_auth(payload: &str) -> Result<(String, String), AuthNError> {
    let invalid = || AuthNError::bad_request("invalid basic auth header");
    let decoded = STANDARD.decode(payload).map_err(|_| invalid())?;
    let decoded = String::from_utf8(decoded).map_err(|_| invalid())?;
    let (user, password) = decoded.split_once(':').ok_or_else(invalid)?;
    Ok((user.to_owned(), password.to_owned()))
}

#[cfg(test)]
pub(crate) fn basic_header(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}
