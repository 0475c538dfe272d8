//! Request wrapper handed to clients and hooks.

use bytes::Bytes;
use http::header;
use tokio_util::sync::CancellationToken;

/// An authentication request.
///
/// The transport request is optional: internal callers may synthesize a
/// request without one, in which case every header, cookie and query lookup
/// returns `None`.
#[derive(Debug, Default)]
pub struct Request {
    http_request: Option<http::Request<Bytes>>,
    /// Peer address as reported by the transport (`ip` or `ip:port`).
    remote_addr: Option<String>,
    /// Org targeted by the request. Resolved by the service before a client runs.
    pub org_id: i64,
    cancellation: CancellationToken,
}

impl Request {
    #[must_use]
    pub fn new(http_request: http::Request<Bytes>) -> Self {
        Self {
            http_request: Some(http_request),
            ..Self::default()
        }
    }

    /// A request with no transport request behind it.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// Ties the request to a caller-owned cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    #[must_use]
    pub fn http_request(&self) -> Option<&http::Request<Bytes>> {
        self.http_request.as_ref()
    }

    #[must_use]
    pub fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// First value of `name` if it is valid visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.http_request
            .as_ref()?
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
    }

    /// Decoded value of the first `name` query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.http_request.as_ref()?.uri().query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Value of the cookie `name`, searched across all `Cookie` headers.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.http_request
            .as_ref()?
            .headers()
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.trim_matches('"'))
    }

    /// Token from an `Authorization: Bearer <token>` header.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.header(header::AUTHORIZATION.as_str())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// `User-Agent` header, empty when absent.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        self.header(header::USER_AGENT.as_str()).unwrap_or_default()
    }

    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.http_request.as_ref().map(http::Request::body)
    }
}
