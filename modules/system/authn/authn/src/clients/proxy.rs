use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use authn_sdk::{AuthNClient, AuthNError, ContextAwareClient, CredentialBackend, Identity, Request};

use super::{CLIENT_PROXY, PRIORITY_PROXY};
use crate::config::AuthProxyConfig;
use crate::domain::network::ip_from_address;

#[derive(Debug, thiserror::Error)]
pub enum ProxyConfigError {
    #[error("invalid auth proxy whitelist entry '{0}'")]
    InvalidWhitelist(String),

    #[error("auth proxy requires at least one backend")]
    NoBackends,
}

/// An IP network in CIDR notation; a bare address is a full-length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IpNet {
    addr: IpAddr,
    prefix: u8,
}

impl IpNet {
    fn parse(entry: &str) -> Option<Self> {
        let (addr, prefix) = match entry.split_once('/') {
            Some((addr, prefix)) => (addr.parse::<IpAddr>().ok()?, Some(prefix.parse::<u8>().ok()?)),
            None => (entry.parse::<IpAddr>().ok()?, None),
        };
        let max = if addr.is_ipv4() { 32 } else { 128 };
        let prefix = prefix.unwrap_or(max);
        (prefix <= max).then_some(Self { addr, prefix })
    }

    fn contains(&self, ip: IpAddr) -> bool {
        match (self.addr, ip.to_canonical()) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                masked(u128::from(u32::from(net)) << 96, self.prefix)
                    == masked(u128::from(u32::from(ip)) << 96, self.prefix)
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                masked(u128::from(net), self.prefix) == masked(u128::from(ip), self.prefix)
            }
            _ => false,
        }
    }
}

fn masked(bits: u128, prefix: u8) -> u128 {
    match prefix {
        0 => 0,
        p => bits & (u128::MAX << (128 - u32::from(p))),
    }
}

/// Trusts a username asserted by an authenticating reverse proxy.
///
/// When a whitelist is configured, only the transport peer address is
/// checked; forwarding headers are ignored.
pub struct ProxyClient {
    header_name: String,
    headers: HashMap<String, String>,
    whitelist: Vec<IpNet>,
    backends: Vec<Arc<dyn CredentialBackend>>,
}

impl ProxyClient {
    /// # Errors
    ///
    /// Returns [`ProxyConfigError`] for an unparsable whitelist or an empty
    /// backend list.
    pub fn new(
        cfg: &AuthProxyConfig,
        backends: Vec<Arc<dyn CredentialBackend>>,
    ) -> Result<Self, ProxyConfigError> {
        if backends.is_empty() {
            return Err(ProxyConfigError::NoBackends);
        }
        let whitelist = cfg
            .whitelist
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                IpNet::parse(entry).ok_or_else(|| ProxyConfigError::InvalidWhitelist(entry.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            header_name: cfg.header_name.clone(),
            headers: cfg.headers.clone(),
            whitelist,
            backends,
        })
    }

    fn is_allowed(&self, r: &Request) -> bool {
        if self.whitelist.is_empty() {
            return true;
        }
        let Some(ip) = r.remote_addr().and_then(|addr| ip_from_address(addr).ok()) else {
            return false;
        };
        self.whitelist.iter().any(|net| net.contains(ip))
    }

    fn username<'a>(&self, r: &'a Request) -> Option<&'a str> {
        r.header(&self.header_name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

#[async_trait]
impl AuthNClient for ProxyClient {
    fn name(&self) -> &str {
        CLIENT_PROXY
    }

    async fn authenticate(&self, r: &Request) -> Result<Identity, AuthNError> {
        if !self.is_allowed(r) {
            return Err(AuthNError::unauthenticated(
                "request is not from the authentication proxy",
            ));
        }
        let username = self
            .username(r)
            .ok_or_else(|| AuthNError::unauthenticated("missing proxy header"))?;

        let additional: HashMap<String, String> = self
            .headers
            .iter()
            .filter_map(|(field, header)| {
                r.header(header)
                    .map(|value| (field.clone(), value.trim().to_owned()))
            })
            .collect();

        let mut failures = Vec::new();
        for backend in &self.backends {
            match backend.authenticate_proxy(r, username, &additional).await {
                Ok(identity) => return Ok(identity),
                Err(e) => {
                    tracing::debug!(backend = backend.name(), error = %e, "Proxy backend could not resolve user");
                    failures.push(e);
                }
            }
        }
        Err(AuthNError::from_failures(failures))
    }

    fn as_context_aware(&self) -> Option<&dyn ContextAwareClient> {
        Some(self)
    }
}

impl ContextAwareClient for ProxyClient {
    fn test(&self, r: &Request) -> bool {
        self.username(r).is_some()
    }

    fn priority(&self) -> i16 {
        PRIORITY_PROXY
    }
}
