//! Client address helpers.

use std::net::{IpAddr, SocketAddr};

use authn_sdk::Request;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid IP address '{0}'")]
pub struct InvalidAddressError(pub String);

/// Parses `ip`, `ip:port`, `[v6]` or `[v6]:port`.
///
/// # Errors
///
/// Returns [`InvalidAddressError`] if no IP address can be extracted.
pub fn ip_from_address(addr: &str) -> Result<IpAddr, InvalidAddressError> {
    let addr = addr.trim();
    if let Ok(ip) = addr.parse::<IpAddr>() {
        return Ok(ip);
    }
    if let Ok(socket) = addr.parse::<SocketAddr>() {
        return Ok(socket.ip());
    }
    addr.strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .and_then(|s| s.parse::<IpAddr>().ok())
        .ok_or_else(|| InvalidAddressError(addr.to_owned()))
}

/// Address of the end client: `X-Real-Ip`, then the first `X-Forwarded-For`
/// entry, then the transport peer address.
#[must_use]
pub fn remote_addr(r: &Request) -> Option<&str> {
    if let Some(ip) = r.header("X-Real-Ip").map(str::trim).filter(|s| !s.is_empty()) {
        return Some(ip);
    }
    if let Some(first) = r
        .header("X-Forwarded-For")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return Some(first);
    }
    r.remote_addr()
}
