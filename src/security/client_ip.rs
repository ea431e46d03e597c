//! Client address resolution for rate-limit bucketing.

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::ConnectInfo,
    http::{HeaderMap, Request},
};

/// Key used when no usable client address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Peer address recorded by `into_make_service_with_connect_info`, if any.
pub fn peer_addr<B>(request: &Request<B>) -> Option<SocketAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
}

/// Resolve the key a request is bucketed under.
///
/// The first `X-Forwarded-For` hop wins when trusted and well-formed, then the
/// socket peer, then [`UNKNOWN_CLIENT`].
pub fn resolve_client_ip(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_forwarded_for: bool,
) -> String {
    if trust_forwarded_for {
        if let Some(ip) = forwarded_for(headers) {
            return ip.to_string();
        }
    }

    match peer {
        Some(addr) => addr.ip().to_canonical().to_string(),
        None => UNKNOWN_CLIENT.to_string(),
    }
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    let value = headers.get(X_FORWARDED_FOR)?.to_str().ok()?;
    parse_hop(value.split(',').next()?.trim())
}

/// A forwarded hop may carry a port (`203.0.113.7:443`, `[2001:db8::1]:443`)
/// or bare brackets. IPv4-mapped IPv6 addresses fold into their IPv4 form.
fn parse_hop(hop: &str) -> Option<IpAddr> {
    let ip = hop
        .parse::<IpAddr>()
        .ok()
        .or_else(|| hop.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
        .or_else(|| hop.strip_prefix('[')?.strip_suffix(']')?.parse().ok())?;
    Some(ip.to_canonical())
}
