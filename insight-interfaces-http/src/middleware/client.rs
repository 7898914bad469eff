use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Caller address used for rate limiting: first `x-forwarded-for` hop, then `x-real-ip`,
/// then the socket peer.
pub fn client_identifier(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(ip) = forwarded {
        return Some(ip.to_string());
    }
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(ip) = real_ip {
        return Some(ip.to_string());
    }
    peer.map(|addr| addr.ip().to_string())
}
