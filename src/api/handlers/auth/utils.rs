//! Small helpers shared by the auth handlers.

use axum::http::HeaderMap;
use regex::Regex;
use std::net::SocketAddr;

/// Resolve the origin address a request is attributed to.
///
/// Proxy headers win over the peer address so bans key on the real client
/// behind a load balancer.
pub(crate) fn client_origin(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = extract_forwarded_ip(headers) {
        return forwarded;
    }
    peer.map_or_else(|| "unknown".to_string(), |addr| addr.ip().to_string())
}

fn extract_forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Opaque user-agent-like string recorded with each ledger entry.
pub(crate) fn client_descriptor(headers: &HeaderMap) -> String {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Basic username sanity check before touching the identity store.
pub(crate) fn valid_username(username: &str) -> bool {
    Regex::new(r"^[\w.@+-]{1,150}$").is_ok_and(|regex| regex.is_match(username))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_header_wins_over_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.2.3.4, 10.0.0.1"),
        );
        let peer: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        assert_eq!(client_origin(&headers, Some(peer)), "1.2.3.4");
    }

    #[test]
    fn peer_address_used_without_proxy_headers() {
        let headers = HeaderMap::new();
        let peer: SocketAddr = "192.168.1.7:40000".parse().unwrap();
        assert_eq!(client_origin(&headers, Some(peer)), "192.168.1.7");
    }

    #[test]
    fn real_ip_header_as_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("5.6.7.8"));
        assert_eq!(client_origin(&headers, None), "5.6.7.8");
    }

    #[test]
    fn descriptor_defaults_to_unknown() {
        assert_eq!(client_descriptor(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn username_validation() {
        assert!(valid_username("alice"));
        assert!(valid_username("alice.b-c@example"));
        assert!(!valid_username(""));
        assert!(!valid_username("white space"));
        assert!(!valid_username(&"a".repeat(151)));
    }
}
