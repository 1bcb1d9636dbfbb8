//! Client IP selection for the outbound `X-Forwarded-For` header.

use axum::http::HeaderValue;

use crate::domain::policy::ClientIpPolicy;
use crate::domain::request_snapshot::RequestSnapshot;

/// Strips the port from a transport-level remote address.
///
/// Accepts `host:port` and `[host]:port`. The port is not validated, so
/// `host:` and `host:http` both yield `host`. Addresses that cannot be split
/// (no port, a bare IPv6 address, stray brackets) are returned unchanged.
pub fn host_from_remote_addr(remote_addr: &str) -> &str {
    split_host(remote_addr).unwrap_or(remote_addr)
}

fn split_host(hostport: &str) -> Option<&str> {
    let colon = hostport.rfind(':')?;

    // j and k bound the regions that must not contain stray brackets.
    let (host, j, k) = if hostport.starts_with('[') {
        let end = hostport.find(']')?;
        if end + 1 != colon {
            return None;
        }
        (&hostport[1..end], 1, end + 1)
    } else {
        let host = &hostport[..colon];
        if host.contains(':') {
            return None;
        }
        (host, 0, 0)
    };

    if hostport[j..].contains('[') || hostport[k..].contains(']') {
        return None;
    }
    Some(host)
}

/// Builds the outbound `X-Forwarded-For` header value for `policy`.
///
/// `Forward` copies the inbound header. `Extract` prefers the inbound header
/// and falls back to the remote address without its port. `Ok(None)` means
/// the header is omitted.
///
/// # Errors
///
/// Returns the raw address if it cannot be used as a header value.
pub fn forwarded_for_header(
    policy: ClientIpPolicy,
    snapshot: &RequestSnapshot,
) -> Result<Option<HeaderValue>, String> {
    if let Some(forwarded) = &snapshot.forwarded_for {
        return Ok(Some(forwarded.clone()));
    }

    match policy {
        ClientIpPolicy::Forward => Ok(None),
        ClientIpPolicy::Extract => {
            let host = host_from_remote_addr(&snapshot.remote_addr);
            if host.is_empty() {
                return Ok(None);
            }
            HeaderValue::from_str(host)
                .map(Some)
                .map_err(|_| host.to_string())
        }
    }
}
