//! Owned copy of the request data the relay needs.

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, Uri, header};
use std::net::SocketAddr;

/// `X-Forwarded-For` is not among the standard header constants.
pub static X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Request data captured before the request is handed downstream.
///
/// The detached delivery task owns this value, so nothing it reads can be
/// mutated or dropped by the rest of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSnapshot {
    /// Path without the query string, used for static-asset matching.
    pub path: String,
    /// Path and query as received, reported as the event `url`.
    pub path_and_query: String,
    pub referrer: Option<String>,
    /// Raw inbound `User-Agent`, forwarded byte for byte.
    pub user_agent: Option<HeaderValue>,
    /// Inbound `X-Forwarded-For`, `None` when absent or empty.
    pub forwarded_for: Option<HeaderValue>,
    /// Transport-level peer address as the host reported it.
    pub remote_addr: String,
}

impl RequestSnapshot {
    pub fn new(uri: &Uri, headers: &HeaderMap, remote_addr: impl Into<String>) -> Self {
        let path = match uri.path() {
            "" => "/".to_string(),
            p => p.to_string(),
        };
        let path_and_query = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .filter(|pq| !pq.is_empty())
            .unwrap_or_else(|| path.clone());

        let referrer = headers
            .get(header::REFERER)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

        let forwarded_for = headers
            .get(&X_FORWARDED_FOR)
            .filter(|v| !v.is_empty())
            .cloned();

        Self {
            path,
            path_and_query,
            referrer,
            user_agent: headers.get(header::USER_AGENT).cloned(),
            forwarded_for,
            remote_addr: remote_addr.into(),
        }
    }

    /// Captures a snapshot of an axum/hyper request.
    ///
    /// The remote address comes from the `ConnectInfo<SocketAddr>` extension
    /// and is empty when the host did not install it.
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let remote_addr = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_default();

        Self::new(req.uri(), req.headers(), remote_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_snapshot_splits_path_and_query() {
        let uri: Uri = "/app.js?v=2".parse().unwrap();
        let snapshot = RequestSnapshot::new(&uri, &HeaderMap::new(), "1.1.1.1:80");

        assert_eq!(snapshot.path, "/app.js");
        assert_eq!(snapshot.path_and_query, "/app.js?v=2");
        assert_eq!(snapshot.remote_addr, "1.1.1.1:80");
    }

    #[test]
    fn test_snapshot_copies_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_static("https://google.com"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("TestAgent/1.0"));
        headers.insert(X_FORWARDED_FOR.clone(), HeaderValue::from_static("1.2.3.4"));

        let snapshot = RequestSnapshot::new(&Uri::from_static("/"), &headers, "");

        assert_eq!(snapshot.referrer.as_deref(), Some("https://google.com"));
        assert_eq!(
            snapshot.user_agent,
            Some(HeaderValue::from_static("TestAgent/1.0"))
        );
        assert_eq!(
            snapshot.forwarded_for,
            Some(HeaderValue::from_static("1.2.3.4"))
        );
    }

    #[test]
    fn test_empty_forwarded_for_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR.clone(), HeaderValue::from_static(""));

        let snapshot = RequestSnapshot::new(&Uri::from_static("/"), &headers, "");
        assert!(snapshot.forwarded_for.is_none());
    }

    #[test]
    fn test_absolute_form_uri_uses_path() {
        let uri: Uri = "http://example.com".parse().unwrap();
        let snapshot = RequestSnapshot::new(&uri, &HeaderMap::new(), "");

        assert_eq!(snapshot.path, "/");
        assert_eq!(snapshot.path_and_query, "/");
    }

    #[test]
    fn test_from_request_reads_connect_info() {
        let mut req = Request::builder()
            .uri("/page?x=1")
            .body(Body::empty())
            .unwrap();
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));

        let snapshot = RequestSnapshot::from_request(&req);
        assert_eq!(snapshot.remote_addr, "127.0.0.1:12345");
        assert_eq!(snapshot.path_and_query, "/page?x=1");
    }

    #[test]
    fn test_from_request_without_connect_info() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(RequestSnapshot::from_request(&req).remote_addr, "");
    }
}
