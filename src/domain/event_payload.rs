//! Pageview event model sent to the analytics endpoint.

use serde::Serialize;

use super::request_snapshot::RequestSnapshot;

/// Event name understood by the Plausible events API.
pub const PAGEVIEW: &str = "pageview";

/// JSON body of a `POST /api/event` call.
///
/// Field order matters for readers of the wire format and is kept as
/// `name, url, domain, referrer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventPayload {
    pub name: &'static str,
    pub url: String,
    pub domain: String,
    pub referrer: String,
}

impl EventPayload {
    /// Builds a pageview for `snapshot` on the configured site.
    ///
    /// `url` is the path and query exactly as received; `referrer` is the
    /// inbound `Referer` header or an empty string.
    pub fn pageview(snapshot: &RequestSnapshot, domain: &str) -> Self {
        Self {
            name: PAGEVIEW,
            url: snapshot.path_and_query.clone(),
            domain: domain.to_string(),
            referrer: snapshot.referrer.clone().unwrap_or_default(),
        }
    }

    /// Encodes the payload as compact JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, Uri, header};

    fn snapshot(uri: &str, referer: Option<&'static str>) -> RequestSnapshot {
        let mut headers = HeaderMap::new();
        if let Some(referer) = referer {
            headers.insert(header::REFERER, HeaderValue::from_static(referer));
        }
        RequestSnapshot::new(&uri.parse::<Uri>().unwrap(), &headers, "10.0.0.1:4000")
    }

    #[test]
    fn test_pageview_payload_fields() {
        let payload = EventPayload::pageview(
            &snapshot("/blog/post-1?ref=x", Some("https://google.com")),
            "example.com",
        );

        assert_eq!(payload.name, "pageview");
        assert_eq!(payload.url, "/blog/post-1?ref=x");
        assert_eq!(payload.domain, "example.com");
        assert_eq!(payload.referrer, "https://google.com");
    }

    #[test]
    fn test_missing_referer_is_empty_string() {
        let payload = EventPayload::pageview(&snapshot("/", None), "example.com");
        assert_eq!(payload.referrer, "");
    }

    #[test]
    fn test_compact_json_encoding() {
        let payload = EventPayload::pageview(
            &snapshot("/blog/post-1?ref=x", Some("https://google.com")),
            "example.com",
        );

        let body = String::from_utf8(payload.to_json().unwrap()).unwrap();
        assert_eq!(
            body,
            r#"{"name":"pageview","url":"/blog/post-1?ref=x","domain":"example.com","referrer":"https://google.com"}"#
        );
    }
}
