//! Access-log tracing for the bundled static host.

use axum::http::Request;
use std::sync::Arc;
use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};

/// Request span tagged with the analytics site it is counted under.
#[derive(Debug, Clone)]
pub struct SiteSpan {
    site: Arc<str>,
}

impl SiteSpan {
    pub fn new(site: &str) -> Self {
        Self { site: site.into() }
    }
}

impl<B> MakeSpan<B> for SiteSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            site = %self.site,
            method = %request.method(),
            uri = %request.uri(),
            version = ?request.version(),
        )
    }
}

/// Request span plus one `INFO` line per response with status and latency.
///
/// ```text
/// INFO request{site=example.com method=GET uri=/blog/post-1?ref=x version=HTTP/1.1}: finished processing request latency=2 ms status=200
/// ```
///
/// Installed outside the pageview middleware so relay logs emitted while the
/// request is handled, including those of the detached delivery task, carry
/// the request span.
pub fn layer(site: &str) -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, SiteSpan> {
    TraceLayer::new_for_http()
        .make_span_with(SiteSpan::new(site))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}
