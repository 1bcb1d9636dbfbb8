//! Pageview relay: filtering, payload construction and detached delivery.

use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{Instrument, debug, error, warn};

use super::client_ip::forwarded_for_header;
use super::filter::{self, SkipReason};
use super::transport::{Delivery, EventTransport, HttpTransport};
use crate::config::RelayConfig;
use crate::domain::event_payload::EventPayload;
use crate::domain::policy::RelayPolicy;
use crate::domain::request_snapshot::RequestSnapshot;
use crate::error::RelayError;

/// Result of one [`EventRelay::record`] call.
///
/// The detached dispatch path discards it; it exists for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Sent,
    Skipped(SkipReason),
    /// Delivery failed; carries [`RelayError::kind`].
    Failed(&'static str),
}

/// Best-effort relay of pageview events.
///
/// Cheap to clone: configuration and transport are shared behind `Arc` and
/// read-only after construction.
#[derive(Clone)]
pub struct EventRelay {
    config: Arc<RelayConfig>,
    transport: Arc<dyn EventTransport>,
}

impl EventRelay {
    /// Validates `config` and builds the HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: RelayConfig) -> Result<Self, RelayError> {
        let config = config.validated()?;
        let endpoint = config
            .event_endpoint()
            .map_err(|e| RelayError::config(e.to_string()))?;
        let transport = HttpTransport::new(endpoint, config.timeout())?;

        Ok(Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        })
    }

    /// Validates `config` and uses a custom transport.
    pub fn with_transport(
        config: RelayConfig,
        transport: Arc<dyn EventTransport>,
    ) -> Result<Self, RelayError> {
        Ok(Self {
            config: Arc::new(config.validated()?),
            transport,
        })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn policy(&self) -> &RelayPolicy {
        &self.config.policy
    }

    /// Encodes the pageview for `snapshot` and builds its outbound headers.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Serialization`] if the payload cannot be encoded
    /// and [`RelayError::DeliveryConstruction`] if the client IP is not a
    /// valid header value.
    pub fn build_delivery(&self, snapshot: &RequestSnapshot) -> Result<Delivery, RelayError> {
        let payload = EventPayload::pageview(snapshot, &self.config.domain_name);
        let body = payload.to_json()?;

        let forwarded_for = forwarded_for_header(self.config.policy.client_ip, snapshot)
            .map_err(|raw| {
                RelayError::construction(format!("invalid X-Forwarded-For value '{raw}'"))
            })?;

        Ok(Delivery {
            body,
            user_agent: snapshot.user_agent.clone(),
            forwarded_for,
        })
    }

    /// Filters, builds and delivers one pageview.
    ///
    /// Never fails: every error is logged and reported as
    /// [`RecordOutcome::Failed`]. There is no retry.
    pub async fn record(
        &self,
        snapshot: RequestSnapshot,
        status: Option<StatusCode>,
    ) -> RecordOutcome {
        if let Some(reason) = filter::check(&self.config.policy, &snapshot.path, status) {
            debug!(path = %snapshot.path, ?reason, "Skipping pageview");
            return RecordOutcome::Skipped(reason);
        }

        let delivery = match self.build_delivery(&snapshot) {
            Ok(delivery) => delivery,
            Err(e) => {
                error!(error = %e, error_kind = e.kind(), "Failed to build plausible event");
                return RecordOutcome::Failed(e.kind());
            }
        };

        debug!(
            domain = %self.config.domain_name,
            url = %snapshot.path_and_query,
            "Sending plausible event"
        );

        match self.transport.send(delivery).await {
            Ok(()) => RecordOutcome::Sent,
            Err(e @ RelayError::UnexpectedStatus(_)) => {
                warn!(
                    error = %e,
                    url = %snapshot.path_and_query,
                    "Plausible rejected event"
                );
                RecordOutcome::Failed(e.kind())
            }
            Err(e) => {
                error!(
                    error = %e,
                    error_kind = e.kind(),
                    url = %snapshot.path_and_query,
                    "Failed to post plausible event"
                );
                RecordOutcome::Failed(e.kind())
            }
        }
    }

    /// Records the pageview on a detached task.
    ///
    /// The task is not tied to the inbound request: it keeps running if the
    /// client disconnects and is bounded only by the transport timeout. It
    /// inherits the current span for log correlation only.
    /// Without a tokio runtime the event is dropped with a warning.
    pub fn dispatch(&self, snapshot: RequestSnapshot, status: Option<StatusCode>) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(url = %snapshot.path_and_query, "No async runtime, dropping pageview");
                return;
            }
        };

        let relay = self.clone();
        handle.spawn(
            async move {
                relay.record(snapshot, status).await;
            }
            .in_current_span(),
        );
    }
}
