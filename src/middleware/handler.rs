//! Host-facing pageview handler.

use axum::{Router, http::StatusCode, middleware as axum_middleware};

use super::pageview;
use crate::config::RelayConfig;
use crate::domain::policy::DispatchMode;
use crate::domain::request_snapshot::RequestSnapshot;
use crate::error::RelayError;
use crate::observer::{ResponseObserver, ResponseSink};
use crate::relay::EventRelay;

/// Provisioned pageview handler.
///
/// Holds the validated configuration and the shared delivery client. Hosts
/// either wrap an axum router with [`PageviewHandler::apply`] or drive
/// requests themselves through [`PageviewHandler::serve`].
#[derive(Clone)]
pub struct PageviewHandler {
    relay: EventRelay,
}

impl PageviewHandler {
    /// Validates `config` and builds the delivery client.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if the configuration is invalid.
    pub fn new(config: RelayConfig) -> Result<Self, RelayError> {
        Ok(Self::from_relay(EventRelay::new(config)?))
    }

    pub fn from_relay(relay: EventRelay) -> Self {
        Self { relay }
    }

    pub fn relay(&self) -> &EventRelay {
        &self.relay
    }

    /// Installs the pageview middleware on every route of `router`.
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(axum_middleware::from_fn_with_state(
            self.relay.clone(),
            pageview::layer,
        ))
    }

    /// Runs `next` against an observed `sink` and relays the pageview.
    ///
    /// `next` is the rest of the pipeline; it writes its response through the
    /// [`ResponseObserver`], which forwards everything to `sink`. If `next`
    /// fails, its error is returned and nothing is recorded in post-completion
    /// mode. A response with nothing written counts as `200 OK`.
    ///
    /// Returns the status observed on the sink.
    pub fn serve<S, F, E>(
        &self,
        snapshot: RequestSnapshot,
        sink: &mut S,
        next: F,
    ) -> Result<Option<StatusCode>, E>
    where
        S: ResponseSink + ?Sized,
        F: FnOnce(&mut ResponseObserver<&mut S>) -> Result<(), E>,
    {
        let mut observer = ResponseObserver::new(sink);

        match self.relay.policy().dispatch {
            DispatchMode::Concurrent => {
                self.relay.dispatch(snapshot, None);
                next(&mut observer)?;
            }
            DispatchMode::PostCompletion => {
                next(&mut observer)?;
                let status = observer.status().unwrap_or(StatusCode::OK);
                self.relay.dispatch(snapshot, Some(status));
            }
        }

        Ok(observer.status())
    }
}
