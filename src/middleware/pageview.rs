//! Pageview middleware for axum/tower hosts.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::domain::policy::DispatchMode;
use crate::domain::request_snapshot::RequestSnapshot;
use crate::relay::EventRelay;

/// Relays a pageview for every request passing through.
///
/// # Request Flow
///
/// 1. Snapshot path, query, `Referer`, `User-Agent`, `X-Forwarded-For` and
///    the peer address (`ConnectInfo<SocketAddr>`, if installed)
/// 2. Run the rest of the pipeline
/// 3. Hand the snapshot and final status to a detached delivery task
/// 4. Return the response untouched
///
/// With [`DispatchMode::Concurrent`] the delivery task is started before
/// step 2 and gets no status.
///
/// The status is read from the response head produced by the inner service,
/// which is exactly what hyper writes to the client.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::get, middleware};
/// use plausible_relay::middleware::pageview;
///
/// let app = Router::new()
///     .route("/", get(index))
///     .layer(middleware::from_fn_with_state(relay.clone(), pageview::layer));
/// ```
pub async fn layer(State(relay): State<EventRelay>, req: Request, next: Next) -> Response {
    let snapshot = RequestSnapshot::from_request(&req);

    match relay.policy().dispatch {
        DispatchMode::Concurrent => {
            relay.dispatch(snapshot, None);
            next.run(req).await
        }
        DispatchMode::PostCompletion => {
            let response = next.run(req).await;
            relay.dispatch(snapshot, Some(response.status()));
            response
        }
    }
}
