//! # Plausible Relay
//!
//! HTTP middleware that reports pageviews to a [Plausible](https://plausible.io)
//! compatible events API without touching the response served to the client.
//!
//! ## Architecture
//!
//! - **Observer** ([`observer`]) - status-capturing wrapper around a response sink
//! - **Relay** ([`relay`]) - filtering, payload construction and detached delivery
//! - **Middleware** ([`middleware`]) - axum layer and sink-driven handler
//! - **Module** ([`module`]) - descriptor and constructor for host registries
//! - **Server** ([`server`]) - bundled static-file host
//!
//! ## Request Flow
//!
//! 1. The request is snapshotted (path, query, `Referer`, `User-Agent`,
//!    `X-Forwarded-For`, peer address)
//! 2. The rest of the pipeline produces the response
//! 3. A detached task filters the request, builds a `pageview` event and
//!    posts it to `{base_url}/api/event`
//! 4. Delivery failures are logged and dropped
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use plausible_relay::prelude::*;
//!
//! let handler = module::provision(
//!     RelayConfig::new("example.com").with_policy(RelayPolicy::strict()),
//! )?;
//! let app = handler.apply(Router::new().route("/", get(index)));
//! ```
//!
//! ## Configuration
//!
//! See [`config`] for environment variables and JSON keys.

pub mod config;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod module;
pub mod observer;
pub mod relay;
pub mod server;

pub use error::RelayError;

/// Commonly used types for external consumers.
pub mod prelude {
    pub use crate::config::RelayConfig;
    pub use crate::domain::{ClientIpPolicy, DispatchMode, EventPayload, RelayPolicy, RequestSnapshot};
    pub use crate::error::RelayError;
    pub use crate::middleware::PageviewHandler;
    pub use crate::module;
    pub use crate::observer::{ResponseBuffer, ResponseObserver, ResponseSink};
    pub use crate::relay::{EventRelay, RecordOutcome};
}
