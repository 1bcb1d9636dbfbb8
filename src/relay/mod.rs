//! Best-effort relay of pageview events to the analytics endpoint.
//!
//! - [`filter`] - error-status and static-asset exclusion rules
//! - [`client_ip`] - `X-Forwarded-For` selection
//! - [`transport`] - outbound HTTP delivery
//! - [`event_relay`] - orchestration and detached dispatch

pub mod client_ip;
pub mod event_relay;
pub mod filter;
pub mod transport;

pub use event_relay::{EventRelay, RecordOutcome};
pub use filter::SkipReason;
pub use transport::{Delivery, EventTransport, HttpTransport};
