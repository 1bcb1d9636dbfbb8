//! Core relay types.
//!
//! - [`event_payload::EventPayload`] - the JSON body posted per pageview
//! - [`request_snapshot::RequestSnapshot`] - owned request data handed to the
//!   detached delivery task
//! - [`policy::RelayPolicy`] - filtering, client-IP and dispatch flags

pub mod event_payload;
pub mod policy;
pub mod request_snapshot;

pub use event_payload::EventPayload;
pub use policy::{ClientIpPolicy, DispatchMode, RelayPolicy};
pub use request_snapshot::RequestSnapshot;
