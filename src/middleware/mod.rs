//! Pageview middleware and host adapters.
//!
//! - [`pageview::layer`] - axum `from_fn` middleware for tower-based hosts
//! - [`handler::PageviewHandler`] - provisioned handler for imperative hosts
//! - [`tracing::layer`] - access-log tracing used by the bundled server

pub mod handler;
pub mod pageview;
pub mod tracing;

pub use handler::PageviewHandler;
