//! Error types for provisioning and event delivery.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised by the relay.
///
/// Only [`RelayError::Config`] ever reaches a caller: it is returned while
/// provisioning and keeps the middleware from becoming active. Every other
/// variant is produced inside the detached delivery task, logged and dropped.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to encode event payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to construct delivery request: {0}")]
    DeliveryConstruction(String),

    #[error("failed to deliver event: {0}")]
    DeliveryTransport(String),

    #[error("analytics endpoint answered {0}")]
    UnexpectedStatus(StatusCode),
}

impl RelayError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn construction(message: impl Into<String>) -> Self {
        Self::DeliveryConstruction(message.into())
    }

    /// Short label used as the `error_kind` field in delivery logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Config(_) => "config",
            RelayError::Serialization(_) => "serialization",
            RelayError::DeliveryConstruction(_) => "construction",
            RelayError::DeliveryTransport(_) => "transport",
            RelayError::UnexpectedStatus(_) => "status",
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            RelayError::DeliveryConstruction(e.to_string())
        } else if e.is_timeout() {
            RelayError::DeliveryTransport(format!("timed out: {e}"))
        } else {
            RelayError::DeliveryTransport(e.to_string())
        }
    }
}
