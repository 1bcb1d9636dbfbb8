//! Relay policy flags.
//!
//! The relay has two historical behaviours: a simplified one that forwards
//! every request as soon as it arrives, and a filtering one that waits for
//! the final status, drops errors and static assets, and derives the client
//! IP itself. Each difference is an independent flag here.

use serde::Deserialize;
use std::{fmt, str::FromStr};

use crate::error::RelayError;

/// How the `X-Forwarded-For` header of the outbound event is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientIpPolicy {
    /// Copy the inbound `X-Forwarded-For` header, omit it when absent.
    #[default]
    Forward,
    /// Use the inbound header when present, otherwise the remote address
    /// without its port.
    Extract,
}

/// When the detached delivery task is started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Start before the downstream pipeline runs. The final status is not
    /// known, so status filtering is unavailable.
    #[default]
    Concurrent,
    /// Start after the downstream pipeline produced its response.
    PostCompletion,
}

/// Filtering and delivery flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RelayPolicy {
    /// Skip responses with status >= 400.
    pub filter_error_status: bool,
    /// Skip paths ending in a known static-asset extension.
    pub filter_static_assets: bool,
    pub client_ip: ClientIpPolicy,
    pub dispatch: DispatchMode,
}

impl RelayPolicy {
    /// Every filter on, client IP derived from the connection, dispatch after
    /// the response is complete.
    pub fn strict() -> Self {
        Self {
            filter_error_status: true,
            filter_static_assets: true,
            client_ip: ClientIpPolicy::Extract,
            dispatch: DispatchMode::PostCompletion,
        }
    }

    /// Rejects flag combinations that cannot be honoured.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.filter_error_status && self.dispatch == DispatchMode::Concurrent {
            return Err(RelayError::config(
                "filter_error_status requires post_completion dispatch",
            ));
        }
        Ok(())
    }
}

impl FromStr for ClientIpPolicy {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(Self::Forward),
            "extract" => Ok(Self::Extract),
            other => Err(RelayError::config(format!(
                "client_ip must be 'forward' or 'extract', got '{other}'"
            ))),
        }
    }
}

impl FromStr for DispatchMode {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concurrent" => Ok(Self::Concurrent),
            "post_completion" | "post-completion" => Ok(Self::PostCompletion),
            other => Err(RelayError::config(format!(
                "dispatch must be 'concurrent' or 'post_completion', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ClientIpPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientIpPolicy::Forward => f.write_str("forward"),
            ClientIpPolicy::Extract => f.write_str("extract"),
        }
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::Concurrent => f.write_str("concurrent"),
            DispatchMode::PostCompletion => f.write_str("post_completion"),
        }
    }
}
