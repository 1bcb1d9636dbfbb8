//! Relay configuration.
//!
//! Configuration is produced once, validated, and then shared read-only by
//! every request. It can be built in code, deserialized from JSON by a host
//! configuration loader, or read from environment variables.
//!
//! ## Environment Variables
//!
//! ```bash
//! export PLAUSIBLE_DOMAIN_NAME="example.com"          # required
//! export PLAUSIBLE_BASE_URL="https://plausible.io"    # optional
//! export PLAUSIBLE_FILTER_ERROR_STATUS="true"         # optional, default false
//! export PLAUSIBLE_FILTER_STATIC_ASSETS="true"        # optional, default false
//! export PLAUSIBLE_CLIENT_IP="extract"                # forward | extract
//! export PLAUSIBLE_DISPATCH="post_completion"         # concurrent | post_completion
//! export PLAUSIBLE_TIMEOUT_SECS="5"                   # 1..=60
//! ```
//!
//! ## JSON
//!
//! ```json
//! { "domain_name": "example.com", "base_url": "https://plausible.io/",
//!   "filter_static_assets": true, "client_ip": "extract" }
//! ```

use serde::Deserialize;
use std::{env, time::Duration};
use url::Url;

use crate::domain::policy::{ClientIpPolicy, DispatchMode, RelayPolicy};
use crate::error::RelayError;

/// Analytics origin used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://plausible.io";

/// Path of the events API relative to the base URL.
pub const EVENT_PATH: &str = "/api/event";

/// Outbound delivery timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

const MAX_TIMEOUT_SECS: u64 = 60;

/// Relay configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayConfig {
    /// Site identifier reported as the event `domain`.
    pub domain_name: String,
    /// Analytics origin; [`DEFAULT_BASE_URL`] when unset or empty.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(flatten)]
    pub policy: RelayPolicy,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl RelayConfig {
    pub fn new(domain_name: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
            base_url: None,
            policy: RelayPolicy::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_policy(mut self, policy: RelayPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Loads configuration from `PLAUSIBLE_*` environment variables.
    ///
    /// The result is not validated; call [`RelayConfig::validated`].
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if `PLAUSIBLE_DOMAIN_NAME` is missing or
    /// a policy variable has an unknown value.
    pub fn from_env() -> Result<Self, RelayError> {
        let domain_name = env::var("PLAUSIBLE_DOMAIN_NAME")
            .map_err(|_| RelayError::config("PLAUSIBLE_DOMAIN_NAME must be set"))?;

        let base_url = env::var("PLAUSIBLE_BASE_URL").ok();

        let filter_error_status = env_flag("PLAUSIBLE_FILTER_ERROR_STATUS");
        let filter_static_assets = env_flag("PLAUSIBLE_FILTER_STATIC_ASSETS");

        let client_ip = match env::var("PLAUSIBLE_CLIENT_IP") {
            Ok(v) => v.parse()?,
            Err(_) => ClientIpPolicy::default(),
        };

        let dispatch = match env::var("PLAUSIBLE_DISPATCH") {
            Ok(v) => v.parse()?,
            Err(_) => DispatchMode::default(),
        };

        let timeout_secs = match env::var("PLAUSIBLE_TIMEOUT_SECS") {
            Ok(v) => v.trim().parse().map_err(|_| {
                RelayError::config(format!("PLAUSIBLE_TIMEOUT_SECS must be a number, got '{v}'"))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            domain_name,
            base_url,
            policy: RelayPolicy {
                filter_error_status,
                filter_static_assets,
                client_ip,
                dispatch,
            },
            timeout_secs,
        })
    }

    /// Validates the configuration and returns its normalized form.
    ///
    /// Normalization trims the domain name, applies [`DEFAULT_BASE_URL`] when
    /// no base URL is set, and strips trailing slashes from the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if:
    /// - `domain_name` is empty
    /// - `base_url` is not an absolute `http`/`https` URL with a host
    /// - the policy combines status filtering with concurrent dispatch
    /// - `timeout_secs` is outside `1..=60`
    pub fn validated(mut self) -> Result<Self, RelayError> {
        let domain_name = self.domain_name.trim();
        if domain_name.is_empty() {
            return Err(RelayError::config("domain_name is required"));
        }
        self.domain_name = domain_name.to_string();

        let base_url = match self.base_url.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_BASE_URL.to_string(),
            Some(raw) => {
                validate_base_url(raw)?;
                raw.trim_end_matches('/').to_string()
            }
        };
        self.base_url = Some(base_url);

        self.policy.validate()?;

        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(RelayError::config(format!(
                "timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}, got {}",
                self.timeout_secs
            )));
        }

        Ok(self)
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        match self.base_url.as_deref() {
            Some(url) if !url.is_empty() => url.trim_end_matches('/'),
            _ => DEFAULT_BASE_URL,
        }
    }

    /// Full URL of the events API, `{base_url}/api/event`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::DeliveryConstruction`] if the joined URL does not
    /// parse.
    pub fn event_endpoint(&self) -> Result<Url, RelayError> {
        let endpoint = format!("{}{}", self.base_url(), EVENT_PATH);
        Url::parse(&endpoint)
            .map_err(|e| RelayError::construction(format!("invalid endpoint '{endpoint}': {e}")))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Logs a configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Plausible relay configuration:");
        tracing::info!("  Domain: {}", self.domain_name);
        tracing::info!("  Endpoint: {}{}", self.base_url(), EVENT_PATH);
        tracing::info!("  Filter error status: {}", self.policy.filter_error_status);
        tracing::info!("  Filter static assets: {}", self.policy.filter_static_assets);
        tracing::info!("  Client IP: {}", self.policy.client_ip);
        tracing::info!("  Dispatch: {}", self.policy.dispatch);
        tracing::info!("  Timeout: {}s", self.timeout_secs);
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

fn validate_base_url(raw: &str) -> Result<(), RelayError> {
    let invalid = || RelayError::config(format!("'{raw}' is not a valid url"));

    let url = Url::parse(raw).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Note
///
/// Expects `.env` to be already loaded (e.g. via `dotenvy::dotenv()`).
pub fn load_from_env() -> Result<RelayConfig, RelayError> {
    RelayConfig::from_env()?.validated()
}
