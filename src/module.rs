//! Module descriptor for host registries.
//!
//! Nothing registers itself. A host that keeps a table of pluggable handlers
//! asks for [`module_info`] and calls its constructor with a configuration
//! produced by its own loader.

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::middleware::PageviewHandler;

/// Registry identifier of the pageview handler.
pub const MODULE_ID: &str = "http.handlers.plausible";

/// Name of the configuration block hosts conventionally map to this module.
pub const DIRECTIVE: &str = "plausible";

/// Ways a host can plug the handler into its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// axum/tower middleware via [`PageviewHandler::apply`].
    TowerMiddleware,
    /// Sink-driven handler via [`PageviewHandler::serve`].
    SinkHandler,
}

/// Static description of the module plus its constructor.
#[derive(Debug, Clone, Copy)]
pub struct ModuleInfo {
    pub id: &'static str,
    pub directive: &'static str,
    pub capabilities: &'static [Capability],
    pub new: fn(RelayConfig) -> Result<PageviewHandler, RelayError>,
}

impl ModuleInfo {
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

pub fn module_info() -> ModuleInfo {
    ModuleInfo {
        id: MODULE_ID,
        directive: DIRECTIVE,
        capabilities: &[Capability::TowerMiddleware, Capability::SinkHandler],
        new: provision,
    }
}

/// Validates `config` and builds a ready-to-use handler.
///
/// # Errors
///
/// Returns [`RelayError::Config`] if the domain name is missing, the base URL
/// is malformed, or the policy flags contradict each other.
pub fn provision(config: RelayConfig) -> Result<PageviewHandler, RelayError> {
    let handler = PageviewHandler::new(config)?;
    tracing::debug!(
        module = MODULE_ID,
        domain = %handler.relay().config().domain_name,
        "Provisioned pageview handler"
    );
    Ok(handler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_info() {
        let info = module_info();
        assert_eq!(info.id, "http.handlers.plausible");
        assert_eq!(info.directive, "plausible");
        assert!(info.supports(Capability::TowerMiddleware));
        assert!(info.supports(Capability::SinkHandler));
    }

    #[test]
    fn test_constructor_provisions_handler() {
        let info = module_info();
        let handler = (info.new)(
            RelayConfig::new("example.com").with_base_url("https://stats.example.com/"),
        )
        .unwrap();

        assert_eq!(handler.relay().config().base_url(), "https://stats.example.com");
    }

    #[test]
    fn test_constructor_rejects_missing_domain() {
        let result = provision(RelayConfig::new(""));
        assert!(matches!(result, Err(RelayError::Config(_))));
    }
}
