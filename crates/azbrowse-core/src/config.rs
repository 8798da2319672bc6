use std::time::Duration;

/// Runtime knobs for the engine.
///
/// Built by `azbrowse-config` from the user's config file; the defaults
/// match what the binary uses with no config at all.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Shared deadline for collecting every fired expander's result.
    pub expand_timeout: Duration,
    /// Per-subscriber channel capacity on the event bus.
    pub bus_capacity: usize,
    /// `api-version` used when fetching an individual resource.
    pub resource_api_version: String,
}

pub const DEFAULT_EXPAND_TIMEOUT: Duration = Duration::from_secs(45);
pub const DEFAULT_RESOURCE_API_VERSION: &str = "2017-05-10";

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            expand_timeout: DEFAULT_EXPAND_TIMEOUT,
            bus_capacity: 1,
            resource_api_version: DEFAULT_RESOURCE_API_VERSION.to_owned(),
        }
    }
}
