use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

fn slot() -> &'static ArcSwap<StaticConfig> {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()))
}

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks. Defaults are returned until `init_config`
/// installs the loaded values.
pub fn get_config() -> Arc<StaticConfig> {
    slot().load_full()
}

/// Install the process-wide configuration
///
/// # Examples
/// ```
/// use tinylink::config::{StaticConfig, get_config, init_config};
/// init_config(StaticConfig::default());
/// assert_eq!(get_config().database.op_timeout_ms, 500);
/// ```
pub fn init_config(config: StaticConfig) {
    slot().store(Arc::new(config));
}
