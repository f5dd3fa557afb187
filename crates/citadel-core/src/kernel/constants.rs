/// Application name
pub const APP_NAME: &str = "citadel";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Per-section resolution deadline applied when nothing else is configured
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 30_000;

/// Joins a parent barbarian's name and its child's name or key
pub const CHILD_NAME_SEPARATOR: &str = "-";

/// Log target for manifest loading
pub const LOG_TARGET_LOAD: &str = "citadel::load";

/// Log target for the activation cascade
pub const LOG_TARGET_ACTIVATION: &str = "citadel::activation";

/// Log target for container and registry bookkeeping
pub const LOG_TARGET_REGISTRY: &str = "citadel::registry";

/// Log target for lifecycle transitions
pub const LOG_TARGET_LIFECYCLE: &str = "citadel::lifecycle";
