use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::kernel::constants::DEFAULT_LOAD_TIMEOUT_MS;
use crate::kernel::error::{Error, Result};

/// File formats accepted for configs and manifests, keyed by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigFormat {
    Json,
    #[cfg(feature = "yaml-config")]
    Yaml,
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// `None` for a missing extension or one whose feature is disabled.
    pub(crate) fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(ConfigFormat::Json),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            #[cfg(feature = "toml-config")]
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }

    fn parse<T: DeserializeOwned>(self, text: &str) -> std::result::Result<T, String> {
        match self {
            ConfigFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Reads `path` and deserializes it using the format implied by its extension.
pub(crate) fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = ConfigFormat::detect(path).ok_or_else(|| Error::Config {
        path: path.to_path_buf(),
        message: "unknown or unsupported file format".to_string(),
    })?;
    let text = fs::read_to_string(path).map_err(|e| Error::io(e, "read", path))?;
    format.parse(&text).map_err(|message| Error::Config {
        path: path.to_path_buf(),
        message,
    })
}

/// How manifest sections are scheduled against the resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStrategy {
    /// Every section is dispatched before any is awaited; completion order is unspecified.
    #[default]
    Concurrent,
    /// Sections are awaited one at a time in group order.
    Priority,
}

impl std::str::FromStr for LoadStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "concurrent" => Ok(LoadStrategy::Concurrent),
            "priority" => Ok(LoadStrategy::Priority),
            other => Err(format!("unknown load strategy '{}'", other)),
        }
    }
}

/// Construction-time settings for an [`Application`](crate::kernel::Application).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Per-section resolution deadline in milliseconds
    pub load_timeout_ms: u64,
    pub load_strategy: LoadStrategy,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            load_timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
            load_strategy: LoadStrategy::default(),
        }
    }
}

impl ApplicationConfig {
    /// Load a config file; the format follows the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        read_file(path.as_ref())
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout_ms = duration_millis(timeout);
        self
    }

    pub fn with_load_strategy(mut self, strategy: LoadStrategy) -> Self {
        self.load_strategy = strategy;
        self
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

/// Per-call options for [`Application::load_modules`](crate::kernel::Application::load_modules).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Overrides the configured section timeout for this call only
    pub timeout_ms: Option<u64>,
}

impl LoadOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout_ms: Some(duration_millis(timeout)),
        }
    }
}

/// Per-call options for [`Application::activate`](crate::kernel::Application::activate).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivateOptions {
    /// Free-form settings every component can read through [`Grant::options`](crate::component::Grant::options)
    pub settings: Value,
}

impl ActivateOptions {
    pub fn with_settings(settings: Value) -> Self {
        Self { settings }
    }
}
