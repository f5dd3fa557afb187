//! # Citadel Kernel Errors
//!
//! Defines [`Error`], the single failure channel for every public
//! [`Application`](crate::kernel::Application) operation. Validation
//! failures, section load failures, fatal wiring bugs and lifecycle misuse
//! all surface here.
use std::fmt;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::component::ComponentError;
use crate::loader::{Group, ResolveError};
use crate::registry::{BarbarianKind, QualifiedName};

#[derive(Debug, ThisError)]
pub enum Error {
    /// A manifest group is malformed (non-mapping group, non-string identifier).
    #[error("Manifest validation failed for '{group}'{}: {message}", entry.as_ref().map(|e| format!(" entry '{}'", e)).unwrap_or_default())]
    ManifestValidation {
        group: String,
        entry: Option<String>,
        message: String,
    },

    /// A section name outside the fixed set of groups.
    #[error("Unknown section '{section}'")]
    UnknownSection { section: String },

    /// The resolver did not answer for a section before the deadline.
    #[error("Loading group '{group}' timed out after {timeout_ms} ms")]
    LoadTimeout { group: Group, timeout_ms: u64 },

    /// The resolver reported a failure for a section.
    #[error("Loading group '{group}' failed: {source}")]
    LoadFailure {
        group: Group,
        #[source]
        source: ResolveError,
    },

    /// A child spawned during activation derived a name already in use.
    #[error("Child '{name}' spawned by '{parent}' collides with an existing {kind} registration")]
    ChildNameCollision {
        kind: BarbarianKind,
        parent: String,
        name: String,
    },

    /// A component's `activate` failed. Fatal for controllers only.
    #[error("Activation of {group} '{name}' failed: {source}")]
    Activation {
        group: Group,
        name: String,
        #[source]
        source: ComponentError,
    },

    /// The barbarian registry names a component its container no longer holds.
    #[error("Barbarian registry maps token '{token}' to '{qualified}', which is not registered")]
    BarbarianRegistryInconsistency {
        token: String,
        qualified: QualifiedName,
    },

    /// A broadcast handler failed and halted the broadcast.
    #[error("Broadcast of '{method}' failed on {group} '{name}': {source}")]
    Broadcast {
        method: String,
        group: Group,
        name: String,
        #[source]
        source: ComponentError,
    },

    /// The elevated registry refused an operation.
    #[error("Core registry error: {0}")]
    CoreRegistry(String),

    /// An operation was requested in a lifecycle state that forbids it.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    Lifecycle {
        phase: LifecyclePhase,
        message: String,
    },

    #[error("Configuration error for '{}': {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("I/O error during '{operation}' on '{}': {source}", path.display())]
    Io {
        #[source]
        source: std::io::Error,
        operation: String,
        path: PathBuf,
    },
}

/// The public operation during which a lifecycle error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Load,
    Activate,
    Destroy,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecyclePhase::Load => write!(f, "load"),
            LifecyclePhase::Activate => write!(f, "activate"),
            LifecyclePhase::Destroy => write!(f, "destroy"),
        }
    }
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl Error {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Error::Io {
            source,
            operation: operation.into(),
            path: path.into(),
        }
    }

    pub(crate) fn lifecycle(phase: LifecyclePhase, message: impl Into<String>) -> Self {
        Error::Lifecycle {
            phase,
            message: message.into(),
        }
    }

    /// Whether this error came from a single section's resolution.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Error::LoadTimeout { .. } | Error::LoadFailure { .. })
    }
}
