//! # Citadel Components
//!
//! Everything the kernel registers is an [`Instance`]: a shared handle to a
//! [`Component`] whose optional `activate` capability is decided once, when
//! the instance is built, instead of being probed at every call site.
//!
//! - [`Component`] is the base capability (plus an optional broadcast hook).
//! - [`Activatable`] adds `activate`, which receives a [`Grant`] matching the
//!   trust tier of the container the instance lives in.
//! - [`Container`] is the per-group name → instance registry.
pub mod container;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::kernel::Application;
use crate::registry::{BarbarianKind, ElevatedRegistry, HardenedRegistry};

pub use container::Container;

/// Failure reported by a component from `activate` or a broadcast hook.
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("{0}")]
    Failed(String),
    #[error("missing dependency '{0}'")]
    MissingDependency(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ComponentError {
    pub fn failed(message: impl Into<String>) -> Self {
        ComponentError::Failed(message.into())
    }
}

/// Base trait for every registered component.
pub trait Component: Any + Send + Sync {
    /// Broadcast hook used by `trigger_method_on_all`.
    ///
    /// Returns `None` when the component does not expose `method`.
    fn trigger(&self, _method: &str, _options: &Value) -> Option<Result<(), ComponentError>> {
        None
    }
}

/// What a component receives when it is activated.
///
/// Every variant carries the settings passed to
/// [`Application::activate`](crate::kernel::Application::activate).
pub enum Grant<'a> {
    /// Controllers are trusted with the elevated registry and the application.
    Controller {
        registry: &'a Arc<dyn ElevatedRegistry>,
        application: &'a Application,
        options: &'a Value,
    },
    /// Modules are trusted with the elevated registry.
    Module {
        registry: &'a Arc<dyn ElevatedRegistry>,
        options: &'a Value,
    },
    /// Plugins and widgets only ever see a fresh hardened view.
    Barbarian {
        registry: Arc<dyn HardenedRegistry>,
        options: &'a Value,
    },
}

impl Grant<'_> {
    pub fn elevated(&self) -> Option<&Arc<dyn ElevatedRegistry>> {
        match self {
            Grant::Controller { registry, .. } | Grant::Module { registry, .. } => Some(*registry),
            Grant::Barbarian { .. } => None,
        }
    }

    pub fn hardened(&self) -> Option<&Arc<dyn HardenedRegistry>> {
        match self {
            Grant::Barbarian { registry, .. } => Some(registry),
            _ => None,
        }
    }

    pub fn application(&self) -> Option<&Application> {
        match self {
            Grant::Controller { application, .. } => Some(*application),
            _ => None,
        }
    }

    pub fn options(&self) -> &Value {
        match self {
            Grant::Controller { options, .. } | Grant::Module { options, .. } | Grant::Barbarian { options, .. } => options,
        }
    }
}

/// Optional `activate` capability.
pub trait Activatable: Component {
    /// Activate the component.
    ///
    /// Plugins and widgets may return children; every other tier's children
    /// are ignored.
    fn activate(&self, grant: Grant<'_>) -> Result<Vec<SpawnedChild>, ComponentError>;
}

#[derive(Clone)]
enum Capability {
    Activatable(Arc<dyn Activatable>),
    Passive,
}

/// A registered component handle.
#[derive(Clone)]
pub struct Instance {
    component: Arc<dyn Component>,
    any: Arc<dyn Any + Send + Sync>,
    capability: Capability,
    type_name: &'static str,
}

impl Instance {
    /// Wraps a component exposing `activate`.
    pub fn active<T: Activatable>(component: T) -> Self {
        Self::from_active_arc(Arc::new(component))
    }

    pub fn from_active_arc<T: Activatable>(component: Arc<T>) -> Self {
        Self {
            component: component.clone(),
            any: component.clone(),
            capability: Capability::Activatable(component),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Wraps a component without `activate`.
    pub fn passive<T: Component>(component: T) -> Self {
        Self::from_passive_arc(Arc::new(component))
    }

    pub fn from_passive_arc<T: Component>(component: Arc<T>) -> Self {
        Self {
            component: component.clone(),
            any: component,
            capability: Capability::Passive,
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn component(&self) -> &dyn Component {
        self.component.as_ref()
    }

    /// The `activate` capability, if the component has one.
    pub fn activatable(&self) -> Option<&Arc<dyn Activatable>> {
        match &self.capability {
            Capability::Activatable(component) => Some(component),
            Capability::Passive => None,
        }
    }

    pub fn is_activatable(&self) -> bool {
        self.activatable().is_some()
    }

    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.any.downcast_ref::<T>()
    }

    pub fn downcast<T: Component>(&self) -> Option<Arc<T>> {
        self.any.clone().downcast::<T>().ok()
    }

    pub fn is<T: Component>(&self) -> bool {
        self.any.is::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether both handles point at the same component.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.any) as *const (),
            Arc::as_ptr(&other.any) as *const (),
        )
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.type_name)
            .field("activatable", &self.is_activatable())
            .finish()
    }
}

/// A child component returned from a plugin's or widget's `activate`.
///
/// Registered as `<parent>-<name>`, falling back to `<parent>-<key>` when the
/// child has no name of its own.
pub struct SpawnedChild {
    pub instance: Instance,
    pub key: String,
    pub name: Option<String>,
    /// Target container; widgets when unset.
    pub kind: Option<BarbarianKind>,
    /// The child's own hardened view, used to read its subscription key.
    pub registry: Arc<dyn HardenedRegistry>,
}

impl SpawnedChild {
    pub fn new(key: impl Into<String>, instance: Instance, registry: Arc<dyn HardenedRegistry>) -> Self {
        Self {
            instance,
            key: key.into(),
            name: None,
            kind: None,
            registry,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn into_kind(mut self, kind: BarbarianKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Name under which this child is registered for `parent`.
    pub fn qualified_for(&self, parent: &str) -> String {
        let suffix = self.name.as_deref().unwrap_or(&self.key);
        format!("{}{}{}", parent, crate::kernel::constants::CHILD_NAME_SEPARATOR, suffix)
    }
}

impl fmt::Debug for SpawnedChild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnedChild")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("instance", &self.instance)
            .finish()
    }
}

#[cfg(test)]
mod tests;
