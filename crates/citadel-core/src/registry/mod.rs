//! # Citadel Registries
//!
//! Collaborator interfaces for the privileged core registry and the views
//! derived from it, plus the barbarian registry that maps event-origin
//! tokens back to plugin and widget names.
//!
//! - [`ElevatedRegistry`]: full service/object access; only the
//!   [`Application`](crate::kernel::Application), controllers and modules see it.
//! - [`HardenedRegistry`]: the attenuated view handed to each plugin/widget.
//! - [`PubSub`]: exposes the current subscription key of a view.
//! - [`DefaultCoreRegistry`]: an in-memory elevated registry.
//! - [`BarbarianRegistry`]: token → `category:name` bookkeeping.
pub mod barbarian;
pub mod memory;

use std::fmt;
use std::sync::Arc;

use crate::component::Instance;
use crate::kernel::Application;
use crate::kernel::error::Result;

pub use self::barbarian::{BarbarianKind, BarbarianRegistry, QualifiedName};
pub use self::memory::{DefaultCoreRegistry, HardenedView, KeyedPubSub};

/// Opaque identifier of a subscription key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PubSubKey {
    id: String,
}

impl PubSubKey {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for PubSubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Publish/subscribe collaborator. Only the current key matters to the kernel.
pub trait PubSub: Send + Sync {
    fn current_pub_sub_key(&self) -> PubSubKey;
}

/// Attenuated capability view of the core registry.
pub trait HardenedRegistry: Send + Sync {
    fn has_service(&self, name: &str) -> bool;
    fn get_service(&self, name: &str) -> Option<Instance>;
    fn has_object(&self, name: &str) -> bool;
    fn get_object(&self, name: &str) -> Option<Instance>;
    fn pub_sub(&self) -> Arc<dyn PubSub>;
}

/// The privileged core registry.
pub trait ElevatedRegistry: Send + Sync {
    fn has_service(&self, name: &str) -> bool;
    fn get_service(&self, name: &str) -> Option<Instance>;
    fn add_service(&self, name: &str, instance: Instance);
    fn remove_service(&self, name: &str) -> Option<Instance>;
    /// Every service in insertion order.
    fn services(&self) -> Vec<(String, Instance)>;

    fn has_object(&self, name: &str) -> bool;
    fn get_object(&self, name: &str) -> Option<Instance>;
    fn add_object(&self, name: &str, instance: Instance);
    fn remove_object(&self, name: &str) -> Option<Instance>;
    /// Every object in insertion order.
    fn objects(&self) -> Vec<(String, Instance)>;

    /// First step of the activation cascade.
    fn activate(&self, application: &Application) -> Result<()>;

    /// A fresh hardened view; never shared between components.
    fn hardened_instance(&self) -> Arc<dyn HardenedRegistry>;

    fn destroy(&self);
}
