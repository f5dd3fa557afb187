use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::component::{Container, Instance};
use crate::kernel::Application;
use crate::kernel::error::{Error, Result};
use crate::registry::{ElevatedRegistry, HardenedRegistry, PubSub, PubSubKey};

#[derive(Default)]
struct CoreState {
    services: RwLock<Container>,
    objects: RwLock<Container>,
    activated: AtomicBool,
    destroyed: AtomicBool,
    next_key: AtomicU64,
}

/// In-memory [`ElevatedRegistry`].
///
/// Every hardened view it issues carries its own subscription key
/// (`pubsub-1`, `pubsub-2`, ...).
#[derive(Clone, Default)]
pub struct DefaultCoreRegistry {
    state: Arc<CoreState>,
}

impl DefaultCoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_activated(&self) -> bool {
        self.state.activated.load(Ordering::SeqCst)
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.destroyed.load(Ordering::SeqCst)
    }

    /// Number of hardened views issued so far.
    pub fn issued_views(&self) -> u64 {
        self.state.next_key.load(Ordering::SeqCst)
    }
}

impl ElevatedRegistry for DefaultCoreRegistry {
    fn has_service(&self, name: &str) -> bool {
        self.state.services.read().has(name)
    }

    fn get_service(&self, name: &str) -> Option<Instance> {
        self.state.services.read().get(name).cloned()
    }

    fn add_service(&self, name: &str, instance: Instance) {
        self.state.services.write().add(name, instance);
    }

    fn remove_service(&self, name: &str) -> Option<Instance> {
        self.state.services.write().remove(name)
    }

    fn services(&self) -> Vec<(String, Instance)> {
        self.state.services.read().get_all()
    }

    fn has_object(&self, name: &str) -> bool {
        self.state.objects.read().has(name)
    }

    fn get_object(&self, name: &str) -> Option<Instance> {
        self.state.objects.read().get(name).cloned()
    }

    fn add_object(&self, name: &str, instance: Instance) {
        self.state.objects.write().add(name, instance);
    }

    fn remove_object(&self, name: &str) -> Option<Instance> {
        self.state.objects.write().remove(name)
    }

    fn objects(&self) -> Vec<(String, Instance)> {
        self.state.objects.read().get_all()
    }

    fn activate(&self, _application: &Application) -> Result<()> {
        if self.is_destroyed() {
            return Err(Error::CoreRegistry("cannot activate a destroyed core registry".to_string()));
        }
        self.state.activated.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn hardened_instance(&self) -> Arc<dyn HardenedRegistry> {
        let n = self.state.next_key.fetch_add(1, Ordering::SeqCst) + 1;
        Arc::new(HardenedView {
            state: self.state.clone(),
            pub_sub: Arc::new(KeyedPubSub::new(PubSubKey::new(format!("pubsub-{}", n)))),
        })
    }

    fn destroy(&self) {
        self.state.services.write().clear();
        self.state.objects.write().clear();
        self.state.destroyed.store(true, Ordering::SeqCst);
    }
}

/// Read-only view over a [`DefaultCoreRegistry`].
pub struct HardenedView {
    state: Arc<CoreState>,
    pub_sub: Arc<KeyedPubSub>,
}

impl HardenedRegistry for HardenedView {
    fn has_service(&self, name: &str) -> bool {
        self.state.services.read().has(name)
    }

    fn get_service(&self, name: &str) -> Option<Instance> {
        self.state.services.read().get(name).cloned()
    }

    fn has_object(&self, name: &str) -> bool {
        self.state.objects.read().has(name)
    }

    fn get_object(&self, name: &str) -> Option<Instance> {
        self.state.objects.read().get(name).cloned()
    }

    fn pub_sub(&self) -> Arc<dyn PubSub> {
        self.pub_sub.clone()
    }
}

/// Pub/sub whose current key never changes.
#[derive(Debug, Clone)]
pub struct KeyedPubSub {
    key: PubSubKey,
}

impl KeyedPubSub {
    pub fn new(key: PubSubKey) -> Self {
        Self { key }
    }
}

impl PubSub for KeyedPubSub {
    fn current_pub_sub_key(&self) -> PubSubKey {
        self.key.clone()
    }
}
