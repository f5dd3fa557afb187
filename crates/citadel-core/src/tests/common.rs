//! Fixtures shared by the module test suites.
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::component::{Activatable, Component, ComponentError, Grant, Instance, SpawnedChild};
use crate::kernel::Application;
use crate::kernel::config::ApplicationConfig;
use crate::kernel::diagnostics::MemorySink;
use crate::loader::{ModuleId, ResolveError, Resolved, Resolver, StaticResolver};
use crate::registry::{DefaultCoreRegistry, HardenedRegistry, KeyedPubSub, PubSub, PubSubKey};

/// Ordered log of what the probes saw.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().clone()
}

type Spawner = Arc<dyn Fn() -> Vec<SpawnedChild> + Send + Sync>;

/// Which kind of grant a probe was activated with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeenGrant {
    Controller { application_activated: bool },
    Module,
    Barbarian { token: String },
}

/// Instrumented component: journals `activate` and the `refresh` broadcast.
pub struct Probe {
    label: String,
    journal: Journal,
    fail_activate: bool,
    fail_trigger: bool,
    spawner: Option<Spawner>,
    pub seen: Mutex<Vec<SeenGrant>>,
}

impl Probe {
    pub fn new(label: &str, journal: &Journal) -> Self {
        Self {
            label: label.to_string(),
            journal: journal.clone(),
            fail_activate: false,
            fail_trigger: false,
            spawner: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail_activate = true;
        self
    }

    pub fn failing_trigger(mut self) -> Self {
        self.fail_trigger = true;
        self
    }

    pub fn spawning<F>(mut self, spawner: F) -> Self
    where
        F: Fn() -> Vec<SpawnedChild> + Send + Sync + 'static,
    {
        self.spawner = Some(Arc::new(spawner));
        self
    }

    pub fn into_instance(self) -> Instance {
        Instance::active(self)
    }
}

impl Component for Probe {
    fn trigger(&self, method: &str, _options: &Value) -> Option<Result<(), ComponentError>> {
        if method != "refresh" {
            return None;
        }
        self.journal.lock().push(format!("refresh:{}", self.label));
        if self.fail_trigger {
            return Some(Err(ComponentError::failed(format!("{} refused to refresh", self.label))));
        }
        Some(Ok(()))
    }
}

impl Activatable for Probe {
    fn activate(&self, grant: Grant<'_>) -> Result<Vec<SpawnedChild>, ComponentError> {
        let seen = match &grant {
            Grant::Controller { application, .. } => SeenGrant::Controller {
                application_activated: application.is_activated(),
            },
            Grant::Module { .. } => SeenGrant::Module,
            Grant::Barbarian { registry, .. } => SeenGrant::Barbarian {
                token: registry.pub_sub().current_pub_sub_key().id().to_string(),
            },
        };
        self.seen.lock().push(seen);
        self.journal.lock().push(self.label.clone());
        if self.fail_activate {
            return Err(ComponentError::failed(format!("{} blew up", self.label)));
        }
        Ok(self.spawner.as_ref().map(|spawn| spawn()).unwrap_or_default())
    }
}

/// Component without `activate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker(pub &'static str);

impl Component for Marker {}

pub fn marker(label: &'static str) -> Instance {
    Instance::passive(Marker(label))
}

/// Hardened view with a fixed token and nothing else.
pub struct TokenView {
    pub_sub: Arc<KeyedPubSub>,
}

impl TokenView {
    pub fn new(token: &str) -> Arc<dyn HardenedRegistry> {
        Arc::new(Self {
            pub_sub: Arc::new(KeyedPubSub::new(PubSubKey::new(token))),
        })
    }
}

impl HardenedRegistry for TokenView {
    fn has_service(&self, _name: &str) -> bool {
        false
    }

    fn get_service(&self, _name: &str) -> Option<Instance> {
        None
    }

    fn has_object(&self, _name: &str) -> bool {
        false
    }

    fn get_object(&self, _name: &str) -> Option<Instance> {
        None
    }

    fn pub_sub(&self) -> Arc<dyn PubSub> {
        self.pub_sub.clone()
    }
}

/// Resolver with per-identifier delays and identifiers that never answer.
#[derive(Clone, Default)]
pub struct ScriptedResolver {
    catalog: StaticResolver,
    pending: HashSet<ModuleId>,
    delays: HashMap<ModuleId, Duration>,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedResolver {
    pub fn new(catalog: StaticResolver) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn never(mut self, id: &str) -> Self {
        self.pending.insert(ModuleId::new(id));
        self
    }

    pub fn delayed(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(ModuleId::new(id), delay);
        self
    }
}

#[async_trait]
impl Resolver for ScriptedResolver {
    async fn resolve(&self, identifiers: Vec<ModuleId>) -> Result<Vec<Resolved>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if identifiers.iter().any(|id| self.pending.contains(id)) {
            return std::future::pending().await;
        }
        let delay = identifiers
            .iter()
            .filter_map(|id| self.delays.get(id))
            .max()
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.catalog.resolve_now(&identifiers)
    }
}

/// An application wired to an in-memory core registry and a memory sink.
pub struct Harness {
    pub app: Application,
    pub sink: Arc<MemorySink>,
    pub core: DefaultCoreRegistry,
}

pub fn harness<R: Resolver + 'static>(resolver: R) -> Harness {
    harness_with(resolver, ApplicationConfig::default())
}

pub fn harness_with<R: Resolver + 'static>(resolver: R, config: ApplicationConfig) -> Harness {
    let sink = Arc::new(MemorySink::new());
    let core = DefaultCoreRegistry::new();
    let app = Application::with_config(Arc::new(core.clone()), Arc::new(resolver), config).with_sink(sink.clone());
    Harness { app, sink, core }
}

/// A catalog where each identifier resolves to a fresh [`Marker`] of the same label.
pub fn marker_catalog(ids: &[&'static str]) -> StaticResolver {
    ids.iter().fold(StaticResolver::new(), |catalog, id| {
        let id: &'static str = id;
        catalog.with(id, move || Resolved::Value(marker(id)))
    })
}
