//! Built-in `demo:*` components used by `citadel boot`.
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use citadel_core::loader::{Constructor, Namespace};
use citadel_core::{
    Activatable, Component, ComponentError, DefaultCoreRegistry, ElevatedRegistry, Grant, Instance, ModuleId,
    ResolveError, Resolved, Resolver, SpawnedChild, StaticResolver,
};
use log::{debug, info, warn};
use serde_json::Value;

/// Identifier that never resolves; exercises the load timeout.
pub const NEVER: &str = "demo:never";

/// Resolver over the demo components.
///
/// Holds a handle to the core registry so plugins can mint hardened views
/// for the children they spawn.
#[derive(Clone)]
pub struct DemoCatalog {
    catalog: StaticResolver,
}

impl DemoCatalog {
    pub fn new(core: DefaultCoreRegistry) -> Self {
        let catalog = StaticResolver::new()
            .with("demo:heartbeat", || Resolved::Value(Instance::active(Heartbeat::default())))
            .with("demo:settings", || Resolved::Value(Instance::active(Settings)))
            .with("demo:clock", || Resolved::Constructor(Constructor::new(|| Instance::passive(Clock))))
            .with("demo:config", || {
                Resolved::Value(Instance::passive(StaticConfig(serde_json::json!({ "greeting": "hello" }))))
            })
            .with("demo:greeter", move || {
                let greeter = Greeter { core: core.clone() };
                Resolved::Namespace(Namespace::new().with("greeter", Instance::active(greeter)))
            })
            .with("demo:status", || Resolved::Value(Instance::active(Status)))
            .with("demo:empty", || Resolved::Empty);
        Self { catalog }
    }

    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.catalog.identifiers().map(ToString::to_string).collect();
        ids.push(NEVER.to_string());
        ids
    }
}

#[async_trait]
impl Resolver for DemoCatalog {
    async fn resolve(&self, identifiers: Vec<ModuleId>) -> Result<Vec<Resolved>, ResolveError> {
        if identifiers.iter().any(|id| id.as_str() == NEVER) {
            debug!("Section requested {}, leaving it pending", NEVER);
            return std::future::pending().await;
        }
        self.catalog.resolve_now(&identifiers)
    }
}

/// Controller that starts the heartbeat object.
#[derive(Default)]
pub struct Heartbeat {
    beats: AtomicU64,
}

impl Component for Heartbeat {
    fn trigger(&self, method: &str, _options: &Value) -> Option<Result<(), ComponentError>> {
        (method == "refresh").then(|| {
            let beats = self.beats.fetch_add(1, Ordering::SeqCst) + 1;
            debug!("Heartbeat #{}", beats);
            Ok(())
        })
    }
}

impl Activatable for Heartbeat {
    fn activate(&self, grant: Grant<'_>) -> Result<Vec<SpawnedChild>, ComponentError> {
        let registry = grant
            .elevated()
            .ok_or_else(|| ComponentError::failed("heartbeat requires the elevated registry"))?;
        registry.add_object("heartbeat", Instance::passive(StaticConfig(Value::Bool(true))));
        info!("Heartbeat started");
        Ok(Vec::new())
    }
}

/// Module that depends on the `clock` service.
pub struct Settings;

impl Component for Settings {}

impl Activatable for Settings {
    fn activate(&self, grant: Grant<'_>) -> Result<Vec<SpawnedChild>, ComponentError> {
        let registry = grant
            .elevated()
            .ok_or_else(|| ComponentError::failed("settings requires the elevated registry"))?;
        if !registry.has_service("clock") {
            return Err(ComponentError::MissingDependency("clock".to_string()));
        }
        Ok(Vec::new())
    }
}

/// Passive service.
pub struct Clock;

impl Component for Clock {}

/// Passive object wrapping a JSON value.
pub struct StaticConfig(pub Value);

impl Component for StaticConfig {}

/// Plugin that spawns one `echo` child widget with its own hardened view.
pub struct Greeter {
    core: DefaultCoreRegistry,
}

impl Component for Greeter {
    fn trigger(&self, method: &str, _options: &Value) -> Option<Result<(), ComponentError>> {
        (method == "refresh").then(|| Ok(()))
    }
}

impl Activatable for Greeter {
    fn activate(&self, grant: Grant<'_>) -> Result<Vec<SpawnedChild>, ComponentError> {
        if let Some(view) = grant.hardened() {
            info!("Greeter activated with key {}", view.pub_sub().current_pub_sub_key());
        }
        let child = SpawnedChild::new("echo", Instance::passive(Echo), self.core.hardened_instance());
        Ok(vec![child])
    }
}

/// Child spawned by [`Greeter`].
pub struct Echo;

impl Component for Echo {}

/// Widget that reports whether the clock is visible through its view.
pub struct Status;

impl Component for Status {}

impl Activatable for Status {
    fn activate(&self, grant: Grant<'_>) -> Result<Vec<SpawnedChild>, ComponentError> {
        match grant.hardened() {
            Some(view) if view.has_service("clock") => info!("Status widget sees the clock"),
            Some(_) => warn!("Status widget cannot see the clock"),
            None => return Err(ComponentError::failed("status expects a hardened view")),
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catalog_resolves_known_identifiers() {
        let catalog = DemoCatalog::new(DefaultCoreRegistry::new());
        let resolved = catalog
            .resolve(vec![ModuleId::new("demo:clock"), ModuleId::new("demo:empty")])
            .await
            .unwrap();

        assert!(matches!(resolved[0], Resolved::Constructor(_)));
        assert!(resolved[1].is_empty());
    }

    #[tokio::test]
    async fn test_catalog_rejects_unknown_identifiers() {
        let catalog = DemoCatalog::new(DefaultCoreRegistry::new());
        let err = catalog.resolve(vec![ModuleId::new("demo:nope")]).await.unwrap_err();

        assert!(matches!(err, ResolveError::Unresolved { .. }));
    }

    #[test]
    fn test_identifiers_include_pending_entry() {
        let catalog = DemoCatalog::new(DefaultCoreRegistry::new());
        let ids = catalog.identifiers();

        assert!(ids.contains(&"demo:greeter".to_string()));
        assert!(ids.contains(&NEVER.to_string()));
    }
}
