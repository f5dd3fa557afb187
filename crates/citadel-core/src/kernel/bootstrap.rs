use std::sync::Arc;

use serde_json::Value;

use crate::component::{Container, ComponentError, Instance};
use crate::kernel::config::{ApplicationConfig, LoadOptions};
use crate::kernel::constants::{self, LOG_TARGET_LIFECYCLE, LOG_TARGET_LOAD, LOG_TARGET_REGISTRY};
use crate::kernel::diagnostics::{DiagnosticSink, LogSink};
use crate::kernel::error::{Error, LifecyclePhase, Result};
use crate::loader::{Group, InstancePolicy, LoadOrchestrator, Manifest, ManifestValidator, Resolved, Resolver};
use crate::registry::{BarbarianKind, BarbarianRegistry, ElevatedRegistry};

/// Where an [`Application`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Loading,
    Loaded,
    Activated,
    Destroyed,
}

/// Orchestrates manifest loading, registration and activation.
///
/// The application exclusively owns the four local containers (controllers,
/// modules, plugins, widgets) and the elevated registry, which holds services
/// and objects.
pub struct Application {
    config: ApplicationConfig,
    state: LifecycleState,
    activated: bool,
    pub(crate) core: Arc<dyn ElevatedRegistry>,
    resolver: Arc<dyn Resolver>,
    pub(crate) sink: Arc<dyn DiagnosticSink>,
    pub(crate) controllers: Container,
    pub(crate) modules: Container,
    pub(crate) plugins: Container,
    pub(crate) widgets: Container,
    pub(crate) barbarians: BarbarianRegistry,
}

impl Application {
    /// Creates an application with the default configuration.
    pub fn new(core: Arc<dyn ElevatedRegistry>, resolver: Arc<dyn Resolver>) -> Self {
        Self::with_config(core, resolver, ApplicationConfig::default())
    }

    pub fn with_config(core: Arc<dyn ElevatedRegistry>, resolver: Arc<dyn Resolver>, config: ApplicationConfig) -> Self {
        Self {
            config,
            state: LifecycleState::Created,
            activated: false,
            core,
            resolver,
            sink: Arc::new(LogSink),
            controllers: Container::new(),
            modules: Container::new(),
            plugins: Container::new(),
            widgets: Container::new(),
            barbarians: BarbarianRegistry::new(),
        }
    }

    /// Replaces the diagnostic sink (defaults to [`LogSink`]).
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.state
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn core_registry(&self) -> &Arc<dyn ElevatedRegistry> {
        &self.core
    }

    pub fn barbarian_registry(&self) -> &BarbarianRegistry {
        &self.barbarians
    }

    /// Validate a raw manifest, then load it.
    ///
    /// Validation failures are returned before any section is dispatched.
    pub async fn load_modules(&mut self, manifest: &Value, options: &LoadOptions) -> Result<()> {
        self.ensure_not_destroyed(LifecyclePhase::Load)?;
        let manifest = ManifestValidator::validate(manifest)?;
        self.load_manifest(&manifest, options).await
    }

    /// Load an already validated manifest.
    pub async fn load_manifest(&mut self, manifest: &Manifest, options: &LoadOptions) -> Result<()> {
        self.ensure_not_destroyed(LifecyclePhase::Load)?;
        let timeout = options
            .timeout_ms
            .map(std::time::Duration::from_millis)
            .unwrap_or_else(|| self.config.load_timeout());
        let orchestrator = LoadOrchestrator::new(
            Arc::clone(&self.resolver),
            timeout,
            self.config.load_strategy,
            Arc::clone(&self.sink),
        );

        let previous = self.state;
        if previous != LifecycleState::Activated {
            self.state = LifecycleState::Loading;
        }
        self.sink.info(
            LOG_TARGET_LOAD,
            &format!(
                "{} v{}: loading {} component(s) across {:?}",
                constants::APP_NAME,
                constants::APP_VERSION,
                manifest.len(),
                manifest.groups()
            ),
        );

        let outcome = orchestrator
            .run(manifest, |group, entries| self.register_section(group, entries))
            .await;

        if previous != LifecycleState::Activated {
            self.state = if outcome.is_ok() {
                LifecycleState::Loaded
            } else {
                previous
            };
        }
        outcome
    }

    /// Register one resolved section using the group's instance policy.
    pub(crate) fn register_section(&mut self, group: Group, entries: Vec<(String, Resolved)>) -> Result<()> {
        let policy = InstancePolicy::for_group(group);
        for (name, resolved) in entries {
            match policy.apply(&name, resolved) {
                Some(instance) => self.register(group, &name, instance)?,
                None => self.sink.warn(
                    LOG_TARGET_LOAD,
                    &format!("Skipping {} '{}': resolved to an empty value", group, name),
                ),
            }
        }
        Ok(())
    }

    /// Register `instance` under `name`, replacing any existing entry.
    pub fn register(&mut self, group: Group, name: &str, instance: Instance) -> Result<()> {
        match group {
            Group::Services => {
                if let Some(previous) = self.core.remove_service(name) {
                    self.warn_overwrite(group, name, &previous);
                }
                self.core.add_service(name, instance);
            }
            Group::Objects => {
                if let Some(previous) = self.core.remove_object(name) {
                    self.warn_overwrite(group, name, &previous);
                }
                self.core.add_object(name, instance);
            }
            Group::Controllers | Group::Modules | Group::Plugins | Group::Widgets => {
                let container = self.container_mut(group)?;
                let previous = container.add(name, instance);
                if let Some(previous) = previous {
                    self.warn_overwrite(group, name, &previous);
                }
            }
        }
        Ok(())
    }

    /// Register by section name; unknown sections are rejected.
    pub fn register_in(&mut self, section: &str, name: &str, instance: Instance) -> Result<()> {
        let group: Group = section.parse()?;
        self.register(group, name, instance)
    }

    fn warn_overwrite(&self, group: Group, name: &str, previous: &Instance) {
        self.sink.warn(
            LOG_TARGET_REGISTRY,
            &format!(
                "Overwriting {} '{}' (previous instance: {})",
                group,
                name,
                previous.type_name()
            ),
        );
    }

    pub(crate) fn container(&self, group: Group) -> Result<&Container> {
        match group {
            Group::Controllers => Ok(&self.controllers),
            Group::Modules => Ok(&self.modules),
            Group::Plugins => Ok(&self.plugins),
            Group::Widgets => Ok(&self.widgets),
            Group::Services | Group::Objects => Err(Error::UnknownSection {
                section: format!("{} (held by the core registry)", group),
            }),
        }
    }

    pub(crate) fn container_mut(&mut self, group: Group) -> Result<&mut Container> {
        match group {
            Group::Controllers => Ok(&mut self.controllers),
            Group::Modules => Ok(&mut self.modules),
            Group::Plugins => Ok(&mut self.plugins),
            Group::Widgets => Ok(&mut self.widgets),
            Group::Services | Group::Objects => Err(Error::UnknownSection {
                section: format!("{} (held by the core registry)", group),
            }),
        }
    }

    /// Whether `name` is registered in `group`.
    pub fn has(&self, group: Group, name: &str) -> bool {
        match group {
            Group::Services => self.core.has_service(name),
            Group::Objects => self.core.has_object(name),
            _ => self.container(group).is_ok_and(|c| c.has(name)),
        }
    }

    /// Soft lookup in `group`.
    pub fn get(&self, group: Group, name: &str) -> Option<Instance> {
        match group {
            Group::Services => self.core.get_service(name),
            Group::Objects => self.core.get_object(name),
            _ => self.container(group).ok().and_then(|c| c.get(name).cloned()),
        }
    }

    /// Every `(name, instance)` of `group`, in insertion order.
    pub fn get_all(&self, group: Group) -> Vec<(String, Instance)> {
        match group {
            Group::Services => self.core.services(),
            Group::Objects => self.core.objects(),
            _ => self.container(group).map(Container::get_all).unwrap_or_default(),
        }
    }

    pub fn has_controller(&self, name: &str) -> bool {
        self.has(Group::Controllers, name)
    }

    pub fn get_controller(&self, name: &str) -> Option<Instance> {
        self.get(Group::Controllers, name)
    }

    pub fn get_all_controllers(&self) -> Vec<(String, Instance)> {
        self.get_all(Group::Controllers)
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.has(Group::Modules, name)
    }

    pub fn get_module(&self, name: &str) -> Option<Instance> {
        self.get(Group::Modules, name)
    }

    pub fn get_all_modules(&self) -> Vec<(String, Instance)> {
        self.get_all(Group::Modules)
    }

    pub fn has_service(&self, name: &str) -> bool {
        self.has(Group::Services, name)
    }

    pub fn get_service(&self, name: &str) -> Option<Instance> {
        self.get(Group::Services, name)
    }

    pub fn get_all_services(&self) -> Vec<(String, Instance)> {
        self.get_all(Group::Services)
    }

    pub fn has_object(&self, name: &str) -> bool {
        self.has(Group::Objects, name)
    }

    pub fn get_object(&self, name: &str) -> Option<Instance> {
        self.get(Group::Objects, name)
    }

    pub fn get_all_objects(&self) -> Vec<(String, Instance)> {
        self.get_all(Group::Objects)
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.has(Group::Plugins, name)
    }

    pub fn get_plugin(&self, name: &str) -> Option<Instance> {
        self.get(Group::Plugins, name)
    }

    pub fn get_all_plugins(&self) -> Vec<(String, Instance)> {
        self.get_all(Group::Plugins)
    }

    pub fn has_widget(&self, name: &str) -> bool {
        self.has(Group::Widgets, name)
    }

    pub fn get_widget(&self, name: &str) -> Option<Instance> {
        self.get(Group::Widgets, name)
    }

    pub fn get_all_widgets(&self) -> Vec<(String, Instance)> {
        self.get_all(Group::Widgets)
    }

    /// Reverse lookup of the plugin or widget that reported `token` at activation.
    ///
    /// `Ok(None)` when the token is unknown; an error when the token is known
    /// but its component is no longer registered.
    pub fn get_plugin_or_widget_by_pub_sub_key(&self, token: &str) -> Result<Option<Instance>> {
        let Some(qualified) = self.barbarians.qualified_name(token) else {
            return Ok(None);
        };
        let container = match qualified.kind {
            BarbarianKind::Plugin => &self.plugins,
            BarbarianKind::Widget => &self.widgets,
        };
        container
            .get(&qualified.name)
            .cloned()
            .map(Some)
            .ok_or_else(|| Error::BarbarianRegistryInconsistency {
                token: token.to_string(),
                qualified: qualified.clone(),
            })
    }

    /// Invoke `method` on every registered component that exposes it.
    ///
    /// Groups are visited in [`Group::BROADCAST_ORDER`]; the first failure
    /// halts the broadcast.
    pub fn trigger_method_on_all(&self, method: &str, options: &Value) -> Result<()> {
        for group in Group::BROADCAST_ORDER {
            for (name, instance) in self.get_all(group) {
                if let Some(outcome) = instance.component().trigger(method, options) {
                    outcome.map_err(|source: ComponentError| Error::Broadcast {
                        method: method.to_string(),
                        group,
                        name,
                        source,
                    })?;
                }
            }
        }
        Ok(())
    }

    /// Tear down the core registry. Terminal.
    pub fn destroy(&mut self) -> Result<()> {
        self.ensure_not_destroyed(LifecyclePhase::Destroy)?;
        self.sink.info(LOG_TARGET_LIFECYCLE, "Destroying core registry");
        self.core.destroy();
        self.state = LifecycleState::Destroyed;
        Ok(())
    }

    pub(crate) fn ensure_not_destroyed(&self, phase: LifecyclePhase) -> Result<()> {
        if self.state == LifecycleState::Destroyed {
            return Err(Error::lifecycle(phase, "application has been destroyed"));
        }
        Ok(())
    }

    pub(crate) fn set_activated(&mut self) {
        self.activated = true;
        self.state = LifecycleState::Activated;
    }
}
