//! The activation cascade.
//!
//! Tiers run strictly in order: core registry, controllers, modules,
//! plugins, widgets. Controller failures abort the cascade; module, plugin
//! and widget failures are logged and skipped. Children spawned by plugins
//! and widgets are registered as `<parent>-<child>` in the widgets container
//! (unless the child names another kind) and recorded in the barbarian
//! registry alongside their parents.
use std::sync::Arc;

use serde_json::Value;

use crate::component::{Grant, Instance, SpawnedChild};
use crate::kernel::bootstrap::{Application, LifecycleState};
use crate::kernel::config::ActivateOptions;
use crate::kernel::constants::{LOG_TARGET_ACTIVATION, LOG_TARGET_REGISTRY};
use crate::kernel::error::{Error, LifecyclePhase, Result};
use crate::loader::Group;
use crate::registry::{BarbarianKind, HardenedRegistry, QualifiedName};

impl Application {
    /// Run the activation cascade once.
    ///
    /// Always ends in [`LifecycleState::Activated`] unless the core registry
    /// or a controller fails, or a spawned child collides with an existing name.
    /// `options.settings` reaches every component through its [`Grant`].
    pub fn activate(&mut self, options: &ActivateOptions) -> Result<()> {
        match self.lifecycle() {
            LifecycleState::Destroyed => {
                return Err(Error::lifecycle(LifecyclePhase::Activate, "application has been destroyed"));
            }
            LifecycleState::Activated => {
                return Err(Error::lifecycle(LifecyclePhase::Activate, "application is already activated"));
            }
            LifecycleState::Created => self.sink.warn(
                LOG_TARGET_ACTIVATION,
                "Activating before any manifest was loaded",
            ),
            LifecycleState::Loading | LifecycleState::Loaded => {}
        }

        // Children spawned below land in these containers; they are already
        // active and must not be walked a second time.
        let plugins = self.plugins.get_all();
        let widgets = self.widgets.get_all();

        let core = Arc::clone(&self.core);
        core.activate(self)?;

        let settings = &options.settings;
        self.activate_controllers(settings)?;
        self.activate_modules(settings);
        self.activate_barbarians(BarbarianKind::Plugin, plugins, settings)?;
        self.activate_barbarians(BarbarianKind::Widget, widgets, settings)?;

        self.set_activated();
        self.sink.info(LOG_TARGET_ACTIVATION, "Application activated");
        Ok(())
    }

    fn activate_controllers(&self, settings: &Value) -> Result<()> {
        for (name, instance) in self.controllers.get_all() {
            let Some(component) = instance.activatable() else {
                continue;
            };
            let children = component
                .activate(Grant::Controller {
                    registry: &self.core,
                    application: self,
                    options: settings,
                })
                .map_err(|source| Error::Activation {
                    group: Group::Controllers,
                    name: name.clone(),
                    source,
                })?;
            self.ignore_children(Group::Controllers, &name, children);
        }
        Ok(())
    }

    fn activate_modules(&self, settings: &Value) {
        for (name, instance) in self.modules.get_all() {
            let Some(component) = instance.activatable() else {
                continue;
            };
            match component.activate(Grant::Module {
                registry: &self.core,
                options: settings,
            }) {
                Ok(children) => self.ignore_children(Group::Modules, &name, children),
                Err(e) => self.sink.error(
                    LOG_TARGET_ACTIVATION,
                    &format!("Failed to activate module '{}': {}", name, e),
                ),
            }
        }
    }

    fn activate_barbarians(&mut self, kind: BarbarianKind, entries: Vec<(String, Instance)>, settings: &Value) -> Result<()> {
        for (name, instance) in entries {
            let registry = self.core.hardened_instance();
            let children = match instance.activatable() {
                Some(component) => match component.activate(Grant::Barbarian {
                    registry: Arc::clone(&registry),
                    options: settings,
                }) {
                    Ok(children) => children,
                    Err(e) => {
                        self.sink.error(
                            LOG_TARGET_ACTIVATION,
                            &format!("Failed to activate {} '{}': {}", kind, name, e),
                        );
                        continue;
                    }
                },
                None => Vec::new(),
            };

            self.record_barbarian(registry.as_ref(), QualifiedName::new(kind, name.clone()));
            for child in children {
                self.adopt_child(&name, child)?;
            }
        }
        Ok(())
    }

    /// Register a spawned child and record its token.
    ///
    /// Children of plugins and widgets alike land in the widgets container
    /// unless they ask for another kind.
    fn adopt_child(&mut self, parent: &str, child: SpawnedChild) -> Result<()> {
        let kind = child.kind.unwrap_or(BarbarianKind::Widget);
        let name = child.qualified_for(parent);
        let container = match kind {
            BarbarianKind::Plugin => &mut self.plugins,
            BarbarianKind::Widget => &mut self.widgets,
        };
        if container.has(&name) {
            return Err(Error::ChildNameCollision {
                kind,
                parent: parent.to_string(),
                name,
            });
        }
        container.add(name.clone(), child.instance);
        self.record_barbarian(child.registry.as_ref(), QualifiedName::new(kind, name));
        Ok(())
    }

    fn record_barbarian(&mut self, registry: &dyn HardenedRegistry, qualified: QualifiedName) {
        let token = registry.pub_sub().current_pub_sub_key().id().to_string();
        let message = format!("Recorded {} for token '{}'", qualified, token);
        if let Some(previous) = self.barbarians.record(token.clone(), qualified) {
            self.sink.warn(
                LOG_TARGET_REGISTRY,
                &format!("Token '{}' was already mapped to {}; replacing it", token, previous),
            );
        }
        self.sink.info(LOG_TARGET_REGISTRY, &message);
    }

    fn ignore_children(&self, group: Group, name: &str, children: Vec<SpawnedChild>) {
        if !children.is_empty() {
            self.sink.warn(
                LOG_TARGET_ACTIVATION,
                &format!(
                    "Ignoring {} child component(s) returned by {} '{}'",
                    children.len(),
                    group,
                    name
                ),
            );
        }
    }
}
