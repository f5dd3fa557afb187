//! # citadel-core
//!
//! Bootstrap and lifecycle orchestration for applications assembled from
//! named component groups (controllers, modules, services, objects, plugins
//! and widgets).
//!
//! A declarative [`Manifest`] is resolved into live component instances by a
//! [`Resolver`], registered into per-group [`Container`]s, and then driven
//! through a single activation cascade by the [`Application`].
pub mod component;
pub mod kernel;
pub mod loader;
pub mod registry;

// Re-export key public types/traits for easier use by the binary and embedders
pub use component::{Activatable, Component, ComponentError, Container, Grant, Instance, SpawnedChild};
pub use kernel::Application;
pub use kernel::config::{ActivateOptions, ApplicationConfig, LoadOptions, LoadStrategy};
pub use kernel::diagnostics::{DiagnosticSink, LogSink, MemorySink};
pub use kernel::error::{Error as KernelError, Result};
pub use loader::{Group, Manifest, ModuleId, Resolved, ResolveError, Resolver, StaticResolver};
pub use registry::{BarbarianKind, BarbarianRegistry, DefaultCoreRegistry, ElevatedRegistry, HardenedRegistry, PubSub, PubSubKey, QualifiedName};

// Shared fixtures for the per-module test suites
#[cfg(test)]
mod tests;
