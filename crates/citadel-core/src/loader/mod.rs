//! # Citadel Loader
//!
//! Turns a declarative manifest into registered instances.
//!
//! - [`manifest`]: the [`Manifest`] model, the fixed [`Group`] set and the
//!   validator that checks raw input before anything is dispatched.
//! - [`resolver`]: the [`Resolver`] seam that maps identifiers to values.
//! - [`policy`]: the per-group [`InstancePolicy`] applied to resolved values.
//! - [`orchestrator`]: the [`LoadOrchestrator`] that fans sections out to the
//!   resolver with a per-section timeout.
pub mod manifest;
pub mod orchestrator;
pub mod policy;
pub mod resolver;

pub use manifest::{Group, Manifest, ManifestValidator, ModuleId};
pub use orchestrator::{LoadOrchestrator, Section};
pub use policy::InstancePolicy;
pub use resolver::{Constructor, Namespace, ResolveError, Resolved, Resolver, StaticResolver};

#[cfg(test)]
mod tests;
