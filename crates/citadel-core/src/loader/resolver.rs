use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use thiserror::Error;

use crate::component::{Component, Instance};
use crate::loader::ModuleId;

/// Failure reported by a [`Resolver`].
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("identifier '{identifier}' could not be resolved")]
    Unresolved { identifier: ModuleId },

    #[error("resolver returned {received} values for {expected} identifiers")]
    CountMismatch { expected: usize, received: usize },

    #[error("{0}")]
    Other(String),
}

/// Maps identifiers to values.
///
/// On success the values must come back in request order, one per identifier.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, identifiers: Vec<ModuleId>) -> Result<Vec<Resolved>, ResolveError>;
}

/// A value produced by a [`Resolver`].
#[derive(Clone, Debug)]
pub enum Resolved {
    /// Nothing usable; registration is skipped.
    Empty,
    /// A ready-made component.
    Value(Instance),
    /// Builds a fresh component with no arguments.
    Constructor(Constructor),
    /// Named exports; a group entry may unwrap the export matching its own name.
    Namespace(Namespace),
}

impl Resolved {
    pub fn is_empty(&self) -> bool {
        matches!(self, Resolved::Empty)
    }
}

/// Zero-argument component factory.
#[derive(Clone)]
pub struct Constructor {
    build: Arc<dyn Fn() -> Instance + Send + Sync>,
}

impl Constructor {
    pub fn new<F>(build: F) -> Self
    where
        F: Fn() -> Instance + Send + Sync + 'static,
    {
        Self { build: Arc::new(build) }
    }

    pub fn construct(&self) -> Instance {
        (self.build)()
    }
}

impl Component for Constructor {}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Constructor")
    }
}

/// Named exports of a resolved value.
#[derive(Clone, Debug, Default)]
pub struct Namespace {
    exports: IndexMap<String, Instance>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, instance: Instance) -> Self {
        self.exports.insert(name.into(), instance);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.exports.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.exports.keys().map(String::as_str)
    }
}

impl Component for Namespace {}

type Entry = Arc<dyn Fn() -> Resolved + Send + Sync>;

/// In-memory catalog resolver.
///
/// Each identifier maps to a closure evaluated on every resolution. A request
/// fails on the first unknown identifier.
#[derive(Clone, Default)]
pub struct StaticResolver {
    entries: IndexMap<ModuleId, Entry>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, id: impl Into<ModuleId>, entry: F)
    where
        F: Fn() -> Resolved + Send + Sync + 'static,
    {
        self.entries.insert(id.into(), Arc::new(entry));
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<F>(mut self, id: impl Into<ModuleId>, entry: F) -> Self
    where
        F: Fn() -> Resolved + Send + Sync + 'static,
    {
        self.register(id, entry);
        self
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &ModuleId> {
        self.entries.keys()
    }

    /// Synchronous resolution shared by the async impl and wrappers.
    pub fn resolve_now(&self, identifiers: &[ModuleId]) -> Result<Vec<Resolved>, ResolveError> {
        identifiers
            .iter()
            .map(|id| {
                self.entries
                    .get(id)
                    .map(|entry| entry())
                    .ok_or_else(|| ResolveError::Unresolved { identifier: id.clone() })
            })
            .collect()
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    async fn resolve(&self, identifiers: Vec<ModuleId>) -> Result<Vec<Resolved>, ResolveError> {
        self.resolve_now(&identifiers)
    }
}
