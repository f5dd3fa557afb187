use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};

use crate::kernel::config::{LoadStrategy, duration_millis};
use crate::kernel::constants::LOG_TARGET_LOAD;
use crate::kernel::diagnostics::DiagnosticSink;
use crate::kernel::error::{Error, Result};
use crate::loader::{Group, Manifest, ModuleId, ResolveError, Resolved, Resolver};

/// One manifest group, ready to be sent to the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub group: Group,
    pub names: Vec<String>,
    pub identifiers: Vec<ModuleId>,
}

/// Outcome of a single section: resolved values zipped back to their names.
pub type SectionOutcome = (Group, Result<Vec<(String, Resolved)>>);

/// Dispatches manifest sections to a [`Resolver`], each bounded by a timeout.
pub struct LoadOrchestrator {
    resolver: Arc<dyn Resolver>,
    timeout: Duration,
    strategy: LoadStrategy,
    sink: Arc<dyn DiagnosticSink>,
}

impl LoadOrchestrator {
    pub fn new(
        resolver: Arc<dyn Resolver>,
        timeout: Duration,
        strategy: LoadStrategy,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            resolver,
            timeout,
            strategy,
            sink,
        }
    }

    /// Non-empty sections of `manifest`, in group order.
    pub fn sections(manifest: &Manifest) -> Vec<Section> {
        manifest
            .groups()
            .into_iter()
            .filter_map(|group| {
                let entries = manifest.section(group)?;
                Some(Section {
                    group,
                    names: entries.keys().cloned().collect(),
                    identifiers: entries.values().cloned().collect(),
                })
            })
            .collect()
    }

    /// Resolve one section.
    ///
    /// The outcome latches on whichever settles first, the resolver or the
    /// timeout. A late resolver answer is dropped with its future.
    pub fn dispatch(&self, section: Section) -> impl Future<Output = SectionOutcome> + Send + 'static {
        let resolver = Arc::clone(&self.resolver);
        let timeout = self.timeout;
        async move {
            let Section {
                group,
                names,
                identifiers,
            } = section;
            let outcome = match tokio::time::timeout(timeout, resolver.resolve(identifiers)).await {
                Err(_) => Err(Error::LoadTimeout {
                    group,
                    timeout_ms: duration_millis(timeout),
                }),
                Ok(Err(source)) => Err(Error::LoadFailure { group, source }),
                Ok(Ok(values)) if values.len() != names.len() => Err(Error::LoadFailure {
                    group,
                    source: ResolveError::CountMismatch {
                        expected: names.len(),
                        received: values.len(),
                    },
                }),
                Ok(Ok(values)) => Ok(names.into_iter().zip(values).collect()),
            };
            (group, outcome)
        }
    }

    /// Load every non-empty section of `manifest`, handing each successful
    /// section to `register` as soon as it settles.
    ///
    /// Waits for all sections, then returns the first failure. Sections that
    /// succeeded stay registered either way.
    pub async fn run<F>(&self, manifest: &Manifest, mut register: F) -> Result<()>
    where
        F: FnMut(Group, Vec<(String, Resolved)>) -> Result<()>,
    {
        let sections = Self::sections(manifest);
        let total = sections.len();
        let mut failures: Vec<Error> = Vec::new();

        match self.strategy {
            LoadStrategy::Concurrent => {
                let mut pending: FuturesUnordered<_> = sections.into_iter().map(|s| self.dispatch(s)).collect();
                while let Some((group, outcome)) = pending.next().await {
                    self.settle(group, outcome, &mut register, &mut failures);
                }
            }
            LoadStrategy::Priority => {
                for section in sections {
                    let (group, outcome) = self.dispatch(section).await;
                    self.settle(group, outcome, &mut register, &mut failures);
                }
            }
        }

        if failures.is_empty() {
            self.sink.info(LOG_TARGET_LOAD, &format!("Loaded {} section(s)", total));
            return Ok(());
        }
        self.sink.error(
            LOG_TARGET_LOAD,
            &format!("{} of {} section(s) failed to load", failures.len(), total),
        );
        Err(failures.remove(0))
    }

    fn settle<F>(&self, group: Group, outcome: Result<Vec<(String, Resolved)>>, register: &mut F, failures: &mut Vec<Error>)
    where
        F: FnMut(Group, Vec<(String, Resolved)>) -> Result<()>,
    {
        let result = outcome.and_then(|entries| register(group, entries));
        if let Err(e) = result {
            self.sink.error(
                LOG_TARGET_LOAD,
                &format!("Failed to load group '{}': {}", group.manifest_path(), e),
            );
            failures.push(e);
        }
    }
}
