//! # Citadel Kernel
//!
//! The `kernel` module owns the [`Application`](bootstrap::Application): the
//! orchestrator that loads a manifest into the component containers and runs
//! the activation cascade across trust tiers.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Bootstrapping**: [`Application`](bootstrap::Application) construction,
//!   manifest loading and lookups live in the `bootstrap` submodule.
//! - **Activation**: the ordered, failure-isolating cascade lives in `activation`.
//! - **Configuration**: [`ApplicationConfig`](config::ApplicationConfig) and
//!   per-call [`LoadOptions`](config::LoadOptions) and
//!   [`ActivateOptions`](config::ActivateOptions) live in `config`.
//! - **Diagnostics**: the injected [`DiagnosticSink`](diagnostics::DiagnosticSink).
//! - **Error Handling**: [`Error`](error::Error) and the `Result` alias in `error`.
pub mod activation;
pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod error;

pub use bootstrap::{Application, LifecycleState};
pub use error::{Error, Result};
