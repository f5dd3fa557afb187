mod catalog;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use citadel_core::kernel::constants::{APP_NAME, APP_VERSION};
use citadel_core::{
    ActivateOptions, Application, ApplicationConfig, DefaultCoreRegistry, Group, KernelError, LoadOptions, LoadStrategy, Manifest,
};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::catalog::DemoCatalog;

/// Citadel: manifest-driven component bootstrap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a manifest file and summarize its groups
    Validate {
        /// Manifest file (.json, .yaml or .toml)
        manifest: PathBuf,
    },
    /// Load and activate a manifest against the demo catalog, then shut down
    Boot {
        /// Manifest file (.json, .yaml or .toml)
        manifest: PathBuf,
        /// Application config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Per-section load timeout, overriding the config
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Section scheduling: concurrent or priority
        #[arg(long)]
        strategy: Option<LoadStrategy>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // The fmt subscriber also forwards `log` records from citadel-core
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let args = CliArgs::parse();
    info!("{} {}", APP_NAME, APP_VERSION);

    let result = match args.command {
        Commands::Validate { manifest } => validate(&manifest),
        Commands::Boot {
            manifest,
            config,
            timeout_ms,
            strategy,
        } => boot(&manifest, config.as_deref(), timeout_ms, strategy).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn validate(path: &Path) -> Result<(), KernelError> {
    let manifest = Manifest::from_path(path)?;
    println!("Manifest '{}' is valid ({} entries)", path.display(), manifest.len());
    for group in manifest.groups() {
        let count = manifest.section(group).map(|s| s.len()).unwrap_or_default();
        println!("  {}: {}", group.manifest_path(), count);
    }
    Ok(())
}

async fn boot(
    path: &Path,
    config: Option<&Path>,
    timeout_ms: Option<u64>,
    strategy: Option<LoadStrategy>,
) -> Result<(), KernelError> {
    let mut app_config = match config {
        Some(config) => ApplicationConfig::from_path(config)?,
        None => ApplicationConfig::default(),
    };
    if let Some(ms) = timeout_ms {
        app_config = app_config.with_load_timeout(Duration::from_millis(ms));
    }
    if let Some(strategy) = strategy {
        app_config = app_config.with_load_strategy(strategy);
    }

    let manifest = Manifest::from_path(path)?;
    let core = DefaultCoreRegistry::new();
    let resolver = DemoCatalog::new(core.clone());
    let mut app = Application::with_config(Arc::new(core), Arc::new(resolver), app_config);

    println!("Loading '{}'...", path.display());
    app.load_manifest(&manifest, &LoadOptions::default()).await?;
    app.activate(&ActivateOptions::default())?;

    println!("Registered components:");
    for group in Group::ALL {
        let names: Vec<String> = app.get_all(group).into_iter().map(|(name, _)| name).collect();
        if !names.is_empty() {
            println!("  {}: {}", group.manifest_path(), names.join(", "));
        }
    }

    let barbarians = app.barbarian_registry();
    if barbarians.is_empty() {
        println!("Barbarian registry: (empty)");
    } else {
        println!("Barbarian registry:");
        for (token, qualified) in barbarians.iter() {
            println!("  {} -> {}", token, qualified);
        }
    }

    app.trigger_method_on_all("refresh", &serde_json::json!({}))?;

    println!("Shutting down...");
    app.destroy()
}
