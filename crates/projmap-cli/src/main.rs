//! projmap CLI
//!
//! Command-line host for the projmap indexing engine: full scans, single-file
//! updates and index consistency checks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use projmap_indexer::{
    FilterOptions, IndexMaintainer, IndexStore, IndexWarning, IndexerConfig, IndexerError,
    ProgressEvent, ProjectIndex,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit status for invalid patterns, roots, targets and configuration.
const EXIT_CONFIGURATION: u8 = 2;

#[derive(Parser)]
#[command(name = "projmap")]
#[command(about = "projmap - Structural index of TypeScript/JavaScript projects")]
#[command(version)]
struct Cli {
    /// Configuration file (default: ~/.projmap/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a complete index of a project
    Scan {
        /// Project root (default: current directory)
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Include pattern (repeatable)
        #[arg(short, long)]
        include: Vec<String>,

        /// Exclude pattern (repeatable)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Index file (default: <root>/.projmap/index.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the index to stdout instead of writing it
        #[arg(long)]
        stdout: bool,
    },

    /// Re-index one file of an existing index
    Update {
        /// File to update, absolute or relative to the project root
        target: PathBuf,

        /// Project root used to locate the index (default: current directory)
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Index file (default: <root>/.projmap/index.json)
        #[arg(long)]
        index: Option<PathBuf>,
    },

    /// Verify the structural invariants of a stored index
    Check {
        /// Project root used to locate the index (default: current directory)
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Index file (default: <root>/.projmap/index.json)
        #[arg(long)]
        index: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(EXIT_CONFIGURATION);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Scan {
            root,
            include,
            exclude,
            output,
            stdout,
        } => {
            cmd_scan(
                config,
                root,
                FilterOptions { include, exclude },
                output,
                stdout,
            )
            .await
        }
        Commands::Update {
            target,
            root,
            index,
        } => cmd_update(config, target, store_for(&root, index)).await,
        Commands::Check { root, index } => cmd_check(store_for(&root, index)).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if is_configuration_error(&e) {
                ExitCode::from(EXIT_CONFIGURATION)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<IndexerConfig> {
    match path {
        Some(path) => IndexerConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(IndexerConfig::load()),
    }
}

fn store_for(root: &Path, index: Option<PathBuf>) -> IndexStore {
    index.map_or_else(|| IndexStore::for_project(root), IndexStore::new)
}

fn is_configuration_error(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<IndexerError>())
        .any(IndexerError::is_configuration)
}

async fn cmd_scan(
    config: IndexerConfig,
    root: PathBuf,
    filters: FilterOptions,
    output: Option<PathBuf>,
    stdout: bool,
) -> Result<ExitCode> {
    let maintainer = IndexMaintainer::new(config);

    let outcome = tokio::task::spawn_blocking(move || {
        let progress = |event: ProgressEvent| debug!(?event, "Progress");
        maintainer.scan(&root, &filters, Some(&progress))
    })
    .await
    .context("Scan task panicked")?
    .context("Scan failed")?;

    print_warnings(&outcome.warnings);

    let index = &outcome.index;
    if stdout {
        print!("{}", projmap_indexer::storage::to_json(index)?);
        return Ok(ExitCode::SUCCESS);
    }

    let store = output.map_or_else(
        || IndexStore::for_project(&index.metadata.root_path),
        IndexStore::new,
    );
    store
        .save(index)
        .await
        .with_context(|| format!("Failed to write index to {}", store.path().display()))?;

    println!(
        "✓ Indexed {} files, {} edges, {} warnings in {}ms -> {}",
        index.nodes.len(),
        index.edges.len(),
        outcome.warnings.len(),
        outcome.duration_ms,
        store.path().display()
    );

    Ok(ExitCode::SUCCESS)
}

async fn cmd_update(config: IndexerConfig, target: PathBuf, store: IndexStore) -> Result<ExitCode> {
    let index = store
        .load()
        .await
        .with_context(|| format!("Failed to load index from {}", store.path().display()))?;
    let maintainer = IndexMaintainer::new(config);

    let (index, outcome) = tokio::task::spawn_blocking(move || {
        let mut index = index;
        let outcome = maintainer.update(&mut index, &target, None)?;
        Ok::<_, IndexerError>((index, outcome))
    })
    .await
    .context("Update task panicked")?
    .context("Update failed")?;

    print_warnings(&outcome.warnings);
    store.save(&index).await?;

    info!(path = %outcome.path, action = ?outcome.action, "Index saved");
    println!(
        "✓ {}: {:?} ({} files, {} edges)",
        outcome.path,
        outcome.action,
        index.nodes.len(),
        index.edges.len()
    );

    Ok(ExitCode::SUCCESS)
}

async fn cmd_check(store: IndexStore) -> Result<ExitCode> {
    let index: ProjectIndex = store
        .load()
        .await
        .with_context(|| format!("Failed to load index from {}", store.path().display()))?;

    let violations = index.check_invariants();
    let (dangling, broken): (Vec<_>, Vec<_>) =
        violations.into_iter().partition(|v| v.is_dangling());

    for violation in &dangling {
        println!("  ~ {violation}");
    }
    for violation in &broken {
        println!("  ✗ {violation}");
    }

    if broken.is_empty() {
        println!(
            "✓ Index is consistent ({} files, {} dangling edges)",
            index.nodes.len(),
            dangling.len()
        );
        Ok(ExitCode::SUCCESS)
    } else {
        println!("✗ {} invariant violations", broken.len());
        Ok(ExitCode::FAILURE)
    }
}

fn print_warnings(warnings: &[IndexWarning]) {
    for warning in warnings {
        eprintln!("  ⚠ {warning}");
    }
}
