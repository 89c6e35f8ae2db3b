//! Définition et implémentation des commandes CLI
//!
//! - `build`: GeoJSON source → snapshot versionné
//! - `validate`: contrôles d'un snapshot, rapport JSON optionnel
//! - `index`: manifeste de tous les snapshots

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;
use tracing::{debug, info};

use civic_mn::build::{build_snapshot, BuildOutcome, BuildRequest};
use civic_mn::config::{Config, Paths};
use civic_mn::index::build_index;
use civic_mn::validate::validate_snapshot;

#[derive(Subcommand)]
pub enum Commands {
    /// Build a versioned snapshot from the source GeoJSON
    Build {
        /// Version label (YYYY-MM format, e.g., 2025-04); defaults to build.version
        #[arg(id = "snapshot_version", long = "version", value_name = "YYYY-MM")]
        version: Option<String>,

        /// Source GeoJSON, overrides build.input_path
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Rebuild even if the snapshot exists with a different source
        #[arg(long)]
        force: bool,
    },

    /// Validate a built snapshot
    Validate {
        /// Version label of the snapshot to check
        #[arg(id = "snapshot_version", long = "version", value_name = "YYYY-MM")]
        version: String,

        /// Write the report as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Write data-out/index.json, manifest.json and per-state pointers
    Index,
}

/// Configuration et racine résolues une fois par exécution
pub struct Context {
    pub config: Config,
    pub paths: Paths,
}

impl Context {
    pub fn load(root: Option<PathBuf>, config: Option<&Path>) -> Result<Self> {
        let paths = Paths::resolve(root)?;
        let (config, source) = Config::resolve(paths.root(), config)?;
        debug!(
            root = %paths.root().display(),
            config = ?source,
            "Context loaded"
        );
        Ok(Self { config, paths })
    }
}

/// Exécute la commande build
pub fn cmd_build(
    ctx: &Context,
    version: Option<String>,
    input: Option<PathBuf>,
    force: bool,
) -> Result<bool> {
    let request = BuildRequest {
        version,
        input,
        force,
    };

    let outcome = build_snapshot(&ctx.config, &ctx.paths, &request)?;
    let metadata = outcome.metadata();
    match &outcome {
        BuildOutcome::Built { .. } => println!(
            "Built {} {}: {} features ({} repaired, {} dropped) → {}",
            metadata.id,
            metadata.version,
            metadata.stats.features,
            metadata.stats.repaired,
            metadata.stats.dropped,
            outcome.dir().display()
        ),
        BuildOutcome::Unchanged { .. } => println!(
            "Snapshot {} {} is up to date ({})",
            metadata.id,
            metadata.version,
            outcome.dir().display()
        ),
    }

    Ok(true)
}

/// Exécute la commande validate
pub fn cmd_validate(ctx: &Context, version: String, report_path: Option<&Path>) -> Result<bool> {
    let report = validate_snapshot(&ctx.config, &ctx.paths, &version)?;
    report.display();

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        info!(path = %path.display(), "Report saved");
    }

    println!("{}", report.summary());
    Ok(report.passed())
}

/// Exécute la commande index
pub fn cmd_index(ctx: &Context) -> Result<bool> {
    let summary = build_index(&ctx.config, &ctx.paths)?;
    println!(
        "Indexed {} snapshots ({} passed, {} failed, {} unreadable), {} GeoJSON files",
        summary.snapshots, summary.passed, summary.failed, summary.unreadable, summary.files
    );
    Ok(true)
}
