//! Point d'entrée CLI pour civic-us-mn

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Construire, valider et indexer les snapshots de précincts du Minnesota
#[derive(Parser)]
#[command(name = "civic-us-mn")]
#[command(author, version)]
#[command(about = "Build, validate and index versioned Minnesota precinct snapshots")]
#[command(long_about = "Pipeline en trois étapes sur data-in/ et data-out/:\n\n  build     GeoJSON source → snapshot versionné\n  validate  contrôles structurels d'un snapshot\n  index     manifeste des snapshots construits")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Racine du dépôt (défaut: env CIVIC_MN_ROOT / répertoire courant)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Fichier de configuration YAML (défaut: env CIVIC_MN_CFG / data-config/us_mn_precincts.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<ExitCode> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    let ctx = cli::Context::load(cli.root, cli.config.as_deref())?;

    let passed = match cli.command {
        Commands::Build {
            version,
            input,
            force,
        } => cli::cmd_build(&ctx, version, input, force)?,
        Commands::Validate { version, report } => {
            cli::cmd_validate(&ctx, version, report.as_deref())?
        }
        Commands::Index => cli::cmd_index(&ctx)?,
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
