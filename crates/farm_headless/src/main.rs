//! Headless farm runner.
//!
//! This binary runs the farm without graphics, controlled via JSON on stdin/stdout
//! or a RON script. Designed for playtesting data files and CI determinism checks.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p farm_headless -- run --data assets/data
//!
//! # Play a script
//! cargo run -p farm_headless -- run --data assets/data --script assets/data/demo_script.ron
//!
//! # Check data files
//! cargo run -p farm_headless -- validate --data assets/data
//!
//! # Replay the world several times and compare hashes
//! cargo run -p farm_headless -- verify --data assets/data --runs 5
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use farm_headless::loader::{load_script, World, WorldPaths};
use farm_headless::runner::{verify_world, HeadlessRunner};

#[derive(Parser)]
#[command(name = "farm_headless")]
#[command(about = "Headless farm simulation runner for playtesting and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive session, or a script when one is given
    Run {
        #[command(flatten)]
        world: WorldArgs,

        /// RON script to play instead of reading stdin
        #[arg(short, long)]
        script: Option<PathBuf>,
    },

    /// Check world files for consistency problems
    Validate {
        #[command(flatten)]
        world: WorldArgs,
    },

    /// Replay the world several times and compare state hashes
    Verify {
        #[command(flatten)]
        world: WorldArgs,

        /// Number of runs
        #[arg(short, long, default_value = "3")]
        runs: usize,

        /// Simulation time to reach (milliseconds)
        #[arg(long, default_value = "600000")]
        until_ms: u64,

        /// Advance granularity (milliseconds)
        #[arg(long, default_value = "16")]
        stride_ms: u64,
    },
}

#[derive(Args)]
struct WorldArgs {
    /// Directory holding sim_config.ron, catalog.json and obstacles.json
    #[arg(short, long, default_value = "assets/data")]
    data: PathBuf,

    /// Override the simulation config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the entity catalog file
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Override the obstacle file
    #[arg(long)]
    obstacles: Option<PathBuf>,
}

impl WorldArgs {
    fn paths(&self) -> WorldPaths {
        let mut paths = WorldPaths::in_dir(&self.data);
        if let Some(config) = &self.config {
            paths.config = Some(config.clone());
        }
        if let Some(catalog) = &self.catalog {
            paths.catalog = catalog.clone();
        }
        if let Some(obstacles) = &self.obstacles {
            paths.obstacles = Some(obstacles.clone());
        }
        paths
    }

    fn load(&self) -> World {
        match World::load(&self.paths()) {
            Ok(world) => world,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load world");
                std::process::exit(1);
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Commands::Run { world, script } => cmd_run(&world, script),
        Commands::Validate { world } => cmd_validate(&world),
        Commands::Verify {
            world,
            runs,
            until_ms,
            stride_ms,
        } => cmd_verify(&world, runs, until_ms, stride_ms),
    }
}

/// Run an interactive or scripted session
fn cmd_run(world: &WorldArgs, script: Option<PathBuf>) {
    let mut runner = match HeadlessRunner::from_world(world.load()) {
        Ok(runner) => runner,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build simulation");
            std::process::exit(1);
        }
    };

    let Some(script_path) = script else {
        tracing::info!("Starting interactive session");
        let stdin = io::stdin();
        if let Err(e) = runner.run_io(stdin.lock(), io::stdout().lock()) {
            tracing::error!(error = %e, "Session IO failed");
            std::process::exit(1);
        }
        return;
    };

    let script = match load_script(&script_path) {
        Ok(script) => script,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load script");
            std::process::exit(1);
        }
    };

    let mut out = io::stdout().lock();
    let lines = std::iter::once(runner.ready())
        .chain(runner.run_script(&script))
        .map(|response| response.to_json_line());
    for line in lines {
        if let Err(e) = out.write_all(line.as_bytes()) {
            tracing::error!(error = %e, "Failed to write output");
            std::process::exit(1);
        }
    }
}

/// Report consistency problems in the world files
fn cmd_validate(world: &WorldArgs) {
    let loaded = world.load();
    let errors = loaded.validate();

    if errors.is_empty() {
        tracing::info!(
            entities = loaded.catalog.len(),
            obstacle_areas = loaded.obstacles.areas.len(),
            "World data is valid"
        );
        return;
    }

    for error in &errors {
        tracing::error!("{error}");
    }
    tracing::error!(count = errors.len(), "World data has errors");
    std::process::exit(1);
}

/// Replay the world and compare final hashes
fn cmd_verify(world: &WorldArgs, runs: usize, until_ms: u64, stride_ms: u64) {
    let loaded = world.load();
    let report = match verify_world(&loaded, runs, until_ms, stride_ms) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build simulation");
            std::process::exit(1);
        }
    };

    if report.is_deterministic() {
        tracing::info!(
            runs,
            until_ms = report.until_ms,
            hash = report.hashes.first().copied().unwrap_or_default(),
            "Determinism verified"
        );
    } else {
        tracing::error!(hashes = ?report.hashes, "Runs diverged");
        std::process::exit(1);
    }
}
