//! Attentive CLI: concentration analysis for recorded and live landmark streams.
//!
//! Usage:
//!   attentive analyze <FRAMES>     Analyze a recorded frame stream
//!   attentive monitor <FRAMES>     Run a background monitoring session
//!   attentive simulate <OUT>       Write a synthetic frame stream
//!   attentive config               Show (or save) the effective configuration
//!   attentive info <FRAMES>        Show frame stream information

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "attentive",
    about = "Attentiveness and concentration tracking from facial landmarks",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a recorded frame stream and print the session report
    Analyze {
        /// Path to the JSONL frame stream
        path: PathBuf,

        /// Weighting preset: standard|lightweight
        #[arg(long)]
        preset: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Explicit config file (defaults to the standard location)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run a monitoring session over a frame stream until it ends or Ctrl+C
    Monitor {
        /// Path to the JSONL frame stream
        path: PathBuf,

        /// Weighting preset: standard|lightweight
        #[arg(long)]
        preset: Option<String>,

        /// Stop after this many minutes
        #[arg(long)]
        minutes: Option<f64>,

        /// Replay frames at their recorded pace
        #[arg(long)]
        realtime: bool,

        /// How long to wait for the worker when stopping
        #[arg(long)]
        stop_timeout_ms: Option<u64>,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,

        /// Explicit config file (defaults to the standard location)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write a synthetic frame stream
    Simulate {
        /// Output JSONL path
        output: PathBuf,

        /// Number of frames to generate
        #[arg(long, default_value = "1800")]
        frames: usize,

        /// Frame rate of the generated stream
        #[arg(long, default_value = "30")]
        fps: f64,

        /// Behaviour pattern: focused|distracted|mixed
        #[arg(long, default_value = "mixed")]
        pattern: String,
    },

    /// Show the effective configuration
    Config {
        /// Weighting preset to apply: standard|lightweight
        #[arg(long)]
        preset: Option<String>,

        /// Save the configuration to the standard location
        #[arg(long)]
        save: bool,
    },

    /// Show frame stream information
    Info {
        /// Path to the JSONL frame stream
        path: PathBuf,
    },
}

/// How long the runtime waits for detached session workers at exit.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

impl Commands {
    /// Explicit config file and preset, for commands that take them.
    fn config_source(&self) -> (Option<PathBuf>, Option<String>) {
        match self {
            Commands::Analyze { config, preset, .. } | Commands::Monitor { config, preset, .. } => {
                (config.clone(), preset.clone())
            }
            Commands::Config { preset, .. } => (None, preset.clone()),
            Commands::Simulate { .. } | Commands::Info { .. } => (None, None),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config_path, preset) = cli.command.config_source();
    let app = commands::resolve_config(config_path, preset)?;

    let mut logging = app.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    attentive_common::logging::init_logging(&logging);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = match cli.command {
        Commands::Analyze { path, json, .. } => commands::analyze::run(path, app, json),
        Commands::Monitor {
            path,
            minutes,
            realtime,
            stop_timeout_ms,
            json,
            ..
        } => runtime.block_on(commands::monitor::run(
            path,
            app,
            minutes,
            realtime,
            stop_timeout_ms,
            json,
        )),
        Commands::Simulate {
            output,
            frames,
            fps,
            pattern,
        } => commands::simulate::run(output, frames, fps, pattern),
        Commands::Config { save, .. } => commands::config::run(app, save),
        Commands::Info { path } => commands::info::run(path),
    };

    // A worker abandoned by a timed-out stop must not hold the process open.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}
