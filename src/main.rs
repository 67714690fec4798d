// SPDX-License-Identifier: GPL-3.0-only

use clap::{Args, Parser, Subcommand};
use depth_capture::Config;
use depth_capture::constants::app_info;
use depth_capture::errors::AppResult;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "depth-capture")]
#[command(about = "Capture colored point clouds from a depth camera")]
#[command(version = app_info::version())]
struct Cli {
    /// Config file (default: ~/.config/depth-capture/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Replay directory holding depth.png and color.png
    #[arg(short, long, conflicts_with = "synthetic", required_unless_present = "synthetic")]
    replay: Option<PathBuf>,

    /// Use the built-in synthetic scene
    #[arg(long)]
    synthetic: bool,

    /// Export with the rig's measured sensor pose instead of the configured calibration
    #[arg(long)]
    preset: bool,
}

impl SourceArgs {
    fn source(self) -> cli::Source {
        match self.replay {
            Some(dir) => cli::Source::Replay(dir),
            None => cli::Source::Synthetic,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the capture loop
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Stop after this many ticks (default: until Ctrl+C)
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Export the last good frame when the loop ends
        #[arg(short, long)]
        export: bool,

        /// Output file or directory (implies --export)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Refresh once and save the view as PLY
    Snapshot {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file or directory (default: ~/Documents/depth-capture/pointcloud_TIMESTAMP.ply)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the config file location and effective settings
    Config,
}

fn main() -> AppResult<()> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=depth_capture=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.or_else(Config::default_path);
    let config = match &config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Run {
            source,
            ticks,
            export,
            output,
        } => {
            let preset = source.preset;
            cli::run(&config, source.source(), ticks, export, output, preset)
        }
        Commands::Snapshot { source, output } => {
            let preset = source.preset;
            cli::snapshot(&config, source.source(), output, preset)
        }
        Commands::Config => cli::show_config(config_path.as_deref(), &config),
    }
}
