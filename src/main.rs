// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use light_capture::TargetColor;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "light-capture")]
#[command(about = "Capture a still whenever a bright light appears on camera")]
#[command(version = light_capture::constants::app_info::version())]
struct Cli {
    /// Config file (default: ~/.config/light-capture/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run light detection once on an image file
    Analyze {
        /// Image to analyse
        image: PathBuf,

        /// Detection sensitivity, 0-100
        #[arg(short, long)]
        sensitivity: Option<f32>,

        /// Only detect lights of this color (R,G,B or #RRGGBB)
        #[arg(short, long)]
        color: Option<TargetColor>,
    },

    /// Watch a frame source and capture whenever a light appears
    Watch {
        /// Image file, directory of images, or directory of camera feeds
        source: Option<PathBuf>,

        /// Where to save captures (default: ~/Pictures/light-capture)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Detection sensitivity, 0-100
        #[arg(short, long)]
        sensitivity: Option<f32>,

        /// Do not use the flashlight around captures
        #[arg(long)]
        no_flashlight: bool,

        /// Only detect lights of this color (R,G,B or #RRGGBB)
        #[arg(short, long)]
        color: Option<TargetColor>,

        /// How long each source image stays on screen, in milliseconds
        #[arg(long, default_value = "500")]
        frame_ms: u64,

        /// Replay the source images forever
        #[arg(long = "loop")]
        looped: bool,
    },

    /// Show the persisted configuration
    Config {
        /// Reset it to the defaults first
        #[arg(long)]
        reset: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=light_capture=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config_path = cli::resolve_config_path(cli.config)?;

    match cli.command {
        Commands::Analyze {
            image,
            sensitivity,
            color,
        } => cli::analyze(&config_path, &image, sensitivity, color),
        Commands::Watch {
            source,
            output,
            sensitivity,
            no_flashlight,
            color,
            frame_ms,
            looped,
        } => cli::watch(
            &config_path,
            cli::WatchOptions {
                source,
                output,
                sensitivity,
                no_flashlight,
                color,
                frame_ms,
                looped,
            },
        ),
        Commands::Config { reset } => cli::show_config(&config_path, reset),
    }
}
