// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "barcode-scanner")]
#[command(about = "Scan barcodes and QR codes from camera frames")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run image files through a scan session and print events as JSON lines
    Scan {
        /// Image files, processed in order as consecutive frames
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// JSON options file (camelCase keys)
        #[arg(short, long)]
        options: Option<PathBuf>,

        /// Crop side as a fraction of frame height, in (0, 1]
        #[arg(short, long)]
        crop_percent: Option<f64>,

        /// Only decode QR and Micro QR codes
        #[arg(long)]
        qr_only: bool,

        /// Retry harder on frames without a code
        #[arg(long)]
        try_harder: bool,

        /// Do not retry on inverted images
        #[arg(long)]
        no_invert: bool,

        /// Do not look for rotated codes
        #[arg(long)]
        no_rotate: bool,

        /// Sensor rotation reported with every frame (degrees)
        #[arg(short, long, default_value = "0")]
        rotation: i32,

        /// Apply the scan delays before printing events
        #[arg(long)]
        delayed: bool,
    },

    /// Switch the device torch on or off
    Torch {
        #[arg(value_enum)]
        state: TorchSwitch,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TorchSwitch {
    On,
    Off,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=barcode_scanner=trace, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            files,
            options,
            crop_percent,
            qr_only,
            try_harder,
            no_invert,
            no_rotate,
            rotation,
            delayed,
        } => {
            let overrides = cli::OptionOverrides {
                crop_percent,
                qr_only,
                try_harder,
                no_invert,
                no_rotate,
            };
            let options = cli::resolve_options(options.as_deref(), &overrides)?;
            cli::scan_files(files, options, rotation, delayed)
        }
        Commands::Torch { state } => cli::switch_torch(matches!(state, TorchSwitch::On)),
    }
}
