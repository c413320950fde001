//! koten-ocr command line
//!
//! Runs layout detection, cascaded line recognition and reading-order assembly
//! on page images of historical Japanese documents.
//!
//! # Usage
//!
//! ```bash
//! koten-ocr ocr --file page.jpg --model-dir /opt/koten
//! koten-ocr ocr --dir scans/ --model-dir /opt/koten --output-dir out/ --output text
//! koten-ocr ocr --file page.jpg --config engine.json --device cuda --split-overflow
//! ```

mod cli;
mod config;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "koten-ocr")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "OCR for historical Japanese documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize a single page or every page in a directory
    Ocr {
        /// Local file path of the page image to process
        #[arg(long, conflicts_with = "dir", required_unless_present = "dir")]
        file: Option<PathBuf>,

        /// Directory of page images to process
        #[arg(long, conflicts_with = "file")]
        dir: Option<PathBuf>,

        #[command(flatten)]
        engine: config::EngineArgs,

        /// Output format (json, text, pretty)
        #[arg(long, value_enum, default_value_t = output::OutputFormat::Pretty)]
        output: output::OutputFormat,

        /// Write `<stem>.txt` and `<stem>.json` per page into this directory
        #[arg(long = "output-dir")]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    koten_ocr::utils::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ocr {
            file,
            dir,
            engine,
            output,
            output_dir,
        } => {
            let config = config::build_engine_config(&engine)?;
            let options = cli::RunOptions {
                format: output,
                output_dir,
            };

            if let Some(file) = file {
                info!("Processing file: {}", file.display());
                cli::process_file(&file, config, &options)?;
            } else if let Some(dir) = dir {
                info!("Processing directory: {}", dir.display());
                cli::process_dir(&dir, config, &options)?;
            }
        }
    }

    Ok(())
}
