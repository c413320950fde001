//! CLI mode for page processing.

use crate::output::{OutputFormat, print_result, write_result_files};
use koten_ocr::core::EngineConfig;
use koten_ocr::core::constants::SUPPORTED_IMAGE_EXTENSIONS;
use koten_ocr::pipeline::EngineHandle;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Where and how results are emitted.
pub struct RunOptions {
    pub format: OutputFormat,
    pub output_dir: Option<PathBuf>,
}

/// Process one page image.
pub fn process_file(
    path: &Path,
    config: EngineConfig,
    options: &RunOptions,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let engine = init_engine(config)?;

    let ocr_start = Instant::now();
    let result = engine.process_path(path)?;
    let processing_time = ocr_start.elapsed().as_secs_f64() * 1000.0;
    info!("OCR completed in {:.2}ms", processing_time);

    emit(path, &result, options, processing_time)
}

/// Process every supported image of a directory, in file name order.
///
/// Pages that fail are reported and skipped.
pub fn process_dir(
    dir: &Path,
    config: EngineConfig,
    options: &RunOptions,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let inputs = collect_images(dir)?;
    if inputs.is_empty() {
        warn!("No supported images found in {}", dir.display());
        return Ok(());
    }
    let engine = init_engine(config)?;

    info!("Processing {} pages...", inputs.len());
    let batch_start = Instant::now();
    let mut failed = 0usize;
    for path in &inputs {
        let page_start = Instant::now();
        match engine.process_path(path) {
            Ok(result) => {
                let processing_time = page_start.elapsed().as_secs_f64() * 1000.0;
                emit(path, &result, options, processing_time)?;
            }
            Err(err) => {
                failed += 1;
                warn!("Failed to process {}: {}", path.display(), err);
            }
        }
    }
    info!(
        "Processed {} pages ({} failed) in {:.2}ms",
        inputs.len(),
        failed,
        batch_start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

fn init_engine(
    config: EngineConfig,
) -> Result<EngineHandle, Box<dyn std::error::Error + Send + Sync>> {
    info!("Initializing OCR engine...");
    let init_start = Instant::now();
    let engine = EngineHandle::from_config(config)?;
    info!(
        "Engine initialized in {:.2}ms",
        init_start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(engine)
}

fn emit(
    path: &Path,
    result: &koten_ocr::pipeline::PageResult,
    options: &RunOptions,
    processing_time: f64,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match &options.output_dir {
        Some(dir) => {
            write_result_files(dir, path, result, processing_time)?;
            info!("Wrote results for {} to {}", path.display(), dir.display());
        }
        None => print_result(result, options.format, processing_time)?,
    }
    Ok(())
}

/// Supported image files directly inside `dir`, sorted by path.
fn collect_images(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                SUPPORTED_IMAGE_EXTENSIONS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            });
        if path.is_file() && supported {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}
