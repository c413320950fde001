//! Formatting and writing of page results.

use clap::ValueEnum;
use koten_ocr::pipeline::{PageResult, TextLineResult};
use serde::Serialize;
use std::path::Path;

/// Output format of the `ocr` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
    Pretty,
}

/// JSON document written per page.
#[derive(Debug, Serialize)]
pub struct OcrResponse<'a> {
    pub success: bool,
    pub text: String,
    pub lines: &'a [TextLineResult],
    pub image_width: u32,
    pub image_height: u32,
    pub vertical_majority: bool,
    pub processing_time_ms: f64,
}

impl<'a> OcrResponse<'a> {
    pub fn from_result(result: &'a PageResult, processing_time_ms: f64) -> Self {
        Self {
            success: true,
            text: result.text(),
            lines: &result.lines,
            image_width: result.image_width,
            image_height: result.image_height,
            vertical_majority: result.page.vertical_majority,
            processing_time_ms,
        }
    }
}

/// Prints one page in the requested format.
pub fn print_result(
    result: &PageResult,
    format: OutputFormat,
    processing_time_ms: f64,
) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Json => {
            let response = OcrResponse::from_result(result, processing_time_ms);
            println!("{}", serde_json::to_string(&response)?);
        }
        OutputFormat::Text => {
            println!("{}", result.text());
        }
        OutputFormat::Pretty => {
            println!("\n=== OCR Results ===");
            print!("{result}");
            println!("Processing time: {:.2}ms", processing_time_ms);
            println!();
            if result.lines.is_empty() {
                println!("No text detected.");
            } else {
                println!("--- Full Text ---");
                println!("{}", result.text());
            }
        }
    }
    Ok(())
}

/// Writes `<stem>.txt` and `<stem>.json` for `source` into `dir`.
pub fn write_result_files(
    dir: &Path,
    source: &Path,
    result: &PageResult,
    processing_time_ms: f64,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    std::fs::create_dir_all(dir)?;
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());

    std::fs::write(dir.join(format!("{stem}.txt")), result.text())?;
    let response = OcrResponse::from_result(result, processing_time_ms);
    std::fs::write(
        dir.join(format!("{stem}.json")),
        serde_json::to_string_pretty(&response)?,
    )?;
    Ok(())
}
