//! Error handling for the OCR engine.

mod constructors;
mod types;

pub use types::{ImageProcessError, OCRError, OcrResult, SimpleError};
