//! Error types for the OCR engine.
//!
//! Detection, recognition and decoding each get a dedicated variant so callers
//! can tell which part of a page pipeline failed.

use crate::domain::Tier;
use thiserror::Error;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Failures of the pixel-level helpers in [`crate::utils`].
#[derive(Debug, Error)]
pub enum ImageProcessError {
    #[error("invalid resize target ({width}x{height})")]
    InvalidResizeTarget { width: u32, height: u32 },
    /// The source image has a zero dimension.
    #[error("empty source image")]
    InvalidInput,
}

/// A plain-message error used as the `source` of wrapped errors.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SimpleError(pub String);

impl SimpleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Everything that can go wrong while building an engine or reading a page.
///
/// Every failure except an empty line crop is fatal for the page being
/// processed: no partial page result is ever returned.
#[derive(Error, Debug)]
pub enum OCRError {
    #[error("image load")]
    ImageLoad(#[from] image::ImageError),

    #[error("image processing failed")]
    ImageProcessing(#[from] ImageProcessError),

    /// Layout detection failed, either in inference or while reading its outputs.
    #[error("detection failed: {context}")]
    Detection {
        context: String,
        #[source]
        source: BoxedError,
    },

    /// A recognizer failed on one line. Fatal for the whole page.
    #[error("recognition failed at {tier} tier for line {line_index}")]
    Recognition {
        tier: Tier,
        /// Original index of the line being recognized.
        line_index: usize,
        #[source]
        source: Box<OCRError>,
    },

    /// The recognizer produced output that cannot be decoded.
    #[error("decode failed: {message}")]
    Decode { message: String },

    #[error("inference failed in model '{model_name}': {context}")]
    Inference {
        model_name: String,
        context: String,
        #[source]
        source: BoxedError,
    },

    #[error(
        "model '{model_name}' inference failed: {operation} with input shape {input_shape:?}: {context}"
    )]
    ModelInference {
        model_name: String,
        /// e.g. "forward_pass" or "output_extraction".
        operation: String,
        input_shape: Vec<usize>,
        context: String,
        #[source]
        source: BoxedError,
    },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("configuration: {message}")]
    ConfigError { message: String },

    #[error(transparent)]
    Session(#[from] ort::Error),

    #[error("tensor shape")]
    Tensor(#[from] ndarray::ShapeError),

    #[error("io")]
    Io(#[from] std::io::Error),

    #[error("model load failed for '{model_path}': {reason}{suggestion}")]
    ModelLoad {
        model_path: String,
        reason: String,
        /// Prefixed with "; " when present.
        suggestion: String,
        #[source]
        source: Option<BoxedError>,
    },
}

impl From<crate::core::config::ConfigError> for OCRError {
    fn from(error: crate::core::config::ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}

/// Result alias used across the crate.
pub type OcrResult<T> = Result<T, OCRError>;
