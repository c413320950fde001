//! Traits at the inference seams of the engine.
//!
//! The engine never talks to ONNX Runtime directly. Layout detection and line
//! recognition go through [`InferenceEngine`] and [`TextLineRecognizer`], so any
//! backend (or a test double) can be plugged in.

use crate::core::errors::OCRError;
use image::RgbImage;
use std::fmt::Debug;

/// Trait for inference engine operations.
///
/// An inference engine maps a preprocessed input to raw model outputs.
/// Implementations must be safe to call from several worker threads at once.
pub trait InferenceEngine: Send + Sync + Debug {
    /// Input type for inference (typically a tensor)
    type Input: Send + Sync + Debug;

    /// Output type from inference (typically a tensor)
    type Output: Send + Sync + Debug;

    /// Perform inference on preprocessed input.
    ///
    /// # Arguments
    ///
    /// * `input` - Preprocessed input ready for inference
    ///
    /// # Returns
    ///
    /// Raw inference output or an error
    fn infer(&self, input: &Self::Input) -> Result<Self::Output, OCRError>;

    /// Get information about the inference engine.
    ///
    /// # Returns
    ///
    /// String describing the inference engine (model type, backend, etc.)
    fn engine_info(&self) -> String;

    /// Spatial input size `(width, height)` the model expects.
    fn input_size(&self) -> (u32, u32);
}

/// Recognizes the text of a single cropped line image.
///
/// One recognizer is bound to each capacity tier of the cascade.
pub trait TextLineRecognizer: Send + Sync + Debug {
    /// Returns the decoded text of `line`.
    fn recognize(&self, line: &RgbImage) -> Result<String, OCRError>;

    /// Name used in logs.
    fn name(&self) -> &str;
}
