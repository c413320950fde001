//! The core module of the OCR engine.
//!
//! This module contains the fundamental components of the engine, including:
//! - Tensor type aliases
//! - Configuration management
//! - Constants used throughout the engine
//! - Error handling
//! - ONNX Runtime inference integration
//! - Traits defining the inference seams
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod batch;
pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;
pub mod traits;

pub use batch::{Tensor3D, Tensor4D};
pub use config::{ConfigError, ConfigValidator, EngineConfig};
pub use constants::*;
pub use errors::{OCRError, OcrResult};
pub use inference::{
    DetectionEngine, DetectorInput, OrtDetectionEngine, OrtInfer, OrtRecognitionEngine,
    RawDetections, RecognitionEngine,
};
pub use traits::{InferenceEngine, TextLineRecognizer};
