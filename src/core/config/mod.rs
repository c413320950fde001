//! Configuration management for the OCR engine.
//!
//! This module provides configuration types, validation traits, and utilities
//! for managing engine configurations.

pub mod engine;
pub mod errors;
pub mod onnx;
pub mod parallel;

// Re-export commonly used types
pub use engine::{
    CascadeConfig, CascadeMode, EngineConfig, LayoutDetectionConfig, ModelPaths,
    RecognitionConfig, SplitOverflowPolicy,
};
pub use errors::{ConfigError, ConfigValidator};
pub use onnx::*;
pub use parallel::ParallelPolicy;
