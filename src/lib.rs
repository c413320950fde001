//! # koten-ocr
//!
//! OCR for historical Japanese documents. A page goes through four stages:
//!
//! 1. **Layout detection**: a DEIM detector finds text lines and other layout
//!    regions, and predicts how many characters each line holds.
//! 2. **Line extraction**: every text line is cropped from the page.
//! 3. **Cascaded recognition**: lines are read by PARSeq recognizers of 30, 50
//!    and 100 characters. A line that fills a small recognizer is re-read by
//!    the next larger one.
//! 4. **Reading-order assembly**: lines are ordered and grouped into blocks;
//!    pages written mostly in vertical lines have their blocks reversed.
//!
//! ## Modules
//!
//! * [`core`] - Configuration, errors, constants, inference seams and the ONNX Runtime backend
//! * [`domain`] - Detections, line crops, tiers and the detector adapter
//! * [`models`] - DEIM and PARSeq model implementations
//! * [`processors`] - Geometry, normalization and token decoding
//! * [`pipeline`] - The recognition cascade, reading order and [`pipeline::EngineHandle`]
//! * [`utils`] - Image helpers, charset loading and logging setup
//!
//! ## Example
//!
//! ```no_run
//! use koten_ocr::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig {
//!     models: ModelPaths::in_dir("/opt/koten"),
//!     ..EngineConfig::default()
//! };
//! let engine = EngineHandle::from_config(config)?;
//!
//! let page = engine.process_path("page.jpg")?;
//! for line in &page.lines {
//!     println!("{} {:?}", line.text, line.bounding_box);
//! }
//! println!("{}", page.text());
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod models;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::config::{
        CascadeConfig, CascadeMode, Device, EngineConfig, ModelPaths, SplitOverflowPolicy,
    };
    pub use crate::core::{OCRError, OcrResult};
    pub use crate::domain::{CharCapacityBucket, DetectedBox, RecognitionResult, Tier};
    pub use crate::pipeline::{
        AssembledPage, EngineBuilder, EngineHandle, PageResult, TextLineResult,
    };
    pub use crate::utils::load_image;
}
