//! Page processing pipeline.
//!
//! [`EngineHandle`] runs detection, line extraction, the recognition cascade and
//! reading-order assembly for one page at a time.

pub mod assembler;
pub mod cascade;
pub mod engine;
pub mod reading_order;
pub mod result;

pub use assembler::{AssembledPage, OrderedLine, assemble};
pub use cascade::{RecognitionCascade, TierRecognizers};
pub use engine::{EngineBuilder, EngineHandle, EngineParts};
pub use reading_order::{DetectionOrder, LineOrder, ReadingOrderResolver, validate_line_orders};
pub use result::{PageResult, TextLineResult};
