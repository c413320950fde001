//! Text line recognition models.

pub mod parseq;

pub use parseq::{ParseqModel, ParseqModelBuilder, ParseqPreprocessConfig};
