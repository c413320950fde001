//! Layout detection models.

pub mod deim;

pub use deim::{
    DeimCandidate, DeimModel, DeimModelBuilder, DeimModelOutput, DeimPostprocessConfig,
    DeimPreprocessConfig, DeimScaleInfo,
};
