//! Pure model implementations: preprocessing, inference and postprocessing.

pub mod detection;
pub mod recognition;
