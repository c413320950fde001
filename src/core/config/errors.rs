//! Configuration errors and the field checks shared by every config section.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Upper bound on the worker pool size accepted from a config file or flag.
const MAX_WORKER_THREADS: usize = 256;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// A model, charset or class-names file is missing.
    #[error("model file does not exist: {path}")]
    ModelPathNotFound { path: PathBuf },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("failed to parse configuration file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Validation of one section of the engine configuration.
///
/// Sections implement [`validate`](ConfigValidator::validate) and compose it
/// from the provided checks.
pub trait ConfigValidator {
    fn validate(&self) -> Result<(), ConfigError>;

    /// The path must name an existing regular file.
    fn validate_model_path(&self, path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ModelPathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(ConfigError::invalid(format!(
                "{} is a directory, expected a model file",
                path.display()
            )));
        }
        Ok(())
    }

    /// Model input sizes are `(width, height)` and both must be non-zero.
    fn validate_image_dimensions(&self, width: u32, height: u32) -> Result<(), ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::invalid(format!(
                "model input size {width}x{height} has a zero side"
            )));
        }
        Ok(())
    }

    fn validate_confidence_threshold(&self, threshold: f32) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::invalid(format!(
                "detector conf_threshold {threshold} is outside [0, 1]"
            )));
        }
        Ok(())
    }

    fn validate_thread_count(&self, threads: usize) -> Result<(), ConfigError> {
        if threads == 0 || threads > MAX_WORKER_THREADS {
            return Err(ConfigError::invalid(format!(
                "max_threads {threads} is outside 1..={MAX_WORKER_THREADS}"
            )));
        }
        Ok(())
    }

    fn validate_positive_usize(&self, value: usize, field: &str) -> Result<(), ConfigError> {
        if value == 0 {
            return Err(ConfigError::invalid(format!("{field} must be at least 1")));
        }
        Ok(())
    }
}
