//! Engine configuration loaded from a JSON file or built in code.

use super::errors::{ConfigError, ConfigValidator};
use super::onnx::{Device, OrtSessionConfig};
use super::parallel::ParallelPolicy;
use crate::core::constants::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Locations of every model and resource file the engine loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPaths {
    /// Layout detector ONNX model.
    pub detector: PathBuf,
    /// YAML file with the detector's class names.
    pub class_names: Option<PathBuf>,
    /// 30-character recognizer ONNX model.
    pub recognizer_30: PathBuf,
    /// 50-character recognizer ONNX model.
    pub recognizer_50: PathBuf,
    /// 100-character recognizer ONNX model.
    pub recognizer_100: PathBuf,
    /// Character set of the recognizers (YAML `model.charset_train` or one token per line).
    pub charset: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl ModelPaths {
    /// Standard file layout under a model directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detector: dir.join("model/deim-s-1024x1024.onnx"),
            class_names: Some(dir.join("config/ndl.yaml")),
            recognizer_30: dir.join("model/parseq-ndl-16x256-30-tiny-192epoch-tegaki3.onnx"),
            recognizer_50: dir.join("model/parseq-ndl-16x384-50-tiny-146epoch-tegaki2.onnx"),
            recognizer_100: dir.join("model/parseq-ndl-16x768-100-tiny-165epoch-tegaki2.onnx"),
            charset: dir.join("config/NDLmoji.yaml"),
        }
    }
}

impl ConfigValidator for ModelPaths {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_model_path(&self.detector)?;
        self.validate_model_path(&self.recognizer_30)?;
        self.validate_model_path(&self.recognizer_50)?;
        self.validate_model_path(&self.recognizer_100)?;
        self.validate_model_path(&self.charset)?;
        if let Some(names) = &self.class_names {
            self.validate_model_path(names)?;
        }
        Ok(())
    }
}

/// Layout detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutDetectionConfig {
    /// Candidates scoring at or below this value are dropped.
    pub conf_threshold: f32,
    /// Model input resolution (width, height).
    pub input_size: (u32, u32),
}

impl Default for LayoutDetectionConfig {
    fn default() -> Self {
        Self {
            conf_threshold: DEFAULT_DETECTION_CONF_THRESHOLD,
            input_size: DEFAULT_DETECTION_INPUT_SIZE,
        }
    }
}

impl ConfigValidator for LayoutDetectionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_confidence_threshold(self.conf_threshold)?;
        self.validate_image_dimensions(self.input_size.0, self.input_size.1)
    }
}

/// Recognizer settings shared by the three tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Input size (width, height) of the 30-character model.
    pub input_size_30: (u32, u32),
    /// Input size (width, height) of the 50-character model.
    pub input_size_50: (u32, u32),
    /// Input size (width, height) of the 100-character model.
    pub input_size_100: (u32, u32),
    /// Token ids forced to `-inf` before decoding. Derived from the charset when unset.
    pub suppressed_tokens: Option<Vec<usize>>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            input_size_30: DEFAULT_REC_INPUT_SIZE_30,
            input_size_50: DEFAULT_REC_INPUT_SIZE_50,
            input_size_100: DEFAULT_REC_INPUT_SIZE_100,
            suppressed_tokens: None,
        }
    }
}

impl ConfigValidator for RecognitionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (w, h) in [self.input_size_30, self.input_size_50, self.input_size_100] {
            self.validate_image_dimensions(w, h)?;
        }
        let suppresses_eos = self
            .suppressed_tokens
            .as_ref()
            .is_some_and(|tokens| tokens.contains(&0));
        if suppresses_eos {
            return Err(ConfigError::InvalidConfig {
                message: "token 0 is the end-of-sequence token and cannot be suppressed".into(),
            });
        }
        Ok(())
    }
}

/// Whether wide lines that still overflow the largest tier are bisected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitOverflowPolicy {
    /// Keep the 100-character result as is.
    #[default]
    Disabled,
    /// Re-recognize both halves of a wide overflowing line and concatenate them.
    Enabled,
}

/// How lines are routed to tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeMode {
    /// Route by character-capacity bucket and promote over-length results.
    #[default]
    Cascade,
    /// Send every line to the 100-character tier.
    LargeOnly,
}

/// Recognition cascade thresholds and policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Routing mode.
    pub mode: CascadeMode,
    /// 30-character results at least this long move to the 50-character tier.
    pub tiny_promotion_threshold: usize,
    /// 50-character results at least this long move to the 100-character tier.
    pub medium_promotion_threshold: usize,
    /// 100-character results at least this long are candidates for splitting.
    pub split_threshold: usize,
    /// Split policy for overflowing wide lines.
    pub split_overflow: SplitOverflowPolicy,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            mode: CascadeMode::default(),
            tiny_promotion_threshold: DEFAULT_TINY_PROMOTION_THRESHOLD,
            medium_promotion_threshold: DEFAULT_MEDIUM_PROMOTION_THRESHOLD,
            split_threshold: DEFAULT_SPLIT_THRESHOLD,
            split_overflow: SplitOverflowPolicy::default(),
        }
    }
}

impl CascadeConfig {
    /// Sets the routing mode.
    pub fn with_mode(mut self, mode: CascadeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the split policy.
    pub fn with_split_overflow(mut self, policy: SplitOverflowPolicy) -> Self {
        self.split_overflow = policy;
        self
    }
}

impl ConfigValidator for CascadeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_positive_usize(self.tiny_promotion_threshold, "tiny_promotion_threshold")?;
        self.validate_positive_usize(
            self.medium_promotion_threshold,
            "medium_promotion_threshold",
        )?;
        self.validate_positive_usize(self.split_threshold, "split_threshold")
    }
}

/// Complete configuration of an engine handle.
///
/// Every section has defaults, so a JSON file only needs the fields it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Model and resource files.
    pub models: ModelPaths,
    /// Layout detector settings.
    pub detection: LayoutDetectionConfig,
    /// Recognizer settings.
    pub recognition: RecognitionConfig,
    /// Cascade thresholds and policies.
    pub cascade: CascadeConfig,
    /// Worker pool and session pool sizes.
    pub parallel: ParallelPolicy,
    /// ONNX Runtime session settings applied to every model.
    pub ort_session: OrtSessionConfig,
    /// Compute device.
    pub device: Device,
    /// Run at most one page pipeline at a time.
    pub serialize_pages: bool,
}

impl EngineConfig {
    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Validates every section except the model files.
    pub fn validate_settings(&self) -> Result<(), ConfigError> {
        self.detection.validate()?;
        self.recognition.validate()?;
        self.cascade.validate()?;
        if let Some(threads) = self.parallel.max_threads {
            self.validate_thread_count(threads)?;
        }
        Ok(())
    }
}

impl ConfigValidator for EngineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_settings()?;
        self.models.validate()
    }
}
