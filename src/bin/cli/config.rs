//! Engine configuration from command line flags.

use clap::Args;
use koten_ocr::core::config::{
    CascadeMode, Device, EngineConfig, ModelPaths, SplitOverflowPolicy,
};
use std::path::PathBuf;

/// Flags shared by every command that builds an engine.
///
/// Flags override the values of the `--config` file.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// JSON engine configuration file
    #[arg(long, env = "KOTEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding `model/` and `config/` with the standard file names
    #[arg(long = "model-dir", env = "KOTEN_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Path to the layout detection model
    #[arg(long = "det-model", env = "KOTEN_DET_MODEL")]
    pub det_model: Option<PathBuf>,

    /// Path to the detector class names (YAML)
    #[arg(long = "class-names", env = "KOTEN_CLASS_NAMES")]
    pub class_names: Option<PathBuf>,

    /// Path to the 30-character recognition model
    #[arg(long = "rec-model-30", env = "KOTEN_REC_MODEL_30")]
    pub rec_model_30: Option<PathBuf>,

    /// Path to the 50-character recognition model
    #[arg(long = "rec-model-50", env = "KOTEN_REC_MODEL_50")]
    pub rec_model_50: Option<PathBuf>,

    /// Path to the 100-character recognition model
    #[arg(long = "rec-model-100", env = "KOTEN_REC_MODEL_100")]
    pub rec_model_100: Option<PathBuf>,

    /// Path to the recognizer charset (YAML or one token per line)
    #[arg(long, env = "KOTEN_CHARSET")]
    pub charset: Option<PathBuf>,

    /// Device to use (cpu, cuda)
    #[arg(long, env = "KOTEN_DEVICE")]
    pub device: Option<String>,

    /// Number of worker threads (defaults to number of CPUs)
    #[arg(long, env = "KOTEN_WORKERS")]
    pub workers: Option<usize>,

    /// Detection confidence threshold
    #[arg(long = "det-threshold")]
    pub det_threshold: Option<f32>,

    /// Read every line with the 100-character recognizer only
    #[arg(long = "simple-mode")]
    pub simple_mode: bool,

    /// Split wide lines that overflow the 100-character recognizer
    #[arg(long = "split-overflow")]
    pub split_overflow: bool,
}

/// Builds the engine configuration: file (or defaults), then model
/// directory, then individual flags.
pub fn build_engine_config(
    args: &EngineArgs,
) -> Result<EngineConfig, Box<dyn std::error::Error + Send + Sync>> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };

    if let Some(dir) = &args.model_dir {
        config.models = ModelPaths::in_dir(dir);
    }
    let models = &mut config.models;
    if let Some(path) = &args.det_model {
        models.detector = path.clone();
    }
    if let Some(path) = &args.class_names {
        models.class_names = Some(path.clone());
    }
    if let Some(path) = &args.rec_model_30 {
        models.recognizer_30 = path.clone();
    }
    if let Some(path) = &args.rec_model_50 {
        models.recognizer_50 = path.clone();
    }
    if let Some(path) = &args.rec_model_100 {
        models.recognizer_100 = path.clone();
    }
    if let Some(path) = &args.charset {
        models.charset = path.clone();
    }

    if let Some(device) = &args.device {
        config.device = device.parse::<Device>()?;
    }
    if let Some(workers) = args.workers {
        config.parallel.max_threads = Some(workers);
    }
    if let Some(threshold) = args.det_threshold {
        config.detection.conf_threshold = threshold;
    }
    if args.simple_mode {
        config.cascade.mode = CascadeMode::LargeOnly;
    }
    if args.split_overflow {
        config.cascade.split_overflow = SplitOverflowPolicy::Enabled;
    }

    Ok(config)
}
