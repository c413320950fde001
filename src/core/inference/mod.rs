//! Structures and helpers for ONNX Runtime inference.
//!
//! [`OrtInfer`] owns a small pool of sessions for one model file. The detector
//! and recognizer engines wrap it and adapt it to the [`InferenceEngine`] seam.
//!
//! [`InferenceEngine`]: crate::core::traits::InferenceEngine

pub mod detection;
mod ort_infer_config;
pub mod recognition;

pub use detection::{DetectionEngine, DetectorInput, OrtDetectionEngine, RawDetections};
pub use recognition::{OrtRecognitionEngine, RecognitionEngine};

use crate::core::config::OrtSessionConfig;
use crate::core::errors::{OCRError, SimpleError};
use ort::session::Session;
use ort::session::SessionOutputs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A round-robin pool of ONNX Runtime sessions for one model.
///
/// `Session::run` needs exclusive access, so each session sits behind its own
/// mutex. A pool of one serializes every call to the model.
pub struct OrtInfer {
    sessions: Vec<Mutex<Session>>,
    next_idx: AtomicUsize,
    input_names: Vec<String>,
    output_names: Vec<String>,
    model_path: PathBuf,
    model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("sessions", &self.sessions.len())
            .field("input_names", &self.input_names)
            .field("output_names", &self.output_names)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Loads `pool_size` sessions of the model at `model_path`.
    pub fn from_config(
        model_path: impl AsRef<Path>,
        cfg: &OrtSessionConfig,
        pool_size: usize,
    ) -> Result<Self, OCRError> {
        let path = model_path.as_ref();
        if !path.is_file() {
            return Err(OCRError::model_load_error(
                path,
                "model file not found",
                Some("check the model paths in the engine configuration"),
                None::<std::io::Error>,
            ));
        }

        let pool_size = pool_size.max(1);
        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let builder = Self::apply_ort_config(Session::builder()?, cfg)?;
            let session = builder.commit_from_file(path).map_err(|e| {
                OCRError::model_load_error(
                    path,
                    "failed to create ONNX session",
                    Some("check device/EP configuration and model file"),
                    Some(e),
                )
            })?;
            sessions.push(Mutex::new(session));
        }

        let (input_names, output_names) = match sessions.first().map(|s| s.lock()) {
            Some(Ok(session)) => (
                session.inputs.iter().map(|i| i.name.clone()).collect(),
                session.outputs.iter().map(|o| o.name.clone()).collect(),
            ),
            _ => (Vec::new(), Vec::new()),
        };

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        tracing::debug!(
            model = %model_name,
            sessions = pool_size,
            inputs = ?input_names,
            outputs = ?output_names,
            "loaded ONNX model"
        );

        Ok(Self {
            sessions,
            next_idx: AtomicUsize::new(0),
            input_names,
            output_names,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    /// Returns the model name associated with this inference engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the model path associated with this inference engine.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Declared input names, in model order.
    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    /// Declared output names, in model order.
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// Number of sessions in the pool.
    pub fn pool_size(&self) -> usize {
        self.sessions.len()
    }

    /// Runs `f` with exclusive access to the next session of the pool.
    pub(crate) fn with_session<T>(
        &self,
        f: impl FnOnce(&mut Session) -> Result<T, OCRError>,
    ) -> Result<T, OCRError> {
        let idx = self.next_idx.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        let mut guard = self.sessions[idx].lock().map_err(|_| {
            OCRError::inference_error(
                &self.model_name,
                &format!(
                    "Failed to acquire session lock for session {}/{}",
                    idx,
                    self.sessions.len()
                ),
                SimpleError::new("Session lock acquisition failed"),
            )
        })?;
        f(&mut guard)
    }

    /// Copies the f32 output at `index` out of the session outputs.
    pub(crate) fn extract_f32(
        &self,
        outputs: &SessionOutputs<'_>,
        index: usize,
        input_shape: &[usize],
    ) -> Result<(Vec<usize>, Vec<f32>), OCRError> {
        let name = self.output_name(index, input_shape)?;
        let (shape, data) = outputs[name].try_extract_tensor::<f32>().map_err(|e| {
            OCRError::model_inference_error(
                &self.model_name,
                "output_extraction",
                input_shape,
                &format!("Failed to extract output tensor '{}' as f32", name),
                e,
            )
        })?;
        Ok((shape.iter().map(|&d| d as usize).collect(), data.to_vec()))
    }

    /// Copies the integer output at `index`, accepting i64 or f32 element types.
    pub(crate) fn extract_i64(
        &self,
        outputs: &SessionOutputs<'_>,
        index: usize,
        input_shape: &[usize],
    ) -> Result<(Vec<usize>, Vec<i64>), OCRError> {
        let name = self.output_name(index, input_shape)?;
        if let Ok((shape, data)) = outputs[name].try_extract_tensor::<i64>() {
            return Ok((shape.iter().map(|&d| d as usize).collect(), data.to_vec()));
        }
        let (shape, data) = self.extract_f32(outputs, index, input_shape)?;
        Ok((shape, data.into_iter().map(|v| v as i64).collect()))
    }

    fn output_name(&self, index: usize, input_shape: &[usize]) -> Result<&str, OCRError> {
        self.output_names
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| {
                OCRError::model_inference_error(
                    &self.model_name,
                    "output_extraction",
                    input_shape,
                    &format!(
                        "model declares {} outputs, output {} requested",
                        self.output_names.len(),
                        index
                    ),
                    SimpleError::new("missing output tensor"),
                )
            })
    }
}
