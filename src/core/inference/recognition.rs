//! ONNX Runtime backend for the line recognizers.

use super::OrtInfer;
use crate::core::batch::{Tensor3D, Tensor4D};
use crate::core::config::OrtSessionConfig;
use crate::core::errors::OCRError;
use crate::core::traits::InferenceEngine;
use ort::value::TensorRef;
use std::path::Path;

/// The recognizer seam: a `[1, 3, H, W]` line image to `[1, seq_len, vocab]` logits.
pub type RecognitionEngine = dyn InferenceEngine<Input = Tensor4D, Output = Tensor3D>;

/// Line recognizer running on ONNX Runtime.
#[derive(Debug)]
pub struct OrtRecognitionEngine {
    inner: OrtInfer,
    input_size: (u32, u32),
}

impl OrtRecognitionEngine {
    /// Loads the recognizer model.
    pub fn new(
        model_path: impl AsRef<Path>,
        cfg: &OrtSessionConfig,
        pool_size: usize,
        input_size: (u32, u32),
    ) -> Result<Self, OCRError> {
        Ok(Self {
            inner: OrtInfer::from_config(model_path, cfg, pool_size)?,
            input_size,
        })
    }
}

impl InferenceEngine for OrtRecognitionEngine {
    type Input = Tensor4D;
    type Output = Tensor3D;

    fn infer(&self, input: &Tensor4D) -> Result<Tensor3D, OCRError> {
        let input_shape = input.shape().to_vec();
        let model_name = self.inner.model_name();
        let input_name = self.inner.input_names().first().cloned().ok_or_else(|| {
            OCRError::invalid_input(format!("model '{model_name}' declares no inputs"))
        })?;

        let input_tensor = TensorRef::from_array_view(input.view()).map_err(|e| {
            OCRError::model_inference_error(
                model_name,
                "tensor_conversion",
                &input_shape,
                &format!(
                    "Failed to convert input tensor with shape {:?}",
                    input_shape
                ),
                e,
            )
        })?;
        let inputs = ort::inputs![input_name.as_str() => input_tensor];

        self.inner.with_session(|session| {
            let outputs = session.run(inputs).map_err(|e| {
                OCRError::model_inference_error(
                    model_name,
                    "forward_pass",
                    &input_shape,
                    &format!("ONNX Runtime inference failed with input '{}'", input_name),
                    e,
                )
            })?;
            let (shape, data) = self.inner.extract_f32(&outputs, 0, &input_shape)?;
            let dims = match shape.as_slice() {
                [b, s, v] => (*b, *s, *v),
                [s, v] => (1, *s, *v),
                other => {
                    return Err(OCRError::decode_error(format!(
                        "recognizer '{model_name}' returned logits of shape {other:?}"
                    )));
                }
            };
            Ok(Tensor3D::from_shape_vec(dims, data)?)
        })
    }

    fn engine_info(&self) -> String {
        format!(
            "ONNX Runtime recognizer '{}' ({} sessions)",
            self.inner.model_name(),
            self.inner.pool_size()
        )
    }

    fn input_size(&self) -> (u32, u32) {
        self.input_size
    }
}
