//! ONNX Runtime backend for the layout detector.

use super::OrtInfer;
use crate::core::batch::Tensor4D;
use crate::core::config::OrtSessionConfig;
use crate::core::errors::{OCRError, SimpleError};
use crate::core::traits::InferenceEngine;
use ndarray::{Array1, Array2};
use ort::value::TensorRef;
use std::path::Path;

/// Input of the layout detector.
#[derive(Debug, Clone)]
pub struct DetectorInput {
    /// Normalized image, `[1, 3, H, W]`.
    pub image: Tensor4D,
    /// Target size `[H, W]` passed to the model as its second input.
    pub target_size: [i64; 2],
}

/// Raw candidate arrays as the detector returns them, batch axis removed.
///
/// The arrays are not validated here. The detector adapter checks that
/// their lengths agree and that every box has four coordinates.
#[derive(Debug, Clone, Default)]
pub struct RawDetections {
    /// 1-based class labels.
    pub labels: Array1<i64>,
    /// Boxes `[x_min, y_min, x_max, y_max]` in model input pixels.
    pub boxes: Array2<f32>,
    /// Candidate confidences.
    pub scores: Array1<f32>,
    /// Predicted character counts, present when the model has a fourth output.
    pub char_counts: Option<Array1<f32>>,
}

/// The detector seam used by the engine.
pub type DetectionEngine = dyn InferenceEngine<Input = DetectorInput, Output = RawDetections>;

/// Layout detector running on ONNX Runtime.
///
/// The model takes the image and the `[[H, W]]` target size and returns
/// `(labels, boxes, scores[, char_counts])`.
#[derive(Debug)]
pub struct OrtDetectionEngine {
    inner: OrtInfer,
    input_size: (u32, u32),
}

impl OrtDetectionEngine {
    /// Loads the detector model.
    pub fn new(
        model_path: impl AsRef<Path>,
        cfg: &OrtSessionConfig,
        pool_size: usize,
        input_size: (u32, u32),
    ) -> Result<Self, OCRError> {
        let inner = OrtInfer::from_config(model_path, cfg, pool_size)?;
        if inner.input_names().len() < 2 {
            return Err(OCRError::model_load_error(
                inner.model_path(),
                format!(
                    "detector needs an image input and a target size input, model declares {}",
                    inner.input_names().len()
                ),
                None,
                None::<std::io::Error>,
            ));
        }
        Ok(Self { inner, input_size })
    }
}

/// Collapses every leading axis of `shape` into rows.
fn rows_and_width(shape: &[usize]) -> (usize, usize) {
    match shape.split_last() {
        Some((&last, rest)) => (rest.iter().product(), last),
        None => (0, 0),
    }
}

impl InferenceEngine for OrtDetectionEngine {
    type Input = DetectorInput;
    type Output = RawDetections;

    fn infer(&self, input: &DetectorInput) -> Result<RawDetections, OCRError> {
        let input_shape = input.image.shape().to_vec();
        let model_name = self.inner.model_name();
        let target = Array2::from_shape_vec((1, 2), input.target_size.to_vec())?;

        let image_tensor = TensorRef::from_array_view(input.image.view()).map_err(|e| {
            OCRError::model_inference_error(
                model_name,
                "tensor_conversion",
                &input_shape,
                "Failed to convert detector image tensor",
                e,
            )
        })?;
        let size_tensor = TensorRef::from_array_view(target.view()).map_err(|e| {
            OCRError::model_inference_error(
                model_name,
                "tensor_conversion",
                &input_shape,
                "Failed to convert detector target size tensor",
                e,
            )
        })?;

        let names = self.inner.input_names();
        let inputs = ort::inputs![
            names[0].as_str() => image_tensor,
            names[1].as_str() => size_tensor
        ];

        self.inner.with_session(|session| {
            let outputs = session.run(inputs).map_err(|e| {
                OCRError::model_inference_error(
                    model_name,
                    "forward_pass",
                    &input_shape,
                    "ONNX Runtime inference failed for the layout detector",
                    e,
                )
            })?;

            let output_count = self.inner.output_names().len();
            if output_count < 3 {
                return Err(OCRError::model_inference_error(
                    model_name,
                    "output_extraction",
                    &input_shape,
                    &format!("expected 3 or 4 outputs, model declares {output_count}"),
                    SimpleError::new("unexpected detector outputs"),
                ));
            }

            let (_, labels) = self.inner.extract_i64(&outputs, 0, &input_shape)?;
            let (box_shape, boxes) = self.inner.extract_f32(&outputs, 1, &input_shape)?;
            let (_, scores) = self.inner.extract_f32(&outputs, 2, &input_shape)?;
            let char_counts = if output_count >= 4 {
                Some(Array1::from_vec(
                    self.inner.extract_f32(&outputs, 3, &input_shape)?.1,
                ))
            } else {
                None
            };

            let (rows, width) = rows_and_width(&box_shape);
            Ok(RawDetections {
                labels: Array1::from_vec(labels),
                boxes: Array2::from_shape_vec((rows, width), boxes)?,
                scores: Array1::from_vec(scores),
                char_counts,
            })
        })
    }

    fn engine_info(&self) -> String {
        format!(
            "ONNX Runtime layout detector '{}' ({} sessions)",
            self.inner.model_name(),
            self.inner.pool_size()
        )
    }

    fn input_size(&self) -> (u32, u32) {
        self.input_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_and_width_flattens_batch_axis() {
        assert_eq!(rows_and_width(&[1, 300, 4]), (300, 4));
        assert_eq!(rows_and_width(&[300, 4]), (300, 4));
        assert_eq!(rows_and_width(&[1, 0, 4]), (0, 4));
        assert_eq!(rows_and_width(&[]), (0, 0));
    }
}
