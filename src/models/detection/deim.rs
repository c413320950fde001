//! DEIM Layout Detection Model
//!
//! This module provides a pure implementation of the DEIM layout detector used for
//! historical documents. Besides boxes, labels and scores, the model may predict a
//! character count per box, which drives the recognition cascade.
//!
//! The model is independent of any specific task and can be reused in different contexts.

use crate::core::constants::{DEFAULT_DETECTION_INPUT_SIZE, DEFAULT_PRED_CHAR_COUNT};
use crate::core::inference::{DetectionEngine, DetectorInput, RawDetections};
use crate::core::OCRError;
use crate::processors::{BoundingBox, NormalizeImage};
use crate::utils::{pad_to_square, resize_rgb};
use image::RgbImage;
use std::sync::Arc;

/// Preprocessing configuration for the DEIM model.
#[derive(Debug, Clone)]
pub struct DeimPreprocessConfig {
    /// Model input resolution (width, height)
    pub input_size: (u32, u32),
}

impl Default for DeimPreprocessConfig {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_DETECTION_INPUT_SIZE,
        }
    }
}

/// Postprocessing configuration for the DEIM model.
#[derive(Debug, Clone)]
pub struct DeimPostprocessConfig {
    /// Candidates scoring at or below this value are dropped.
    pub conf_threshold: f32,
}

/// A candidate that passed the confidence filter, in source-image pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DeimCandidate {
    /// 1-based model label.
    pub label: i64,
    pub bbox: BoundingBox,
    pub score: f32,
    pub char_count: f32,
}

/// Output from the DEIM model.
#[derive(Debug, Clone, Default)]
pub struct DeimModelOutput {
    pub candidates: Vec<DeimCandidate>,
}

/// Geometry recorded during preprocessing, needed to map boxes back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeimScaleInfo {
    /// Side of the square the source image was padded to.
    pub padded_side: u32,
    /// Factor from model input pixels to source pixels.
    pub scale: f32,
}

/// DEIM layout detection model.
///
/// This is a pure model implementation that handles:
/// - Preprocessing: square padding, resizing and ImageNet normalization
/// - Inference: running the detector engine
/// - Postprocessing: output validation, confidence filtering and rescaling
#[derive(Debug)]
pub struct DeimModel {
    inference: Arc<DetectionEngine>,
    normalizer: NormalizeImage,
    preprocess_config: DeimPreprocessConfig,
}

impl DeimModel {
    /// Creates a new DEIM model.
    pub fn new(
        inference: Arc<DetectionEngine>,
        preprocess_config: DeimPreprocessConfig,
    ) -> Result<Self, OCRError> {
        let (width, height) = preprocess_config.input_size;
        if width == 0 || height == 0 {
            return Err(OCRError::invalid_field(
                "detection.input_size",
                "non-zero width and height",
                format!("{width}x{height}"),
            ));
        }
        Ok(Self {
            inference,
            normalizer: NormalizeImage::imagenet_rgb()?,
            preprocess_config,
        })
    }

    /// Model input resolution (width, height).
    pub fn input_size(&self) -> (u32, u32) {
        self.preprocess_config.input_size
    }

    /// Pads the image to a square, resizes it to the input resolution and normalizes it.
    pub fn preprocess(&self, image: &RgbImage) -> Result<(DetectorInput, DeimScaleInfo), OCRError> {
        let (width, height) = self.preprocess_config.input_size;
        let padded = pad_to_square(image);
        let padded_side = padded.width();
        if padded_side == 0 {
            return Err(OCRError::invalid_input("cannot detect lines on an empty image"));
        }

        let resized = resize_rgb(&padded, width, height)?;
        let tensor = self.normalizer.normalize_to(&resized)?;

        let input = DetectorInput {
            image: tensor,
            target_size: [height as i64, width as i64],
        };
        let scale_info = DeimScaleInfo {
            padded_side,
            scale: padded_side as f32 / width as f32,
        };
        Ok((input, scale_info))
    }

    /// Runs the detector engine.
    pub fn infer(&self, input: &DetectorInput) -> Result<RawDetections, OCRError> {
        self.inference.infer(input)
    }

    /// Validates the raw outputs, drops low-scoring candidates and rescales the rest.
    pub fn postprocess(
        &self,
        raw: RawDetections,
        scale_info: DeimScaleInfo,
        config: &DeimPostprocessConfig,
    ) -> Result<DeimModelOutput, OCRError> {
        let count = raw.labels.len();
        if raw.scores.len() != count || raw.boxes.nrows() != count {
            return Err(OCRError::malformed_detection(format!(
                "{} labels, {} boxes and {} scores",
                count,
                raw.boxes.nrows(),
                raw.scores.len()
            )));
        }
        if count > 0 && raw.boxes.ncols() != 4 {
            return Err(OCRError::malformed_detection(format!(
                "boxes have {} coordinates, expected 4",
                raw.boxes.ncols()
            )));
        }
        if let Some(char_counts) = &raw.char_counts {
            if char_counts.len() != count {
                return Err(OCRError::malformed_detection(format!(
                    "{} char counts for {} candidates",
                    char_counts.len(),
                    count
                )));
            }
        }

        let mut candidates = Vec::new();
        for (i, &score) in raw.scores.iter().enumerate() {
            // NaN scores never pass.
            if score.partial_cmp(&config.conf_threshold) != Some(std::cmp::Ordering::Greater) {
                continue;
            }
            let row = raw.boxes.row(i);
            let bbox = BoundingBox::from_scaled([row[0], row[1], row[2], row[3]], scale_info.scale);
            let char_count = raw
                .char_counts
                .as_ref()
                .map_or(DEFAULT_PRED_CHAR_COUNT, |counts| counts[i]);
            candidates.push(DeimCandidate {
                label: raw.labels[i],
                bbox,
                score,
                char_count,
            });
        }

        Ok(DeimModelOutput { candidates })
    }

    /// Runs the complete forward pass: preprocess -> infer -> postprocess.
    pub fn forward(
        &self,
        image: &RgbImage,
        config: &DeimPostprocessConfig,
    ) -> Result<(DeimModelOutput, DeimScaleInfo), OCRError> {
        let (input, scale_info) = self.preprocess(image)?;
        let raw = self.infer(&input)?;
        let output = self.postprocess(raw, scale_info, config)?;
        Ok((output, scale_info))
    }
}

/// Builder for the DEIM model.
#[derive(Debug, Default)]
pub struct DeimModelBuilder {
    preprocess_config: Option<DeimPreprocessConfig>,
}

impl DeimModelBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the preprocessing configuration.
    pub fn preprocess_config(mut self, config: DeimPreprocessConfig) -> Self {
        self.preprocess_config = Some(config);
        self
    }

    /// Sets the model input resolution.
    pub fn input_size(mut self, width: u32, height: u32) -> Self {
        let mut config = self.preprocess_config.unwrap_or_default();
        config.input_size = (width, height);
        self.preprocess_config = Some(config);
        self
    }

    /// Builds the DEIM model.
    pub fn build(self, inference: Arc<DetectionEngine>) -> Result<DeimModel, OCRError> {
        DeimModel::new(inference, self.preprocess_config.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::InferenceEngine;
    use image::Rgb;
    use ndarray::{Array1, Array2};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingDetector {
        seen: Mutex<Vec<(Vec<usize>, [i64; 2])>>,
    }

    impl InferenceEngine for RecordingDetector {
        type Input = DetectorInput;
        type Output = RawDetections;

        fn infer(&self, input: &DetectorInput) -> Result<RawDetections, OCRError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push((input.image.shape().to_vec(), input.target_size));
            }
            Ok(RawDetections::default())
        }

        fn engine_info(&self) -> String {
            "recording detector".to_string()
        }

        fn input_size(&self) -> (u32, u32) {
            (64, 64)
        }
    }

    fn model_with(engine: Arc<DetectionEngine>) -> DeimModel {
        DeimModelBuilder::new()
            .input_size(64, 64)
            .build(engine)
            .unwrap()
    }

    fn raw(scores: Vec<f32>, boxes: Vec<[f32; 4]>) -> RawDetections {
        let n = scores.len();
        RawDetections {
            labels: Array1::from_elem(n, 1),
            boxes: Array2::from_shape_vec((boxes.len(), 4), boxes.concat()).unwrap(),
            scores: Array1::from_vec(scores),
            char_counts: None,
        }
    }

    #[test]
    fn test_preprocess_pads_and_resizes() {
        let engine = Arc::new(RecordingDetector::default());
        let model = model_with(engine.clone());
        let image = RgbImage::from_pixel(200, 100, Rgb([255, 255, 255]));

        let (_, scale) = model.forward(&image, &DeimPostprocessConfig { conf_threshold: 0.25 }).unwrap();

        assert_eq!(scale.padded_side, 200);
        assert!((scale.scale - 200.0 / 64.0).abs() < 1e-6);
        let seen = engine.seen.lock().unwrap();
        assert_eq!(seen[0].0, vec![1, 3, 64, 64]);
        assert_eq!(seen[0].1, [64, 64]);
    }

    #[test]
    fn test_postprocess_threshold_is_strict() {
        let model = model_with(Arc::new(RecordingDetector::default()));
        let scale = DeimScaleInfo { padded_side: 128, scale: 2.0 };
        let output = model
            .postprocess(
                raw(vec![0.25, 0.26], vec![[1.0, 2.0, 3.0, 4.0], [1.4, 2.6, 10.2, 20.9]]),
                scale,
                &DeimPostprocessConfig { conf_threshold: 0.25 },
            )
            .unwrap();

        assert_eq!(output.candidates.len(), 1);
        let candidate = &output.candidates[0];
        assert_eq!(candidate.bbox, BoundingBox::new(2, 5, 20, 41));
        assert_eq!(candidate.char_count, DEFAULT_PRED_CHAR_COUNT);

        let output = model
            .postprocess(
                raw(vec![f32::NAN], vec![[1.0, 2.0, 3.0, 4.0]]),
                scale,
                &DeimPostprocessConfig { conf_threshold: 0.25 },
            )
            .unwrap();
        assert!(output.candidates.is_empty());
    }

    #[test]
    fn test_postprocess_rejects_mismatched_outputs() {
        let model = model_with(Arc::new(RecordingDetector::default()));
        let scale = DeimScaleInfo { padded_side: 64, scale: 1.0 };
        let mut detections = raw(vec![0.9, 0.8], vec![[0.0, 0.0, 1.0, 1.0], [0.0, 0.0, 2.0, 2.0]]);
        detections.scores = Array1::from_vec(vec![0.9]);

        let err = model
            .postprocess(detections, scale, &DeimPostprocessConfig { conf_threshold: 0.25 })
            .unwrap_err();
        assert!(matches!(err, OCRError::Detection { .. }));
    }

    #[test]
    fn test_postprocess_rejects_wrong_box_width() {
        let model = model_with(Arc::new(RecordingDetector::default()));
        let scale = DeimScaleInfo { padded_side: 64, scale: 1.0 };
        let detections = RawDetections {
            labels: Array1::from_vec(vec![1]),
            boxes: Array2::zeros((1, 5)),
            scores: Array1::from_vec(vec![0.9]),
            char_counts: None,
        };

        let err = model
            .postprocess(detections, scale, &DeimPostprocessConfig { conf_threshold: 0.25 })
            .unwrap_err();
        assert!(matches!(err, OCRError::Detection { .. }));
    }
}
