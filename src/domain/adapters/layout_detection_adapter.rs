//! Layout Detection Adapter
//!
//! This module adapts the DEIM detector to the page pipeline: it turns the
//! model's candidates into [`DetectedBox`]es carrying a region class and a
//! character-capacity bucket.

use crate::core::config::LayoutDetectionConfig;
use crate::core::inference::DetectionEngine;
use crate::core::OCRError;
use crate::domain::bucketing::{CapacityBucketing, DefaultBucketing};
use crate::domain::line::{DetectedBox, RegionClass};
use crate::models::detection::{DeimModel, DeimModelBuilder, DeimPostprocessConfig};
use image::RgbImage;
use std::sync::Arc;

/// Detector adapter producing the page's detected boxes.
#[derive(Debug)]
pub struct LayoutDetectionAdapter {
    model: DeimModel,
    postprocess_config: DeimPostprocessConfig,
    class_names: Vec<String>,
    bucketing: Arc<dyn CapacityBucketing>,
}

impl LayoutDetectionAdapter {
    /// Creates a new layout detection adapter.
    pub fn new(
        model: DeimModel,
        conf_threshold: f32,
        class_names: Vec<String>,
        bucketing: Arc<dyn CapacityBucketing>,
    ) -> Self {
        Self {
            model,
            postprocess_config: DeimPostprocessConfig { conf_threshold },
            class_names,
            bucketing,
        }
    }

    /// Detects the regions of `image`.
    ///
    /// Returns an empty vector when no candidate clears the confidence threshold.
    ///
    /// # Errors
    ///
    /// Every failure, from inference or from malformed outputs, is reported as
    /// [`OCRError::Detection`].
    pub fn detect(&self, image: &RgbImage) -> Result<Vec<DetectedBox>, OCRError> {
        let (output, scale_info) = self
            .model
            .forward(image, &self.postprocess_config)
            .map_err(|e| match e {
                OCRError::Detection { .. } => e,
                other => OCRError::detection_error("layout detector forward pass", other),
            })?;

        let mut boxes = Vec::with_capacity(output.candidates.len());
        for candidate in output.candidates {
            if candidate.label < 1 {
                return Err(OCRError::malformed_detection(format!(
                    "label {} is not 1-based",
                    candidate.label
                )));
            }
            let class_index = (candidate.label - 1) as usize;
            boxes.push(DetectedBox {
                bounds: candidate.bbox,
                confidence: candidate.score,
                class: RegionClass::from_index(class_index),
                class_name: self.class_names.get(class_index).cloned(),
                pred_char_count: candidate.char_count,
                char_capacity_bucket: self.bucketing.bucket(candidate.char_count),
            });
        }

        tracing::debug!(
            candidates = boxes.len(),
            padded_side = scale_info.padded_side,
            "layout detection finished"
        );
        Ok(boxes)
    }

    /// The confidence threshold in use.
    pub fn conf_threshold(&self) -> f32 {
        self.postprocess_config.conf_threshold
    }
}

/// Builder for the layout detection adapter.
#[derive(Debug, Default)]
pub struct LayoutDetectionAdapterBuilder {
    config: LayoutDetectionConfig,
    class_names: Vec<String>,
    bucketing: Option<Arc<dyn CapacityBucketing>>,
}

impl LayoutDetectionAdapterBuilder {
    /// Creates a new builder with the default detection configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the task configuration.
    pub fn task_config(mut self, config: LayoutDetectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the confidence threshold.
    pub fn conf_threshold(mut self, threshold: f32) -> Self {
        self.config.conf_threshold = threshold;
        self
    }

    /// Sets the names of the detector classes, indexed by 0-based class.
    pub fn class_names(mut self, names: Vec<String>) -> Self {
        self.class_names = names;
        self
    }

    /// Sets the character-capacity bucketing strategy.
    pub fn bucketing(mut self, bucketing: Arc<dyn CapacityBucketing>) -> Self {
        self.bucketing = Some(bucketing);
        self
    }

    /// Builds the adapter around a detector engine.
    pub fn build(self, inference: Arc<DetectionEngine>) -> Result<LayoutDetectionAdapter, OCRError> {
        let (width, height) = self.config.input_size;
        let model = DeimModelBuilder::new()
            .input_size(width, height)
            .build(inference)?;
        let bucketing = self
            .bucketing
            .unwrap_or_else(|| Arc::new(DefaultBucketing));
        Ok(LayoutDetectionAdapter::new(
            model,
            self.config.conf_threshold,
            self.class_names,
            bucketing,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::SimpleError;
    use crate::core::inference::{DetectorInput, RawDetections};
    use crate::core::traits::InferenceEngine;
    use crate::domain::tier::CharCapacityBucket;
    use crate::processors::BoundingBox;
    use image::Rgb;
    use ndarray::{Array1, Array2};

    #[derive(Debug)]
    struct FixedDetector {
        output: Option<RawDetections>,
    }

    impl InferenceEngine for FixedDetector {
        type Input = DetectorInput;
        type Output = RawDetections;

        fn infer(&self, _input: &DetectorInput) -> Result<RawDetections, OCRError> {
            self.output.clone().ok_or_else(|| {
                OCRError::inference_error("fixed", "no output", SimpleError::new("boom"))
            })
        }

        fn engine_info(&self) -> String {
            "fixed detector".to_string()
        }

        fn input_size(&self) -> (u32, u32) {
            (32, 32)
        }
    }

    fn adapter(output: Option<RawDetections>) -> LayoutDetectionAdapter {
        LayoutDetectionAdapterBuilder::new()
            .task_config(LayoutDetectionConfig {
                conf_threshold: 0.25,
                input_size: (32, 32),
            })
            .class_names(vec!["line_main".to_string(), "block_fig".to_string()])
            .build(Arc::new(FixedDetector { output }))
            .unwrap()
    }

    fn page() -> RgbImage {
        RgbImage::from_pixel(64, 32, Rgb([200, 200, 200]))
    }

    #[test]
    fn test_detect_maps_classes_and_buckets() {
        let raw = RawDetections {
            labels: Array1::from_vec(vec![1, 2, 1]),
            boxes: Array2::from_shape_vec(
                (3, 4),
                vec![0.0, 0.0, 10.0, 2.0, 4.0, 4.0, 8.0, 8.0, 1.0, 1.0, 3.0, 16.0],
            )
            .unwrap(),
            scores: Array1::from_vec(vec![0.9, 0.8, 0.5]),
            char_counts: Some(Array1::from_vec(vec![3.0, 1.0, 2.0])),
        };
        let boxes = adapter(Some(raw)).detect(&page()).unwrap();

        assert_eq!(boxes.len(), 3);
        // padded side 64 over input width 32
        assert_eq!(boxes[0].bounds, BoundingBox::new(0, 0, 20, 4));
        assert_eq!(boxes[0].class, RegionClass::TextLine);
        assert_eq!(boxes[0].class_name.as_deref(), Some("line_main"));
        assert_eq!(boxes[0].char_capacity_bucket, CharCapacityBucket::Tiny);
        assert_eq!(boxes[1].class, RegionClass::Layout(1));
        assert_eq!(boxes[1].char_capacity_bucket, CharCapacityBucket::Large);
        assert_eq!(boxes[2].char_capacity_bucket, CharCapacityBucket::Medium);
    }

    #[test]
    fn test_detect_without_survivors_is_empty() {
        let raw = RawDetections {
            labels: Array1::from_vec(vec![1]),
            boxes: Array2::zeros((1, 4)),
            scores: Array1::from_vec(vec![0.1]),
            char_counts: None,
        };
        assert!(adapter(Some(raw)).detect(&page()).unwrap().is_empty());
    }

    #[test]
    fn test_detect_rejects_zero_label() {
        let raw = RawDetections {
            labels: Array1::from_vec(vec![0]),
            boxes: Array2::zeros((1, 4)),
            scores: Array1::from_vec(vec![0.9]),
            char_counts: None,
        };
        let err = adapter(Some(raw)).detect(&page()).unwrap_err();
        assert!(matches!(err, OCRError::Detection { .. }));
    }

    #[test]
    fn test_inference_failure_is_detection_error() {
        let err = adapter(None).detect(&page()).unwrap_err();
        assert!(matches!(err, OCRError::Detection { .. }));
    }

    #[test]
    fn test_missing_char_counts_default_to_large() {
        let raw = RawDetections {
            labels: Array1::from_vec(vec![1]),
            boxes: Array2::from_shape_vec((1, 4), vec![0.0, 0.0, 4.0, 4.0]).unwrap(),
            scores: Array1::from_vec(vec![0.9]),
            char_counts: None,
        };
        let boxes = adapter(Some(raw)).detect(&page()).unwrap();
        assert_eq!(boxes[0].pred_char_count, 100.0);
        assert_eq!(boxes[0].char_capacity_bucket, CharCapacityBucket::Large);
    }
}
