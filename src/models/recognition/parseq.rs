//! PARSeq Text Line Recognition Model
//!
//! This module provides a pure implementation of the PARSeq line recognizer.
//! Each capacity tier of the cascade owns one instance, differing only in the
//! input width of its model.

use crate::core::inference::RecognitionEngine;
use crate::core::traits::TextLineRecognizer;
use crate::core::{OCRError, Tensor3D, Tensor4D};
use crate::processors::{NormalizeImage, TokenDecoder};
use crate::utils::resize_rgb;
use image::{RgbImage, imageops};
use std::sync::Arc;

/// Preprocessing configuration for the PARSeq model.
#[derive(Debug, Clone)]
pub struct ParseqPreprocessConfig {
    /// Model input size (width, height)
    pub input_size: (u32, u32),
}

/// PARSeq line recognition model.
///
/// - Preprocessing: vertical lines are rotated upright (90 degrees counter-clockwise),
///   then resized to the input size and normalized to `[-1, 1]` BGR
/// - Inference: running the recognizer engine
/// - Postprocessing: greedy token decoding
#[derive(Debug)]
pub struct ParseqModel {
    name: String,
    inference: Arc<RecognitionEngine>,
    normalizer: NormalizeImage,
    decoder: Arc<TokenDecoder>,
    preprocess_config: ParseqPreprocessConfig,
}

impl ParseqModel {
    /// Creates a new PARSeq model.
    pub fn new(
        name: impl Into<String>,
        inference: Arc<RecognitionEngine>,
        decoder: Arc<TokenDecoder>,
        preprocess_config: ParseqPreprocessConfig,
    ) -> Result<Self, OCRError> {
        let (width, height) = preprocess_config.input_size;
        if width == 0 || height == 0 {
            return Err(OCRError::invalid_field(
                "recognition.input_size",
                "non-zero width and height",
                format!("{width}x{height}"),
            ));
        }
        Ok(Self {
            name: name.into(),
            inference,
            normalizer: NormalizeImage::for_ocr_recognition()?,
            decoder,
            preprocess_config,
        })
    }

    /// Rotates, resizes and normalizes one line crop.
    pub fn preprocess(&self, line: &RgbImage) -> Result<Tensor4D, OCRError> {
        let (width, height) = self.preprocess_config.input_size;
        let upright;
        let source = if line.height() > line.width() {
            upright = imageops::rotate270(line);
            &upright
        } else {
            line
        };
        let resized = resize_rgb(source, width, height)?;
        self.normalizer.normalize_to(&resized)
    }

    /// Runs the recognizer engine.
    pub fn infer(&self, input: &Tensor4D) -> Result<Tensor3D, OCRError> {
        self.inference.infer(input)
    }

    /// Decodes the logits into text.
    pub fn postprocess(&self, logits: &Tensor3D) -> Result<String, OCRError> {
        self.decoder.decode(logits.view().into_dyn())
    }

    /// Runs the complete forward pass: preprocess -> infer -> postprocess.
    pub fn forward(&self, line: &RgbImage) -> Result<String, OCRError> {
        let input = self.preprocess(line)?;
        let logits = self.infer(&input)?;
        self.postprocess(&logits)
    }
}

impl TextLineRecognizer for ParseqModel {
    fn recognize(&self, line: &RgbImage) -> Result<String, OCRError> {
        self.forward(line)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Builder for the PARSeq model.
#[derive(Debug, Default)]
pub struct ParseqModelBuilder {
    name: Option<String>,
    input_size: Option<(u32, u32)>,
}

impl ParseqModelBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name used in logs.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the model input size.
    pub fn input_size(mut self, width: u32, height: u32) -> Self {
        self.input_size = Some((width, height));
        self
    }

    /// Builds the model. Without an explicit input size the engine's own is used.
    pub fn build(
        self,
        inference: Arc<RecognitionEngine>,
        decoder: Arc<TokenDecoder>,
    ) -> Result<ParseqModel, OCRError> {
        let input_size = self.input_size.unwrap_or_else(|| inference.input_size());
        let name = self.name.unwrap_or_else(|| "parseq".to_string());
        ParseqModel::new(name, inference, decoder, ParseqPreprocessConfig { input_size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::InferenceEngine;
    use image::Rgb;
    use std::sync::Mutex;

    /// Emits a fixed token sequence and records the input shapes and first pixels.
    #[derive(Debug)]
    struct ScriptedRecognizer {
        tokens: Vec<usize>,
        vocab: usize,
        seen: Mutex<Vec<(Vec<usize>, f32)>>,
    }

    impl InferenceEngine for ScriptedRecognizer {
        type Input = Tensor4D;
        type Output = Tensor3D;

        fn infer(&self, input: &Tensor4D) -> Result<Tensor3D, OCRError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push((input.shape().to_vec(), input[[0, 0, 0, 0]]));
            }
            let mut logits = Tensor3D::zeros((1, self.tokens.len(), self.vocab));
            for (i, &t) in self.tokens.iter().enumerate() {
                logits[[0, i, t]] = 5.0;
            }
            Ok(logits)
        }

        fn engine_info(&self) -> String {
            "scripted".to_string()
        }

        fn input_size(&self) -> (u32, u32) {
            (32, 8)
        }
    }

    fn charlist() -> Vec<String> {
        ["古", "文", "書"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_forward_decodes_tokens() {
        let engine = Arc::new(ScriptedRecognizer {
            tokens: vec![1, 2, 3, 0, 1],
            vocab: 4,
            seen: Mutex::new(Vec::new()),
        });
        let model = ParseqModelBuilder::new()
            .name("tier-30")
            .build(engine.clone(), Arc::new(TokenDecoder::new(charlist())))
            .unwrap();

        let line = RgbImage::from_pixel(40, 10, Rgb([0, 0, 255]));
        assert_eq!(model.recognize(&line).unwrap(), "古文書");
        assert_eq!(model.name(), "tier-30");

        let seen = engine.seen.lock().unwrap();
        assert_eq!(seen[0].0, vec![1, 3, 8, 32]);
        // Blue lands in the first (B) channel at full intensity.
        assert!((seen[0].1 - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_vertical_line_is_rotated_before_resize() {
        let engine = Arc::new(ScriptedRecognizer {
            tokens: vec![0],
            vocab: 4,
            seen: Mutex::new(Vec::new()),
        });
        let model = ParseqModelBuilder::new()
            .input_size(32, 8)
            .build(engine, Arc::new(TokenDecoder::new(charlist())))
            .unwrap();

        // Top half red, bottom half black. After a counter-clockwise turn the
        // top of the line ends up on the left.
        let mut line = RgbImage::new(4, 16);
        for y in 0..8 {
            for x in 0..4 {
                line.put_pixel(x, y, Rgb([255, 0, 0]));
            }
        }
        let tensor = model.preprocess(&line).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 8, 32]);
        // R is the last channel in BGR order.
        assert!((tensor[[0, 2, 4, 2]] - 1.0).abs() < 1e-3);
        assert!((tensor[[0, 2, 4, 29]] + 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_input_size_is_rejected() {
        let engine = Arc::new(ScriptedRecognizer {
            tokens: vec![0],
            vocab: 4,
            seen: Mutex::new(Vec::new()),
        });
        let err = ParseqModelBuilder::new()
            .input_size(0, 16)
            .build(engine, Arc::new(TokenDecoder::new(charlist())))
            .unwrap_err();
        assert!(matches!(err, OCRError::ConfigError { .. }));
    }
}
