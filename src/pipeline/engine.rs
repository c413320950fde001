//! The page engine: detection, line extraction, cascaded recognition and
//! reading-order assembly behind one shareable handle.

use super::assembler::{OrderedLine, assemble};
use super::cascade::{RecognitionCascade, TierRecognizers};
use super::reading_order::{DetectionOrder, ReadingOrderResolver, validate_line_orders};
use super::result::{PageResult, TextLineResult};
use crate::core::config::{ConfigValidator, EngineConfig};
use crate::core::errors::SimpleError;
use crate::core::inference::{DetectionEngine, OrtDetectionEngine, OrtRecognitionEngine};
use crate::core::traits::TextLineRecognizer;
use crate::core::OCRError;
use crate::domain::{
    CapacityBucketing, DetectedBox, LayoutDetectionAdapter, LayoutDetectionAdapterBuilder,
    LineCrop, Tier,
};
use crate::models::recognition::ParseqModelBuilder;
use crate::processors::TokenDecoder;
use crate::utils::{BBoxCrop, load_charset, load_class_names, load_image};
use image::RgbImage;
use rayon::ThreadPool;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Inference backends for an engine assembled without ONNX model files.
#[derive(Debug, Clone)]
pub struct EngineParts {
    pub detector: Arc<DetectionEngine>,
    pub recognizers: TierRecognizers,
}

/// A ready-to-use page engine.
///
/// The handle is read-only once built and is meant to be shared behind an
/// [`Arc`] by every request of a process.
#[derive(Debug)]
pub struct EngineHandle {
    detector: LayoutDetectionAdapter,
    cascade: RecognitionCascade,
    reading_order: Arc<dyn ReadingOrderResolver>,
    page_lock: Option<Mutex<()>>,
}

impl EngineHandle {
    /// Loads every model named by `config`.
    pub fn from_config(config: EngineConfig) -> Result<Self, OCRError> {
        EngineBuilder::new(config).build()
    }

    /// Builds an engine around caller-supplied inference backends.
    pub fn from_parts(parts: EngineParts, config: EngineConfig) -> Result<Self, OCRError> {
        EngineBuilder::new(config).build_with_parts(parts)
    }

    /// Runs the full pipeline on one page.
    ///
    /// # Errors
    ///
    /// Any detection or recognition failure fails the whole page. Lines whose
    /// crop is empty are skipped, not reported.
    pub fn process(&self, image: &RgbImage) -> Result<PageResult, OCRError> {
        let _page_guard = match &self.page_lock {
            Some(lock) => Some(lock.lock().map_err(|_| {
                OCRError::inference_error(
                    "engine",
                    "page lock poisoned by an earlier panic",
                    SimpleError::new("lock acquisition failed"),
                )
            })?),
            None => None,
        };

        let started = Instant::now();
        let detections = self.detector.detect(image)?;
        let detect_time = started.elapsed();

        let (candidates, regions): (Vec<DetectedBox>, Vec<DetectedBox>) = detections
            .into_iter()
            .partition(|d| d.class.is_text_line());

        let mut lines = Vec::with_capacity(candidates.len());
        let mut crops = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match BBoxCrop::crop_bounding_box(image, &candidate.bounds) {
                Some(crop) => {
                    crops.push(LineCrop::new(
                        crop,
                        lines.len(),
                        candidate.char_capacity_bucket,
                    ));
                    lines.push(candidate);
                }
                None => tracing::debug!(bounds = ?candidate.bounds, "skipping empty line crop"),
            }
        }

        let recognitions = self.cascade.recognize(crops)?;
        let orders = self.reading_order.resolve(&lines, &regions)?;
        validate_line_orders(&orders, lines.len())?;

        let ordered: Vec<OrderedLine> = recognitions
            .iter()
            .map(|r| OrderedLine {
                text: r.text.clone(),
                bounds: lines[r.original_index].bounds,
                order: orders[r.original_index],
            })
            .collect();
        let page = assemble(&ordered);

        let mut line_results: Vec<TextLineResult> = recognitions
            .into_iter()
            .map(|r| {
                let line = &lines[r.original_index];
                let order = orders[r.original_index];
                TextLineResult {
                    index: r.original_index,
                    read_order: order.read_order,
                    block: order.block,
                    text: r.text,
                    confidence: line.confidence,
                    bounding_box: line.bounds,
                    is_vertical: line.bounds.is_vertical(),
                    char_capacity_bucket: line.char_capacity_bucket,
                }
            })
            .collect();
        line_results.sort_by_key(|line| line.read_order);

        tracing::info!(
            lines = line_results.len(),
            regions = regions.len(),
            reversed = page.reversed,
            detect_ms = detect_time.as_millis() as u64,
            total_ms = started.elapsed().as_millis() as u64,
            "page processed"
        );

        Ok(PageResult {
            input_path: None,
            image_width: image.width(),
            image_height: image.height(),
            lines: line_results,
            regions,
            page,
        })
    }

    /// Loads an image from disk and processes it.
    pub fn process_path(&self, path: impl AsRef<Path>) -> Result<PageResult, OCRError> {
        let path = path.as_ref();
        let image = load_image(path)?;
        let mut result = self.process(&image)?;
        result.input_path = Some(path.display().to_string());
        Ok(result)
    }

    /// Processes pages one after another with the same handle.
    ///
    /// A failing page does not stop the others; each entry carries its own outcome.
    pub fn process_many<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<Result<PageResult, OCRError>> {
        paths
            .iter()
            .map(|path| {
                let result = self.process_path(path);
                if let Err(err) = &result {
                    tracing::warn!(
                        path = %path.as_ref().display(),
                        error = %err,
                        "page failed"
                    );
                }
                result
            })
            .collect()
    }
}

/// Builder for [`EngineHandle`].
///
/// # Example
///
/// ```no_run
/// use koten_ocr::core::config::{EngineConfig, ModelPaths};
/// use koten_ocr::pipeline::EngineBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = EngineConfig {
///     models: ModelPaths::in_dir("/opt/koten"),
///     ..EngineConfig::default()
/// };
/// let engine = EngineBuilder::new(config).build()?;
/// let page = engine.process_path("page.jpg")?;
/// println!("{}", page.text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EngineBuilder {
    config: EngineConfig,
    bucketing: Option<Arc<dyn CapacityBucketing>>,
    reading_order: Option<Arc<dyn ReadingOrderResolver>>,
    worker_pool: Option<Arc<ThreadPool>>,
}

impl EngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            bucketing: None,
            reading_order: None,
            worker_pool: None,
        }
    }

    /// Replaces the default character-capacity bucketing.
    pub fn bucketing(mut self, bucketing: Arc<dyn CapacityBucketing>) -> Self {
        self.bucketing = Some(bucketing);
        self
    }

    /// Replaces the detection-order reading-order resolver.
    pub fn reading_order(mut self, resolver: Arc<dyn ReadingOrderResolver>) -> Self {
        self.reading_order = Some(resolver);
        self
    }

    /// Uses an existing worker pool instead of building one from the parallel policy.
    pub fn worker_pool(mut self, pool: Arc<ThreadPool>) -> Self {
        self.worker_pool = Some(pool);
        self
    }

    /// Loads the ONNX models, charset and class names named by the configuration.
    pub fn build(self) -> Result<EngineHandle, OCRError> {
        self.config.validate()?;
        let config = &self.config;
        let models = &config.models;

        let charset = load_charset(&models.charset)?;
        let decoder = Arc::new(match &config.recognition.suppressed_tokens {
            Some(tokens) => TokenDecoder::with_suppressed_tokens(charset, tokens.clone()),
            None => TokenDecoder::new(charset),
        });

        let detector_cfg = config.ort_session.for_detector(config.device);
        let detector = Arc::new(OrtDetectionEngine::new(
            &models.detector,
            &detector_cfg,
            1,
            config.detection.input_size,
        )?);

        let recognizer_cfg = config.ort_session.for_recognizer(config.device);
        let sessions = config.parallel.recognizer_session_count();
        let load = |tier: Tier,
                    path: &Path,
                    input_size: (u32, u32)|
         -> Result<Arc<dyn TextLineRecognizer>, OCRError> {
            let engine = Arc::new(OrtRecognitionEngine::new(
                path,
                &recognizer_cfg,
                sessions,
                input_size,
            )?);
            let model = ParseqModelBuilder::new()
                .name(format!("parseq-{tier}"))
                .input_size(input_size.0, input_size.1)
                .build(engine, decoder.clone())?;
            Ok(Arc::new(model))
        };
        let recognizers = TierRecognizers::new(
            load(
                Tier::Chars30,
                &models.recognizer_30,
                config.recognition.input_size_30,
            )?,
            load(
                Tier::Chars50,
                &models.recognizer_50,
                config.recognition.input_size_50,
            )?,
            load(
                Tier::Chars100,
                &models.recognizer_100,
                config.recognition.input_size_100,
            )?,
        );

        tracing::info!(
            detector = %models.detector.display(),
            device = ?config.device,
            recognizer_sessions = sessions,
            charset = decoder.charset_len(),
            "models loaded"
        );

        self.build_with_parts(EngineParts {
            detector,
            recognizers,
        })
    }

    /// Builds the engine around caller-supplied backends.
    ///
    /// Model paths of the configuration are ignored, except for the optional
    /// class-names file.
    pub fn build_with_parts(self, parts: EngineParts) -> Result<EngineHandle, OCRError> {
        self.config.validate_settings()?;
        let config = self.config;

        let class_names = match &config.models.class_names {
            Some(path) => load_class_names(path)?,
            None => Vec::new(),
        };

        let mut detector_builder = LayoutDetectionAdapterBuilder::new()
            .task_config(config.detection.clone())
            .class_names(class_names);
        if let Some(bucketing) = self.bucketing {
            detector_builder = detector_builder.bucketing(bucketing);
        }
        let detector = detector_builder.build(parts.detector)?;

        let pool = match self.worker_pool {
            Some(pool) => pool,
            None => config.parallel.build_worker_pool().map_err(|e| {
                OCRError::config_error_detailed("worker pool", e.to_string())
            })?,
        };
        tracing::debug!(workers = pool.current_num_threads(), "worker pool ready");

        let cascade = RecognitionCascade::new(parts.recognizers, config.cascade.clone(), pool);
        let reading_order = self
            .reading_order
            .unwrap_or_else(|| Arc::new(DetectionOrder));

        Ok(EngineHandle {
            detector,
            cascade,
            reading_order,
            page_lock: config.serialize_pages.then(|| Mutex::new(())),
        })
    }
}
