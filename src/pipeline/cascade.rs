//! Tiered line recognition.
//!
//! Lines start in the tier matching their character-capacity bucket. A tier's
//! lines are recognized concurrently on the shared worker pool; results that
//! reach the tier's promotion threshold are thrown away and the line is queued
//! for the next, larger tier. Tiers run one after the other, so a promoted line
//! is always picked up by a later stage of the same call.

use crate::core::OCRError;
use crate::core::config::{CascadeConfig, CascadeMode, SplitOverflowPolicy};
use crate::core::traits::TextLineRecognizer;
use crate::domain::{LineCrop, RecognitionResult, Tier};
use crate::utils::BBoxCrop;
use image::RgbImage;
use rayon::ThreadPool;
use rayon::prelude::*;
use std::sync::Arc;

/// One recognizer per tier.
#[derive(Debug, Clone)]
pub struct TierRecognizers {
    pub chars30: Arc<dyn TextLineRecognizer>,
    pub chars50: Arc<dyn TextLineRecognizer>,
    pub chars100: Arc<dyn TextLineRecognizer>,
}

impl TierRecognizers {
    pub fn new(
        chars30: Arc<dyn TextLineRecognizer>,
        chars50: Arc<dyn TextLineRecognizer>,
        chars100: Arc<dyn TextLineRecognizer>,
    ) -> Self {
        Self {
            chars30,
            chars50,
            chars100,
        }
    }

    /// The recognizer bound to `tier`.
    pub fn get(&self, tier: Tier) -> &dyn TextLineRecognizer {
        match tier {
            Tier::Chars30 => self.chars30.as_ref(),
            Tier::Chars50 => self.chars50.as_ref(),
            Tier::Chars100 => self.chars100.as_ref(),
        }
    }
}

/// Schedules line crops across the recognition tiers.
#[derive(Debug)]
pub struct RecognitionCascade {
    recognizers: TierRecognizers,
    config: CascadeConfig,
    pool: Arc<ThreadPool>,
}

impl RecognitionCascade {
    pub fn new(recognizers: TierRecognizers, config: CascadeConfig, pool: Arc<ThreadPool>) -> Self {
        Self {
            recognizers,
            config,
            pool,
        }
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Recognizes every line and returns one result per line, sorted by
    /// `original_index`.
    ///
    /// # Errors
    ///
    /// The first recognizer failure aborts the call with
    /// [`OCRError::Recognition`]; no partial result is returned.
    pub fn recognize(&self, lines: Vec<LineCrop>) -> Result<Vec<RecognitionResult>, OCRError> {
        let mut queues: [Vec<LineCrop>; 3] = Default::default();
        for line in lines {
            let tier = match self.config.mode {
                CascadeMode::Cascade => Tier::for_bucket(line.char_capacity_bucket),
                CascadeMode::LargeOnly => Tier::Chars100,
            };
            queues[tier.index()].push(line);
        }

        let mut results = Vec::new();
        let mut overflowing = Vec::new();

        for tier in Tier::ALL {
            let queue = std::mem::take(&mut queues[tier.index()]);
            if queue.is_empty() {
                continue;
            }
            let texts = self.run_stage(tier, &queue)?;

            let mut promoted = 0usize;
            for (line, text) in queue.into_iter().zip(texts) {
                let length = text.chars().count();
                match (tier.next(), self.promotion_threshold(tier)) {
                    (Some(next), Some(threshold)) if length >= threshold => {
                        promoted += 1;
                        queues[next.index()].push(line);
                    }
                    _ if self.should_split(tier, &line.image, length) => {
                        overflowing.push((line, text));
                    }
                    _ => results.push(RecognitionResult {
                        original_index: line.original_index,
                        text,
                    }),
                }
            }

            tracing::debug!(
                tier = %tier,
                recognizer = self.recognizers.get(tier).name(),
                promoted,
                "recognition stage finished"
            );
        }

        if !overflowing.is_empty() {
            results.extend(self.run_split_stage(overflowing)?);
        }

        results.sort_by_key(|r| r.original_index);
        Ok(results)
    }

    /// Recognizes one tier's queue concurrently, keeping input order.
    fn run_stage(&self, tier: Tier, queue: &[LineCrop]) -> Result<Vec<String>, OCRError> {
        tracing::debug!(tier = %tier, lines = queue.len(), "recognition stage started");
        let recognizer = self.recognizers.get(tier);
        self.pool.install(|| {
            queue
                .par_iter()
                .map(|line| {
                    recognizer
                        .recognize(&line.image)
                        .map_err(|e| OCRError::recognition_error(tier, line.original_index, e))
                })
                .collect()
        })
    }

    /// Recognizes both halves of every overflowing line with the 100-character
    /// tier and joins them left then right.
    fn run_split_stage(
        &self,
        overflowing: Vec<(LineCrop, String)>,
    ) -> Result<Vec<RecognitionResult>, OCRError> {
        let mut halves: Vec<(usize, RgbImage)> = Vec::with_capacity(overflowing.len() * 2);
        let mut results = Vec::new();
        for (line, text) in overflowing {
            match BBoxCrop::split_halves(&line.image) {
                Some((left, right)) => {
                    halves.push((line.original_index, left));
                    halves.push((line.original_index, right));
                }
                None => results.push(RecognitionResult {
                    original_index: line.original_index,
                    text,
                }),
            }
        }

        tracing::debug!(lines = halves.len() / 2, "splitting overflowing lines");
        let tier = Tier::Chars100;
        let recognizer = self.recognizers.get(tier);
        let texts: Vec<String> = self.pool.install(|| {
            halves
                .par_iter()
                .map(|(index, half)| {
                    recognizer
                        .recognize(half)
                        .map_err(|e| OCRError::recognition_error(tier, *index, e))
                })
                .collect::<Result<Vec<_>, _>>()
        })?;

        for (pair, texts) in halves.chunks(2).zip(texts.chunks(2)) {
            results.push(RecognitionResult {
                original_index: pair[0].0,
                text: texts.concat(),
            });
        }
        Ok(results)
    }

    fn promotion_threshold(&self, tier: Tier) -> Option<usize> {
        match tier {
            Tier::Chars30 => Some(self.config.tiny_promotion_threshold),
            Tier::Chars50 => Some(self.config.medium_promotion_threshold),
            Tier::Chars100 => None,
        }
    }

    fn should_split(&self, tier: Tier, image: &RgbImage, length: usize) -> bool {
        tier == Tier::Chars100
            && self.config.split_overflow == SplitOverflowPolicy::Enabled
            && length >= self.config.split_threshold
            && image.width() > image.height()
    }
}
