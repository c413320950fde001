//! Strategies mapping a predicted character count to a capacity bucket.

use super::tier::CharCapacityBucket;
use std::fmt::Debug;

/// Maps the detector's predicted character count to a [`CharCapacityBucket`].
pub trait CapacityBucketing: Send + Sync + Debug {
    /// Bucket for a line with `pred_char_count`.
    fn bucket(&self, pred_char_count: f32) -> CharCapacityBucket;
}

/// The detector's char-count head emits class-like values: `3` for short
/// lines, `2` for medium ones. Everything else is treated as long.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBucketing;

impl CapacityBucketing for DefaultBucketing {
    fn bucket(&self, pred_char_count: f32) -> CharCapacityBucket {
        if pred_char_count == 3.0 {
            CharCapacityBucket::Tiny
        } else if pred_char_count == 2.0 {
            CharCapacityBucket::Medium
        } else {
            CharCapacityBucket::Large
        }
    }
}
