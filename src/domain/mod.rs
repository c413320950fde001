//! Domain types of a page: detections, line crops, tiers and recognition results.

pub mod adapters;
pub mod bucketing;
pub mod line;
pub mod tier;

pub use adapters::{LayoutDetectionAdapter, LayoutDetectionAdapterBuilder};
pub use bucketing::{CapacityBucketing, DefaultBucketing};
pub use line::{DetectedBox, LineCrop, RecognitionResult, RegionClass};
pub use tier::{CharCapacityBucket, Tier};
