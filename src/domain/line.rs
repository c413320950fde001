//! Per-page data flowing between detection, recognition and assembly.

use super::tier::CharCapacityBucket;
use crate::processors::BoundingBox;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Region type of a detection, derived from the detector's 1-based label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionClass {
    /// A text line (class index 0). Only these are recognized.
    TextLine,
    /// Any other layout region, carrying its class index.
    Layout(usize),
}

impl RegionClass {
    /// Maps a 0-based class index to a region class.
    pub fn from_index(index: usize) -> Self {
        if index == 0 {
            RegionClass::TextLine
        } else {
            RegionClass::Layout(index)
        }
    }

    /// The 0-based class index.
    pub fn index(self) -> usize {
        match self {
            RegionClass::TextLine => 0,
            RegionClass::Layout(index) => index,
        }
    }

    pub fn is_text_line(self) -> bool {
        matches!(self, RegionClass::TextLine)
    }
}

/// A detection that survived filtering, in source-image pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedBox {
    pub bounds: BoundingBox,
    pub confidence: f32,
    pub class: RegionClass,
    /// Human readable class name, when class names were configured.
    pub class_name: Option<String>,
    /// Raw value of the detector's char-count head.
    pub pred_char_count: f32,
    pub char_capacity_bucket: CharCapacityBucket,
}

/// A cropped text line waiting for recognition.
#[derive(Debug, Clone)]
pub struct LineCrop {
    pub image: RgbImage,
    /// Index of the line among the page's recognized lines.
    pub original_index: usize,
    pub char_capacity_bucket: CharCapacityBucket,
}

impl LineCrop {
    pub fn new(image: RgbImage, original_index: usize, bucket: CharCapacityBucket) -> Self {
        Self {
            image,
            original_index,
            char_capacity_bucket: bucket,
        }
    }
}

/// Final text of one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub original_index: usize,
    pub text: String,
}
