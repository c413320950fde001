//! Constants used throughout the OCR engine.
//!
//! This module defines the default values for detection and recognition
//! preprocessing, the cascade thresholds, and the character capacity of each
//! recognition tier.

/// The default confidence threshold for the layout detector.
///
/// Candidates whose score is less than or equal to this value are dropped.
pub const DEFAULT_DETECTION_CONF_THRESHOLD: f32 = 0.25;

/// The default square input resolution of the layout detector (width, height).
pub const DEFAULT_DETECTION_INPUT_SIZE: (u32, u32) = (1024, 1024);

/// ImageNet channel means in RGB order, applied to the detector input.
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet channel standard deviations in RGB order, applied to the detector input.
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Character count assigned to every candidate when the detector has no char-count head.
pub const DEFAULT_PRED_CHAR_COUNT: f32 = 100.0;

/// Input size (width, height) of the 30-character recognizer.
pub const DEFAULT_REC_INPUT_SIZE_30: (u32, u32) = (256, 16);

/// Input size (width, height) of the 50-character recognizer.
pub const DEFAULT_REC_INPUT_SIZE_50: (u32, u32) = (384, 16);

/// Input size (width, height) of the 100-character recognizer.
pub const DEFAULT_REC_INPUT_SIZE_100: (u32, u32) = (768, 16);

/// Decoded length at which a 30-character result is re-recognized by the 50-character tier.
pub const DEFAULT_TINY_PROMOTION_THRESHOLD: usize = 25;

/// Decoded length at which a 50-character result is re-recognized by the 100-character tier.
pub const DEFAULT_MEDIUM_PROMOTION_THRESHOLD: usize = 45;

/// Decoded length at which a wide 100-character result is split in two halves.
pub const DEFAULT_SPLIT_THRESHOLD: usize = 98;

/// Characters whose tokens are never emitted by the decoder.
///
/// Both are frequent misreadings of dakuten and handakuten marks.
pub const SUPPRESSED_CHARS: [char; 2] = ['"', '\''];

/// The maximum number of ONNX sessions a recognizer keeps by default.
pub const DEFAULT_MAX_RECOGNIZER_SESSIONS: usize = 4;

/// Image file extensions accepted by the batch command line.
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "tif", "tiff", "bmp", "jp2"];
