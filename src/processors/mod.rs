//! Image and tensor processing blocks shared by the detector and recognizers.

pub mod geometry;
pub mod normalization;
pub mod token_decode;
pub mod types;

pub use geometry::BoundingBox;
pub use normalization::NormalizeImage;
pub use token_decode::TokenDecoder;
pub use types::{ChannelOrder, ColorOrder};
