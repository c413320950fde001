//! Types used in image processing operations

/// Specifies the order of channels in an image tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    /// Channel, Height, Width order (common in PyTorch)
    CHW,
    /// Height, Width, Channel order (common in TensorFlow)
    HWC,
}

/// Specifies the color channel order in an image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorOrder {
    /// Red, Green, Blue order (default for most image libraries like PIL, image-rs)
    #[default]
    RGB,
    /// Blue, Green, Red order (used by OpenCV-trained models)
    BGR,
}
