//! Utility functions for the OCR engine.
//!
//! This module provides image loading and padding helpers, line cropping,
//! charset and class-name loading, and logging setup.

pub mod bbox_crop;
pub mod dict;
pub mod image;

pub use bbox_crop::BBoxCrop;
pub use dict::{load_charset, load_class_names};
pub use self::image::{load_image, pad_to_square, resize_rgb};

/// Initializes the tracing subscriber for logging.
///
/// The filter is read from `RUST_LOG`. Calling this more than once is harmless;
/// only the first call installs a subscriber.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
