//! Adapters binding models to the page pipeline.

pub mod layout_detection_adapter;

pub use layout_detection_adapter::{LayoutDetectionAdapter, LayoutDetectionAdapterBuilder};
