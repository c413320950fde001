//! Geometric primitives for detected regions.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in source-image pixels.
///
/// Coordinates come straight from the detector and may lie outside the image
/// or be inverted; consumers clamp them when they touch pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge (inclusive).
    pub x_min: i32,
    /// Top edge (inclusive).
    pub y_min: i32,
    /// Right edge (exclusive).
    pub x_max: i32,
    /// Bottom edge (exclusive).
    pub y_max: i32,
}

impl BoundingBox {
    /// Creates a bounding box from its four edges.
    pub fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Scales detector coordinates by `scale` on both axes, truncating toward zero.
    ///
    /// # Arguments
    ///
    /// * `coords` - `[x_min, y_min, x_max, y_max]` in model input pixels.
    /// * `scale` - Ratio between the padded source side and the model input width.
    pub fn from_scaled(coords: [f32; 4], scale: f32) -> Self {
        Self {
            x_min: (coords[0] * scale) as i32,
            y_min: (coords[1] * scale) as i32,
            x_max: (coords[2] * scale) as i32,
            y_max: (coords[3] * scale) as i32,
        }
    }

    /// Width, zero for inverted boxes.
    pub fn width(&self) -> u32 {
        Self::extent(self.x_min, self.x_max)
    }

    /// Height, zero for inverted boxes.
    pub fn height(&self) -> u32 {
        Self::extent(self.y_min, self.y_max)
    }

    // Saturated detector coordinates span the whole i32 range.
    fn extent(min: i32, max: i32) -> u32 {
        (i64::from(max) - i64::from(min)).clamp(0, i64::from(u32::MAX)) as u32
    }

    /// True when the box is taller than it is wide.
    pub fn is_vertical(&self) -> bool {
        self.height() > self.width()
    }

    /// Clamps every edge to `[0, width] x [0, height]`.
    ///
    /// Returns `(x1, y1, x2, y2)` with `x1 <= x2` and `y1 <= y2`.
    pub fn clamp_to(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let clamp = |v: i32, max: u32| v.clamp(0, max.min(i32::MAX as u32) as i32) as u32;
        let x1 = clamp(self.x_min, width);
        let y1 = clamp(self.y_min, height);
        let x2 = clamp(self.x_max, width).max(x1);
        let y2 = clamp(self.y_max, height).max(y1);
        (x1, y1, x2, y2)
    }
}
