//! Bounding box based image cropping utilities.

use crate::processors::BoundingBox;
use image::{RgbImage, imageops};

/// Crops detected lines out of a page image.
pub struct BBoxCrop;

impl BBoxCrop {
    /// Crops an image based on a bounding box.
    ///
    /// All four edges are clamped to the image before cropping. Returns `None`
    /// when the clamped region has zero width or height; the caller skips
    /// such lines.
    ///
    /// # Arguments
    ///
    /// * `image` - The source image
    /// * `bbox` - The bounding box defining the crop region
    pub fn crop_bounding_box(image: &RgbImage, bbox: &BoundingBox) -> Option<RgbImage> {
        let (x1, y1, x2, y2) = bbox.clamp_to(image.width(), image.height());
        let (width, height) = (x2 - x1, y2 - y1);
        if width == 0 || height == 0 {
            return None;
        }
        Some(imageops::crop_imm(image, x1, y1, width, height).to_image())
    }

    /// Splits a line image vertically into `[0, w/2)` and `[w/2, w)`.
    pub fn split_halves(image: &RgbImage) -> Option<(RgbImage, RgbImage)> {
        let (width, height) = image.dimensions();
        let mid = width / 2;
        if mid == 0 || height == 0 {
            return None;
        }
        let left = imageops::crop_imm(image, 0, 0, mid, height).to_image();
        let right = imageops::crop_imm(image, mid, 0, width - mid, height).to_image();
        Some((left, right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 0]))
    }

    #[test]
    fn test_crop_inside_image() {
        let img = gradient(20, 10);
        let crop = BBoxCrop::crop_bounding_box(&img, &BoundingBox::new(2, 3, 7, 9)).unwrap();
        assert_eq!(crop.dimensions(), (5, 6));
        assert_eq!(crop.get_pixel(0, 0), &Rgb([2, 3, 0]));
    }

    #[test]
    fn test_crop_clamps_edges() {
        let img = gradient(20, 10);
        let crop = BBoxCrop::crop_bounding_box(&img, &BoundingBox::new(-4, -2, 25, 30)).unwrap();
        assert_eq!(crop.dimensions(), (20, 10));
    }

    #[test]
    fn test_crop_returns_none_for_empty_region() {
        let img = gradient(20, 10);
        let cases = [
            BoundingBox::new(5, 5, 5, 8),
            BoundingBox::new(5, 5, 9, 5),
            BoundingBox::new(30, 0, 40, 5),
            BoundingBox::new(0, -10, 5, -1),
            BoundingBox::new(9, 9, 2, 2),
        ];
        for bbox in cases {
            assert!(BBoxCrop::crop_bounding_box(&img, &bbox).is_none(), "{bbox:?}");
        }
    }

    #[test]
    fn test_split_halves_odd_width() {
        let img = gradient(7, 2);
        let (left, right) = BBoxCrop::split_halves(&img).unwrap();
        assert_eq!(left.dimensions(), (3, 2));
        assert_eq!(right.dimensions(), (4, 2));
        assert_eq!(right.get_pixel(0, 0), &Rgb([3, 0, 0]));
        assert!(BBoxCrop::split_halves(&gradient(1, 5)).is_none());
    }
}
