//! Image loading and geometry helpers.

use crate::core::OCRError;
use crate::core::errors::ImageProcessError;
use image::{RgbImage, imageops};
use std::path::Path;

/// Loads an image from disk and converts it to RGB.
pub fn load_image(path: &Path) -> Result<RgbImage, OCRError> {
    let img = image::open(path).map_err(OCRError::ImageLoad)?;
    Ok(img.to_rgb8())
}

/// Zero-pads `image` to a square of side `max(width, height)`.
///
/// The source is kept in the top-left corner, so model coordinates map back to
/// source pixels with a single scale factor.
pub fn pad_to_square(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == height {
        return image.clone();
    }
    let side = width.max(height);
    let mut padded = RgbImage::new(side, side);
    imageops::replace(&mut padded, image, 0, 0);
    padded
}

/// Resizes an RGB image with bicubic (Catmull-Rom) filtering.
pub fn resize_rgb(image: &RgbImage, width: u32, height: u32) -> Result<RgbImage, OCRError> {
    if width == 0 || height == 0 {
        return Err(ImageProcessError::InvalidResizeTarget { width, height }.into());
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(ImageProcessError::InvalidInput.into());
    }
    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }
    Ok(imageops::resize(
        image,
        width,
        height,
        imageops::FilterType::CatmullRom,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_pad_to_square_keeps_top_left() {
        let mut img = RgbImage::from_pixel(4, 2, Rgb([200, 100, 50]));
        img.put_pixel(3, 1, Rgb([1, 2, 3]));

        let padded = pad_to_square(&img);
        assert_eq!(padded.dimensions(), (4, 4));
        assert_eq!(padded.get_pixel(0, 0), &Rgb([200, 100, 50]));
        assert_eq!(padded.get_pixel(3, 1), &Rgb([1, 2, 3]));
        assert_eq!(padded.get_pixel(0, 2), &Rgb([0, 0, 0]));
        assert_eq!(padded.get_pixel(3, 3), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_pad_tall_image() {
        let img = RgbImage::from_pixel(2, 5, Rgb([9, 9, 9]));
        let padded = pad_to_square(&img);
        assert_eq!(padded.dimensions(), (5, 5));
        assert_eq!(padded.get_pixel(4, 0), &Rgb([0, 0, 0]));
        assert_eq!(padded.get_pixel(1, 4), &Rgb([9, 9, 9]));
    }

    #[test]
    fn test_resize_rgb_rejects_empty_target() {
        let img = RgbImage::new(4, 4);
        assert!(resize_rgb(&img, 0, 4).is_err());
        assert_eq!(resize_rgb(&img, 8, 2).unwrap().dimensions(), (8, 2));
    }
}
