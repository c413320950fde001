//! Image normalization for the detector and recognizer inputs.
//!
//! A normalizer computes `pixel * alpha + beta` per output channel, where
//! `alpha = scale / std` and `beta = -mean / std`, and lays the result out as a
//! `[1, C, H, W]` or `[1, H, W, C]` tensor.

use crate::core::constants::{IMAGENET_MEAN, IMAGENET_STD};
use crate::core::{OCRError, Tensor4D};
use crate::processors::types::{ChannelOrder, ColorOrder};
use image::RgbImage;

/// Normalizes images into model input tensors.
#[derive(Debug, Clone)]
pub struct NormalizeImage {
    /// Scaling factors for each output channel (alpha = scale / std)
    pub alpha: [f32; 3],
    /// Offset values for each output channel (beta = -mean / std)
    pub beta: [f32; 3],
    /// Channel ordering (CHW or HWC)
    pub order: ChannelOrder,
    /// Color channel order of the output tensor (RGB or BGR)
    pub color_order: ColorOrder,
}

impl NormalizeImage {
    /// Creates a normalizer.
    ///
    /// `mean` and `std` are given in the **output channel order** selected by
    /// `color_order`: with BGR, pass `[B, G, R]` statistics.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `scale` or any `std` entry is not
    /// strictly positive.
    pub fn with_color_order(
        scale: f32,
        mean: [f32; 3],
        std: [f32; 3],
        order: ChannelOrder,
        color_order: ColorOrder,
    ) -> Result<Self, OCRError> {
        if scale <= 0.0 {
            return Err(OCRError::ConfigError {
                message: "Scale must be greater than 0".to_string(),
            });
        }
        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(OCRError::ConfigError {
                    message: format!(
                        "Standard deviation at index {i} must be greater than 0, got {s}"
                    ),
                });
            }
        }

        Ok(Self {
            alpha: std.map(|s| scale / s),
            beta: [0, 1, 2].map(|i| -mean[i] / std[i]),
            order,
            color_order,
        })
    }

    /// Normalizer for the line recognizers: BGR, values mapped to `[-1, 1]`.
    pub fn for_ocr_recognition() -> Result<Self, OCRError> {
        Self::with_color_order(
            2.0 / 255.0,
            [1.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            ChannelOrder::CHW,
            ColorOrder::BGR,
        )
    }

    /// ImageNet-style RGB normalizer used by the layout detector.
    pub fn imagenet_rgb() -> Result<Self, OCRError> {
        Self::with_color_order(
            1.0 / 255.0,
            IMAGENET_MEAN,
            IMAGENET_STD,
            ChannelOrder::CHW,
            ColorOrder::RGB,
        )
    }

    /// Normalizes a single image into a batch-of-one tensor.
    pub fn normalize_to(&self, img: &RgbImage) -> Result<Tensor4D, OCRError> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(OCRError::invalid_input(format!(
                "cannot normalize an empty {width}x{height} image"
            )));
        }
        let (w, h) = (width as usize, height as usize);

        // Source pixel channel feeding each output channel.
        let src_channels: [usize; 3] = match self.color_order {
            ColorOrder::RGB => [0, 1, 2],
            ColorOrder::BGR => [2, 1, 0],
        };
        let value = |c: usize, y: usize, x: usize| {
            let pixel = img.get_pixel(x as u32, y as u32);
            pixel[src_channels[c]] as f32 * self.alpha[c] + self.beta[c]
        };

        let tensor = match self.order {
            ChannelOrder::CHW => {
                Tensor4D::from_shape_fn((1, 3, h, w), |(_, c, y, x)| value(c, y, x))
            }
            ChannelOrder::HWC => {
                Tensor4D::from_shape_fn((1, h, w, 3), |(_, y, x, c)| value(c, y, x))
            }
        };
        Ok(tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn one_pixel(rgb: [u8; 3]) -> RgbImage {
        let mut img = RgbImage::new(1, 1);
        img.put_pixel(0, 0, Rgb(rgb));
        img
    }

    #[test]
    fn test_normalize_image_color_order_rgb_vs_bgr_chw() {
        let img = one_pixel([10, 20, 30]);
        let identity = |color_order| {
            NormalizeImage::with_color_order(
                1.0,
                [0.0; 3],
                [1.0; 3],
                ChannelOrder::CHW,
                color_order,
            )
            .unwrap()
        };

        let rgb = identity(ColorOrder::RGB).normalize_to(&img).unwrap();
        let bgr = identity(ColorOrder::BGR).normalize_to(&img).unwrap();

        assert_eq!(rgb.shape(), &[1, 3, 1, 1]);
        assert_eq!(rgb.iter().copied().collect::<Vec<_>>(), vec![10.0, 20.0, 30.0]);
        assert_eq!(bgr.iter().copied().collect::<Vec<_>>(), vec![30.0, 20.0, 10.0]);
    }

    #[test]
    fn test_recognition_normalizer_maps_to_unit_range() {
        let norm = NormalizeImage::for_ocr_recognition().unwrap();
        let out = norm.normalize_to(&one_pixel([0, 255, 255])).unwrap();
        let values: Vec<f32> = out.iter().copied().collect();
        // B, G, R
        assert!((values[0] - 1.0).abs() < 1e-6);
        assert!((values[1] - 1.0).abs() < 1e-6);
        assert!((values[2] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_imagenet_rgb_statistics() {
        let norm = NormalizeImage::imagenet_rgb().unwrap();
        let out = norm.normalize_to(&one_pixel([255, 0, 128])).unwrap();
        let r = (1.0 - 0.485) / 0.229;
        let g = (0.0 - 0.456) / 0.224;
        let b = (128.0 / 255.0 - 0.406) / 0.225;
        assert!((out[[0, 0, 0, 0]] - r).abs() < 1e-4);
        assert!((out[[0, 1, 0, 0]] - g).abs() < 1e-4);
        assert!((out[[0, 2, 0, 0]] - b).abs() < 1e-4);
    }

    #[test]
    fn test_hwc_layout() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([1, 2, 3]));
        img.put_pixel(1, 0, Rgb([4, 5, 6]));
        let norm =
            NormalizeImage::with_color_order(1.0, [0.0; 3], [1.0; 3], ChannelOrder::HWC, ColorOrder::RGB)
                .unwrap();
        let out = norm.normalize_to(&img).unwrap();
        assert_eq!(out.shape(), &[1, 1, 2, 3]);
        assert_eq!(out[[0, 0, 1, 2]], 6.0);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(
            NormalizeImage::with_color_order(0.0, [0.0; 3], [1.0; 3], ChannelOrder::CHW, ColorOrder::RGB)
                .is_err()
        );
        assert!(
            NormalizeImage::with_color_order(1.0, [0.0; 3], [1.0, 0.0, 1.0], ChannelOrder::CHW, ColorOrder::RGB)
                .is_err()
        );
        assert!(NormalizeImage::imagenet_rgb().unwrap().normalize_to(&RgbImage::new(0, 3)).is_err());
    }
}
