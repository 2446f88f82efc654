// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Image preprocessing for heatmap inference.
//!
//! The OpenPose graph expects a plain (non-letterboxed) resize to the input
//! size, mean subtraction, an optional scale, and NCHW layout.

#![allow(clippy::cast_possible_truncation)]

use fast_image_resize::{PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use image::{DynamicImage, RgbImage};
use ndarray::{Array3, Array4};

use crate::error::{PoseError, Result};
use crate::inference::InferenceConfig;

/// Convert an image to a `(1, 3, H, W)` network input tensor.
///
/// # Arguments
///
/// * `image` - Input image in any color format; it is converted to RGB.
/// * `config` - Input size, mean, scale and channel order.
///
/// # Errors
///
/// Returns [`PoseError::InvalidTensorShape`] for an empty image,
/// [`PoseError::ConfigError`] for a zero input size, and
/// [`PoseError::ImageError`] if resizing fails.
pub fn blob_from_image(image: &DynamicImage, config: &InferenceConfig) -> Result<Array4<f32>> {
    let (target_h, target_w) = config.imgsz;
    if target_h == 0 || target_w == 0 {
        return Err(PoseError::ConfigError(format!(
            "input size must be non-zero, got {target_h}x{target_w}"
        )));
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(PoseError::InvalidTensorShape(format!(
            "image must be non-empty, got {}x{}",
            image.width(),
            image.height()
        )));
    }

    let resized = resize_rgb(image, target_w as u32, target_h as u32)?;

    let mut tensor = Array4::zeros((1, 3, target_h, target_w));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for c in 0..3 {
            let src = if config.swap_rb { c } else { 2 - c };
            tensor[[0, c, y, x]] = (f32::from(pixel[src]) - config.mean) * config.scale;
        }
    }

    Ok(tensor)
}

/// Bilinear resize to `width` x `height`, skipped when the size already matches.
fn resize_rgb(image: &DynamicImage, width: u32, height: u32) -> Result<RgbImage> {
    let rgb = image.to_rgb8();
    let (src_w, src_h) = rgb.dimensions();
    if (src_w, src_h) == (width, height) {
        return Ok(rgb);
    }

    let src_image = Image::from_vec_u8(src_w, src_h, rgb.into_raw(), PixelType::U8x3)
        .map_err(|e| PoseError::ImageError(format!("Failed to wrap source image: {e}")))?;
    let mut dst_image = Image::new(width, height, PixelType::U8x3);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(
        fast_image_resize::FilterType::Bilinear,
    ));
    Resizer::new()
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| PoseError::ImageError(format!("Failed to resize image: {e}")))?;

    RgbImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| PoseError::ImageError("Failed to create resized buffer".to_string()))
}

/// Convert a `DynamicImage` to an HWC ndarray.
///
/// # Errors
///
/// Returns [`PoseError::ImageError`] if the pixel buffer does not match the
/// image dimensions.
pub fn image_to_array(image: &DynamicImage) -> Result<Array3<u8>> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    Array3::from_shape_vec((height as usize, width as usize, 3), rgb.into_raw())
        .map_err(|e| PoseError::ImageError(format!("Failed to create array from image: {e}")))
}

/// Convert an HWC u8 array to a `DynamicImage`.
///
/// # Errors
///
/// Returns [`PoseError::InvalidTensorShape`] if the array is not `H x W x 3`
/// or a dimension exceeds `u32::MAX`.
pub fn array_to_image(arr: &Array3<u8>) -> Result<DynamicImage> {
    let &[height, width, channels] = arr.shape() else {
        return Err(PoseError::InvalidTensorShape(format!(
            "expected HxWx3 array, got {:?}",
            arr.shape()
        )));
    };
    if channels != 3 {
        return Err(PoseError::InvalidTensorShape(format!(
            "expected 3 channels, got {channels}"
        )));
    }
    let height = u32::try_from(height)
        .map_err(|_| PoseError::InvalidTensorShape("Image height exceeds u32::MAX".to_string()))?;
    let width = u32::try_from(width)
        .map_err(|_| PoseError::InvalidTensorShape("Image width exceeds u32::MAX".to_string()))?;

    let rgb_data: Vec<u8> = arr.iter().copied().collect();
    let img_buffer = RgbImage::from_raw(width, height, rgb_data).ok_or_else(|| {
        PoseError::ImageError("Failed to create image from array".to_string())
    })?;

    Ok(DynamicImage::ImageRgb8(img_buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(w: u32, h: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(rgb)))
    }

    #[test]
    fn test_blob_shape_and_mean() {
        let config = InferenceConfig::new().with_imgsz(8, 12);
        let blob = blob_from_image(&solid(30, 20, [255, 127, 0]), &config).unwrap();
        assert_eq!(blob.shape(), &[1, 3, 8, 12]);

        // Allow one level of fixed-point rounding from the resize
        assert!((blob[[0, 0, 4, 6]] - 127.5).abs() <= 1.0);
        assert!((blob[[0, 1, 4, 6]] + 0.5).abs() <= 1.0);
        assert!((blob[[0, 2, 4, 6]] + 127.5).abs() <= 1.0);
    }

    #[test]
    fn test_blob_bgr_order_and_scale() {
        let config = InferenceConfig::new()
            .with_imgsz(4, 4)
            .with_swap_rb(false)
            .with_mean(0.0)
            .with_scale(1.0 / 255.0);
        let blob = blob_from_image(&solid(4, 4, [255, 0, 0]), &config).unwrap();
        // Red lands in the last channel when feeding BGR
        assert!(blob[[0, 0, 0, 0]].abs() < 1e-6);
        assert!((blob[[0, 2, 0, 0]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_blob_rejects_empty() {
        let config = InferenceConfig::new();
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            blob_from_image(&empty, &config),
            Err(PoseError::InvalidTensorShape(_))
        ));

        let config = InferenceConfig::new().with_imgsz(0, 368);
        assert!(matches!(
            blob_from_image(&solid(2, 2, [0, 0, 0]), &config),
            Err(PoseError::ConfigError(_))
        ));
    }

    #[test]
    fn test_array_image_conversion() {
        let mut arr = Array3::<u8>::zeros((2, 3, 3));
        arr[[1, 2, 0]] = 200;
        let img = array_to_image(&arr).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(img.to_rgb8().get_pixel(2, 1)[0], 200);
        assert_eq!(image_to_array(&img).unwrap(), arr);

        assert!(array_to_image(&Array3::<u8>::zeros((2, 2, 4))).is_err());
    }
}
