//! Conversion of enhanced tensors back into 8-bit rasters.

use crate::core::errors::{DceResult, EnhanceError};
use crate::core::Tensor4D;
use image::RgbImage;
use ndarray::Axis;

/// Converts an NHWC tensor with nominal range `[0, 1]` into an 8-bit RGB image.
///
/// Values are rescaled by 255, clipped to `[0, 255]` (repeated multiplicative
/// correction can legally push them outside the unit range), and rounded to
/// the nearest integer. The batch axis is dropped.
///
/// # Errors
///
/// Returns an error if the tensor is not of shape `(1, H, W, 3)`.
pub fn tensor_to_image(tensor: &Tensor4D) -> DceResult<RgbImage> {
    let shape = tensor.shape();
    if shape[0] != 1 || shape[3] != 3 {
        return Err(EnhanceError::invalid_input(format!(
            "expected tensor of shape (1, H, W, 3), got {:?}",
            shape
        )));
    }

    let (height, width) = (shape[1], shape[2]);
    let frame = tensor.index_axis(Axis(0), 0);

    let mut img = RgbImage::new(width as u32, height as u32);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        for c in 0..3 {
            let value = frame[[y as usize, x as usize, c]] * 255.0;
            pixel[c] = value.clamp(0.0, 255.0).round() as u8;
        }
    }

    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[test]
    fn test_unit_range_round_trips_to_bytes() {
        let mut tensor = Array4::zeros((1, 2, 2, 3));
        tensor[[0, 0, 0, 0]] = 0.0;
        tensor[[0, 0, 0, 1]] = 0.5;
        tensor[[0, 0, 0, 2]] = 1.0;

        let img = tensor_to_image(&tensor).unwrap();
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(0, 0).0, [0, 128, 255]);
    }

    #[test]
    fn test_out_of_range_values_are_clipped() {
        let mut tensor = Array4::zeros((1, 1, 2, 3));
        tensor[[0, 0, 0, 0]] = 1.7;
        tensor[[0, 0, 0, 1]] = -0.3;
        tensor[[0, 0, 0, 2]] = 0.999;

        let img = tensor_to_image(&tensor).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 255]);
    }

    #[test]
    fn test_rejects_wrong_channel_count() {
        let tensor = Array4::zeros((1, 4, 4, 4));
        assert!(tensor_to_image(&tensor).is_err());

        let tensor = Array4::zeros((2, 4, 4, 3));
        assert!(tensor_to_image(&tensor).is_err());
    }
}
