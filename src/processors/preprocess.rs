//! Input normalization for the curve model.
//!
//! The model expects a fixed-size NHWC tensor regardless of the input's
//! resolution or aspect ratio, so every image goes through the same steps:
//! RGB conversion (discarding alpha, expanding grayscale), an exact resize
//! to 512x512 that does not preserve aspect ratio, a rescale of channel
//! values from `[0, 255]` to `[0, 1]`, and a leading batch axis of size 1.

use crate::core::constants::MODEL_INPUT_SIZE;
use crate::core::Tensor4D;
use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

/// Normalizes an image into the tensor shape the curve model expects.
///
/// Deterministic and side-effect free: the output shape is always
/// `(1, 512, 512, 3)` with every value in `[0, 1]`, regardless of the
/// input resolution, aspect ratio, or color type.
///
/// # Arguments
///
/// * `img` - The decoded image to normalize
///
/// # Returns
///
/// The normalized image as a 4D NHWC tensor.
pub fn normalize_image(img: &DynamicImage) -> Tensor4D {
    let size = MODEL_INPUT_SIZE;
    let resized = img.resize_exact(size, size, FilterType::CatmullRom);
    let rgb = resized.to_rgb8();

    let mut tensor = Array4::zeros((1, size as usize, size as usize, 3));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, y as usize, x as usize, c]] = pixel[c] as f32 / 255.0;
        }
    }

    tensor
}
