//! Utility functions for images.

use crate::core::errors::DceResult;
use crate::core::EnhanceError;
use image::{DynamicImage, RgbImage};
use std::path::Path;

/// Loads and decodes an image from a file path.
///
/// # Errors
///
/// Returns an [`EnhanceError::ImageLoad`] error if the file cannot be read
/// or decoded.
pub fn load_image(path: &Path) -> DceResult<DynamicImage> {
    image::open(path).map_err(EnhanceError::ImageLoad)
}

/// Converts a DynamicImage to an RgbImage.
pub fn dynamic_to_rgb(img: &DynamicImage) -> RgbImage {
    img.to_rgb8()
}
