//! Constants used throughout the enhancement pipeline.
//!
//! This module defines various constants that are shared across different
//! components of the pipeline, such as the fixed model input resolution,
//! the curve layout the enhancement recurrence expects, and default values
//! for user-facing parameters.

/// The spatial resolution (both width and height) the curve model expects.
///
/// Every input image is resampled to this size before inference, and every
/// enhanced output has this size, regardless of the original resolution.
pub const MODEL_INPUT_SIZE: u32 = 512;

/// The number of sequential correction stages applied by the recurrence.
pub const CURVE_STAGES: usize = 8;

/// The number of channels the correction curve tensor must carry.
///
/// The curve is logically [`CURVE_STAGES`] ordered stages of 3 RGB channels
/// each. Any other channel count is a fatal shape error.
pub const CURVE_CHANNELS: usize = CURVE_STAGES * 3;

/// The default enhancement intensity.
pub const DEFAULT_INTENSITY: f32 = 3.0;

/// The lower bound of the intensity range the surrounding UI offers.
///
/// The algorithm itself accepts any positive value; this range only
/// documents what interactive callers are expected to send.
pub const UI_MIN_INTENSITY: f32 = 1.0;

/// The upper bound of the intensity range the surrounding UI offers.
pub const UI_MAX_INTENSITY: f32 = 10.0;

/// The default cap on the number of images accepted from a single upload.
///
/// Bounds resource use on hostile archives. Set
/// [`EnhancerConfig::max_batch_size`](crate::core::config::EnhancerConfig)
/// to `None` to disable the cap.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 256;

/// File extensions recognized as standalone images, matched case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// File extension recognized as a batch archive, matched case-insensitively.
pub const ARCHIVE_EXTENSION: &str = "zip";
