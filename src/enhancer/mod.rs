//! The curve-based enhancement algorithm.
//!
//! The curve model predicts, for every pixel, a coefficient per correction
//! stage and per RGB channel. Enhancement applies those coefficients through
//! a fixed number of recurrence steps: starting from the normalized input
//! `x`, each stage `i` computes
//!
//! ```text
//! x <- x + a_i * (x^2 - x)
//! ```
//!
//! elementwise, where `a_i` is the 3-channel slice of the curve for that
//! stage. Because `x` starts in `[0, 1]`, the `(x^2 - x)` term is never
//! positive; the sign and magnitude of the learned coefficient decide the
//! direction and strength of the correction, and composing the stages
//! approximates a higher-order tone curve with no explicit gamma parameter.
//!
//! The stages consume each other's output, so they must run in strict
//! ascending order. Intensity is applied as one linear amplification of the
//! whole curve before the recurrence; intermediate values may leave `[0, 1]`
//! and are only clipped at the final 8-bit conversion.

use crate::core::constants::{CURVE_CHANNELS, CURVE_STAGES};
use crate::core::errors::{DceResult, EnhanceError};
use crate::core::{CurveEstimator, Tensor4D};
use crate::processors::{normalize_image, tensor_to_image};
use image::{DynamicImage, RgbImage};
use ndarray::s;

/// Enhances a normalized image tensor with the given curve model and intensity.
///
/// Runs the model, validates the correction curve's channel count, scales
/// the curve by `intensity`, applies the stage recurrence in ascending
/// order, and converts the result back into an 8-bit raster of the same
/// spatial size as the input tensor.
///
/// The function is pure: the model is never mutated, and the same
/// `(model, input, intensity)` triple always yields the same output. An
/// intensity of zero degenerates to the identity (up to 8-bit rounding),
/// which callers can use as a baseline.
///
/// # Errors
///
/// * [`EnhanceError::CurveShapeMismatch`] if the curve does not carry
///   exactly [`CURVE_CHANNELS`] channels
/// * [`EnhanceError::InvalidInput`] if the input tensor is malformed, the
///   curve's batch or spatial dimensions disagree with the input, or
///   `intensity` is negative or non-finite
pub fn enhance<M: CurveEstimator + ?Sized>(
    model: &M,
    input: &Tensor4D,
    intensity: f32,
) -> DceResult<RgbImage> {
    if !intensity.is_finite() || intensity < 0.0 {
        return Err(EnhanceError::invalid_input(format!(
            "intensity must be a non-negative finite number, got {intensity}"
        )));
    }

    let in_shape = input.shape().to_vec();
    if in_shape[0] != 1 || in_shape[3] != 3 {
        return Err(EnhanceError::invalid_input(format!(
            "expected input tensor of shape (1, H, W, 3), got {:?}",
            in_shape
        )));
    }

    let curve = model.estimate(input)?;

    let actual_channels = curve.shape()[3];
    if actual_channels != CURVE_CHANNELS {
        return Err(EnhanceError::CurveShapeMismatch {
            expected: CURVE_CHANNELS,
            actual: actual_channels,
        });
    }
    if curve.shape()[..3] != in_shape[..3] {
        return Err(EnhanceError::invalid_input(format!(
            "correction curve shape {:?} does not match input shape {:?}",
            curve.shape(),
            in_shape
        )));
    }

    let curve = curve * intensity;

    let mut x = input.clone();
    for stage in 0..CURVE_STAGES {
        let a = curve.slice(s![.., .., .., 3 * stage..3 * (stage + 1)]);
        let delta = &x * &x - &x;
        x = x + &a * &delta;
    }

    tensor_to_image(&x)
}

/// Enhances a decoded image: normalizes it, then applies [`enhance`].
///
/// The returned raster always has the model's fixed 512x512 size,
/// independent of the original resolution.
pub fn enhance_image<M: CurveEstimator + ?Sized>(
    model: &M,
    img: &DynamicImage,
    intensity: f32,
) -> DceResult<RgbImage> {
    let input = normalize_image(img);
    enhance(model, &input, intensity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use ndarray::Array4;

    /// Synthetic estimator producing a spatially uniform curve with one
    /// coefficient per stage, shared across the three channels.
    struct StageCurve {
        per_stage: [f32; CURVE_STAGES],
    }

    impl CurveEstimator for StageCurve {
        fn estimate(&self, input: &Tensor4D) -> DceResult<Tensor4D> {
            let (h, w) = (input.shape()[1], input.shape()[2]);
            let mut curve = Array4::zeros((1, h, w, CURVE_CHANNELS));
            for (i, &a) in self.per_stage.iter().enumerate() {
                curve.slice_mut(s![.., .., .., 3 * i..3 * (i + 1)]).fill(a);
            }
            Ok(curve)
        }
    }

    /// Synthetic estimator producing a curve with a wrong channel count.
    struct TruncatedCurve {
        channels: usize,
    }

    impl CurveEstimator for TruncatedCurve {
        fn estimate(&self, input: &Tensor4D) -> DceResult<Tensor4D> {
            let (h, w) = (input.shape()[1], input.shape()[2]);
            Ok(Array4::zeros((1, h, w, self.channels)))
        }
    }

    fn gradient_image() -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(64, 48, |x, y| {
            Rgb([(x * 3) as u8, (y * 5) as u8, ((x + y) * 2) as u8])
        }))
    }

    /// Independent scalar reimplementation of the recurrence, used to pin
    /// the tensor implementation's arithmetic.
    fn scalar_reference(input: &Tensor4D, per_stage: &[f32; CURVE_STAGES], intensity: f32) -> RgbImage {
        let (h, w) = (input.shape()[1], input.shape()[2]);
        let mut img = RgbImage::new(w as u32, h as u32);
        for y in 0..h {
            for x in 0..w {
                for c in 0..3 {
                    let mut v = input[[0, y, x, c]];
                    for &a in per_stage {
                        let a = a * intensity;
                        v = v + a * (v * v - v);
                    }
                    img.get_pixel_mut(x as u32, y as u32)[c] =
                        (v * 255.0).clamp(0.0, 255.0).round() as u8;
                }
            }
        }
        img
    }

    #[test]
    fn test_zero_intensity_is_identity() {
        let model = StageCurve {
            per_stage: [-0.9, 0.4, -0.2, 0.0, 0.7, -0.5, 0.1, -0.3],
        };
        let input = normalize_image(&gradient_image());

        let enhanced = enhance(&model, &input, 0.0).unwrap();
        let baseline = tensor_to_image(&input).unwrap();
        assert_eq!(enhanced, baseline);
    }

    #[test]
    fn test_enhancement_is_deterministic() {
        let model = StageCurve {
            per_stage: [-0.3, -0.1, 0.2, -0.4, 0.0, 0.1, -0.2, 0.3],
        };
        let input = normalize_image(&gradient_image());

        let first = enhance(&model, &input, 3.0).unwrap();
        let second = enhance(&model, &input, 3.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_matches_scalar_reference() {
        let per_stage = [-0.3, -0.1, 0.2, -0.4, 0.0, 0.1, -0.2, 0.3];
        let model = StageCurve { per_stage };
        let input = normalize_image(&gradient_image());

        for intensity in [0.5, 1.0, 3.0] {
            let enhanced = enhance(&model, &input, intensity).unwrap();
            let reference = scalar_reference(&input, &per_stage, intensity);
            assert_eq!(enhanced, reference, "intensity {intensity}");
        }
    }

    #[test]
    fn test_wrong_channel_count_is_fatal_never_truncated() {
        let input = normalize_image(&gradient_image());

        for channels in [3, 12, 23, 25, 48] {
            let model = TruncatedCurve { channels };
            let err = enhance(&model, &input, 3.0).unwrap_err();
            match err {
                EnhanceError::CurveShapeMismatch { expected, actual } => {
                    assert_eq!(expected, CURVE_CHANNELS);
                    assert_eq!(actual, channels);
                }
                other => panic!("expected CurveShapeMismatch, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_stage_order_matters() {
        // Stages consume each other's output, so running them backwards
        // must generally produce a different raster.
        let per_stage = [-1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5];
        let mut reversed = per_stage;
        reversed.reverse();

        let input = normalize_image(&DynamicImage::ImageRgb8(ImageBuffer::from_pixel(
            8,
            8,
            Rgb([128, 128, 128]),
        )));

        let forward = enhance(&StageCurve { per_stage }, &input, 1.0).unwrap();
        let backward = enhance(&StageCurve { per_stage: reversed }, &input, 1.0).unwrap();
        assert_ne!(forward, backward);
    }

    #[test]
    fn test_high_intensity_output_is_pinned() {
        // Intermediate values are deliberately left unclamped between
        // stages; these pins detect any accidental change to that behavior.
        let input = normalize_image(&DynamicImage::ImageRgb8(ImageBuffer::from_pixel(
            8,
            8,
            Rgb([128, 128, 128]),
        )));

        // Effective coefficient -1.0 per stage: v <- 1 - (1 - v)^2 each
        // stage, converging to full brightness.
        let brighten = StageCurve {
            per_stage: [-0.1; CURVE_STAGES],
        };
        let enhanced = enhance(&brighten, &input, 10.0).unwrap();
        assert!(enhanced.pixels().all(|p| p.0 == [255, 255, 255]));

        // Effective coefficient +1.0 per stage: v <- v^2 each stage,
        // collapsing toward black.
        let darken = StageCurve {
            per_stage: [0.1; CURVE_STAGES],
        };
        let enhanced = enhance(&darken, &input, 10.0).unwrap();
        assert!(enhanced.pixels().all(|p| p.0 == [0, 0, 0]));

        // And the full mixed-stage case stays equal to the scalar reference.
        let per_stage = [-0.9, 0.4, -0.2, 0.0, 0.7, -0.5, 0.1, -0.3];
        let gradient = normalize_image(&gradient_image());
        let enhanced = enhance(&StageCurve { per_stage }, &gradient, 10.0).unwrap();
        let reference = scalar_reference(&gradient, &per_stage, 10.0);
        assert_eq!(enhanced, reference);
    }

    #[test]
    fn test_rejects_negative_or_non_finite_intensity() {
        let model = StageCurve {
            per_stage: [0.0; CURVE_STAGES],
        };
        let input = normalize_image(&gradient_image());

        assert!(enhance(&model, &input, -1.0).is_err());
        assert!(enhance(&model, &input, f32::NAN).is_err());
        assert!(enhance(&model, &input, f32::INFINITY).is_err());
    }

    #[test]
    fn test_enhanced_image_has_fixed_size() {
        let model = StageCurve {
            per_stage: [-0.2; CURVE_STAGES],
        };
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(123, 45, Rgb([40, 40, 40])));
        let enhanced = enhance_image(&model, &img, 3.0).unwrap();
        assert_eq!(enhanced.dimensions(), (512, 512));
    }
}
