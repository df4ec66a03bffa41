//! Configuration for the enhancement pipeline.
//!
//! The configuration is a plain serde-deserializable struct so deployments
//! can ship it as JSON next to the model artifact. Defaults mirror the
//! layouts the model has historically been deployed with.

use crate::core::constants::{DEFAULT_INTENSITY, DEFAULT_MAX_BATCH_SIZE};
use crate::core::errors::{DceResult, EnhanceError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for building an enhancement pipeline.
///
/// Carries the ordered list of candidate model locations, the enhancement
/// intensity applied to every image in a batch, and an optional cap on the
/// number of images accepted from a single upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancerConfig {
    /// Candidate filesystem locations for the curve model artifact, probed
    /// in order. The first candidate that exists and parses wins.
    pub model_paths: Vec<PathBuf>,
    /// Enhancement intensity. Must be positive; interactive callers are
    /// expected to stay within [1.0, 10.0].
    pub intensity: f32,
    /// Maximum number of images accepted from one upload. `None` disables
    /// the cap.
    pub max_batch_size: Option<usize>,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            model_paths: default_model_paths(),
            intensity: DEFAULT_INTENSITY,
            max_batch_size: Some(DEFAULT_MAX_BATCH_SIZE),
        }
    }
}

/// The default candidate locations for the model artifact.
///
/// Mirrors the deployment layouts the model is shipped with: a `models/`
/// directory next to the working directory, one level up (when running from
/// a `src/`-style subdirectory), and the working directory itself as a
/// fallback.
pub fn default_model_paths() -> Vec<PathBuf> {
    [
        "models/zero_dce.onnx",
        "../models/zero_dce.onnx",
        "./models/zero_dce.onnx",
        "zero_dce.onnx",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

impl EnhancerConfig {
    /// Creates a configuration with the given intensity and default
    /// candidate model paths.
    pub fn with_intensity(intensity: f32) -> Self {
        Self {
            intensity,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The intensity is not a finite, positive number
    /// * The candidate model path list is empty
    /// * The batch size cap is set to zero
    pub fn validate(&self) -> DceResult<()> {
        if !self.intensity.is_finite() || self.intensity <= 0.0 {
            return Err(EnhanceError::config_error(format!(
                "intensity must be a positive finite number, got {}",
                self.intensity
            )));
        }

        if self.model_paths.is_empty() {
            return Err(EnhanceError::config_error(
                "at least one candidate model path is required",
            ));
        }

        if self.max_batch_size == Some(0) {
            return Err(EnhanceError::config_error(
                "max_batch_size must be at least 1 when set",
            ));
        }

        Ok(())
    }
}
