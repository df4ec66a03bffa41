//! Curve model loading and ONNX Runtime inference.
//!
//! The curve model is an opaque artifact: a function from a normalized
//! NHWC image tensor to a per-pixel, per-stage correction tensor. This
//! module locates the artifact among an ordered list of candidate paths,
//! loads it once into a [`CurveModel`], and exposes inference through the
//! [`CurveEstimator`] trait so the enhancement algorithm never depends on
//! ONNX Runtime directly.

use crate::core::config::EnhancerConfig;
use crate::core::errors::{DceResult, EnhanceError};
use crate::core::Tensor4D;
use ndarray::ArrayView4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// The seam between the opaque curve model and the enhancement algorithm.
///
/// Implementations map a normalized image tensor of shape
/// `(1, 512, 512, 3)` with values in `[0, 1]` to a correction tensor of
/// shape `(1, 512, 512, 24)`. Inference must not mutate the model; the
/// same input always yields the same output.
pub trait CurveEstimator {
    /// Runs the model on a normalized image tensor and returns the raw
    /// correction curve tensor.
    fn estimate(&self, input: &Tensor4D) -> DceResult<Tensor4D>;
}

/// A loaded curve-estimation model backed by an ONNX Runtime session.
///
/// Constructed once at startup and passed by reference into enhancement
/// calls; there is no hidden process-wide cache and no hot-reload. The
/// session sits behind a mutex because ONNX Runtime inference takes the
/// session mutably, so concurrent callers serialize on the lock.
pub struct CurveModel {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    model_path: PathBuf,
}

impl std::fmt::Debug for CurveModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurveModel")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_path", &self.model_path)
            .finish()
    }
}

impl CurveModel {
    /// Loads the first loadable model among the configured candidate paths.
    ///
    /// Equivalent to [`CurveModel::from_candidates`] over
    /// [`EnhancerConfig::model_paths`].
    pub fn from_config(config: &EnhancerConfig) -> DceResult<Self> {
        Self::from_candidates(&config.model_paths)
    }

    /// Probes an ordered list of candidate filesystem paths and loads the
    /// first one that both exists and parses successfully.
    ///
    /// A candidate that exists but fails to parse is logged and skipped;
    /// it only becomes fatal once every candidate is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`EnhanceError::ModelUnavailable`] listing the probed paths
    /// when no candidate yields a loadable artifact.
    pub fn from_candidates<P: AsRef<Path>>(candidates: &[P]) -> DceResult<Self> {
        let mut tried = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let path = candidate.as_ref();
            tried.push(path.to_path_buf());

            if !path.exists() {
                debug!("model candidate does not exist: {}", path.display());
                continue;
            }

            match Self::load(path) {
                Ok(model) => {
                    info!("loaded curve model from {}", path.display());
                    return Ok(model);
                }
                Err(e) => {
                    warn!(
                        "failed to load curve model from {}: {e}, trying next candidate",
                        path.display()
                    );
                }
            }
        }

        Err(EnhanceError::ModelUnavailable { tried })
    }

    /// Loads a model from a single path.
    fn load(path: &Path) -> DceResult<Self> {
        let session = Session::builder().and_then(|b| b.commit_from_file(path))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| {
                EnhanceError::invalid_input(format!(
                    "model at '{}' declares no inputs",
                    path.display()
                ))
            })?;

        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| {
                EnhanceError::invalid_input(format!(
                    "model at '{}' declares no outputs",
                    path.display()
                ))
            })?;

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            model_path: path.to_path_buf(),
        })
    }

    /// Returns the path the model was loaded from.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl CurveEstimator for CurveModel {
    fn estimate(&self, input: &Tensor4D) -> DceResult<Tensor4D> {
        let input_tensor = TensorRef::from_array_view(input.view())?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session_guard = self.session.lock().map_err(|_| {
            EnhanceError::invalid_input("failed to acquire curve model session lock")
        })?;

        let outputs = session_guard.run(inputs)?;

        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()?;

        if output_shape.len() != 4 {
            return Err(EnhanceError::invalid_input(format!(
                "curve model produced a {}D output tensor with shape {:?}, expected 4D",
                output_shape.len(),
                output_shape
            )));
        }

        let shape = (
            output_shape[0] as usize,
            output_shape[1] as usize,
            output_shape[2] as usize,
            output_shape[3] as usize,
        );

        let view = ArrayView4::from_shape(shape, output_data).map_err(EnhanceError::Tensor)?;
        Ok(view.to_owned())
    }
}
