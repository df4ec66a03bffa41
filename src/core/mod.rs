//! The core module of the enhancement pipeline.
//!
//! This module contains the fundamental components of the pipeline,
//! including:
//! - Configuration management
//! - Constants used throughout the pipeline
//! - Error handling
//! - Curve model loading and inference
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;

pub use config::{default_model_paths, EnhancerConfig};
pub use constants::*;
pub use errors::{DceResult, EnhanceError, ProcessingStage};
pub use inference::{CurveEstimator, CurveModel};

/// A 4-dimensional f32 tensor in NHWC layout.
///
/// Normalized images have shape `(1, 512, 512, 3)`; correction curves have
/// shape `(1, 512, 512, 24)`.
pub type Tensor4D = ndarray::Array4<f32>;

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and
/// formatting layer. It's typically called at the start of an application to
/// enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
