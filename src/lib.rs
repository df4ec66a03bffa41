//! # zero-dce
//!
//! A Rust library that brightens low-light images with a pretrained
//! Zero-DCE curve-estimation ONNX model.
//!
//! The model predicts, per pixel, a set of correction coefficients; the
//! library applies them through a fixed number of recurrence stages to
//! approximate a learned tone curve. Uploads are accepted either as a
//! single image or as a zip archive of images, staged in batch-scoped
//! temporary storage that is always cleaned up, and processed with
//! per-image failure isolation.
//!
//! ## Components
//!
//! - **Model loading**: probes an ordered list of candidate paths and
//!   loads the first parseable artifact ([`core::inference`])
//! - **Preprocessing**: normalizes any input image into the fixed
//!   `(1, 512, 512, 3)` tensor the model expects ([`processors`])
//! - **Enhancement**: the 8-stage curve recurrence ([`enhancer`])
//! - **Ingestion**: single-image and archive uploads with traversal-safe
//!   extraction ([`ingest`])
//! - **Pipeline**: batch sequencing, failure isolation, and guaranteed
//!   storage cleanup ([`pipeline`])
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zero_dce::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EnhancerConfig::default();
//! let model = CurveModel::from_config(&config)?;
//! let pipeline = EnhancePipeline::new(model, config)?;
//!
//! let result = pipeline.run(Path::new("uploads/night-shots.zip"))?;
//! for outcome in &result.outcomes {
//!     match outcome {
//!         ItemOutcome::Enhanced { source, enhanced, .. } => {
//!             enhanced.save(format!("out/{}", source.name()))?;
//!         }
//!         ItemOutcome::Failed { source, error } => {
//!             eprintln!("{}: {error}", source.name());
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod enhancer;
pub mod ingest;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use zero_dce::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{
        init_tracing, CurveEstimator, CurveModel, DceResult, EnhanceError, EnhancerConfig,
    };
    pub use crate::enhancer::{enhance, enhance_image};
    pub use crate::ingest::{BatchIngestor, BatchWorkspace, ImageSource, SourceOrigin};
    pub use crate::pipeline::{
        BatchResult, BatchStats, CollectingSink, EnhancePipeline, ItemOutcome, OutputSink,
    };
    pub use crate::utils::load_image;
}
