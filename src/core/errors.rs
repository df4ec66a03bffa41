//! Error types for the enhancement pipeline.
//!
//! This module defines the errors that can occur while locating and loading
//! the curve model, ingesting an upload, and enhancing individual images.
//! Batch-level errors (`ModelUnavailable`, `UnsupportedFormat`,
//! `InvalidArchive`) stop a batch before any per-image work; everything else
//! is recorded per image and never aborts the surrounding batch.

use std::path::PathBuf;
use thiserror::Error;

/// Enum representing different stages of processing in the enhancement pipeline.
///
/// This enum is used to identify which stage of the pipeline an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred while normalizing an image into the model input tensor.
    Normalization,
    /// Error occurred while applying the enhancement recurrence.
    Enhancement,
    /// Error occurred while extracting archive entries.
    Extraction,
    /// Error occurred while releasing batch storage.
    Cleanup,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Normalization => write!(f, "normalization"),
            ProcessingStage::Enhancement => write!(f, "enhancement"),
            ProcessingStage::Extraction => write!(f, "extraction"),
            ProcessingStage::Cleanup => write!(f, "cleanup"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Enum representing the errors that can occur in the enhancement pipeline.
#[derive(Error, Debug)]
pub enum EnhanceError {
    /// No candidate location yielded a loadable model artifact.
    ///
    /// Fatal at startup; no enhancement can proceed.
    #[error("no loadable curve model found among {} candidate path(s)", tried.len())]
    ModelUnavailable {
        /// The candidate paths that were probed, in order.
        tried: Vec<PathBuf>,
    },

    /// The model produced a correction curve with an unexpected channel count.
    ///
    /// Indicates a model/algorithm version mismatch. The curve is never
    /// silently truncated to fit.
    #[error("correction curve has {actual} channel(s), expected {expected}")]
    CurveShapeMismatch {
        /// The channel count the recurrence requires.
        expected: usize,
        /// The channel count the model actually produced.
        actual: usize,
    },

    /// The upload payload's type could not be determined.
    ///
    /// Fatal for the whole batch at ingestion time.
    #[error("unsupported upload format: '{name}'")]
    UnsupportedFormat {
        /// The display name of the rejected payload.
        name: String,
    },

    /// The upload archive could not be opened or parsed.
    ///
    /// Fatal for the whole batch at ingestion time.
    #[error("invalid archive")]
    InvalidArchive(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Error occurred while decoding an image.
    #[error("image load")]
    ImageLoad(#[from] image::ImageError),

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Convenient result alias for enhancement operations.
pub type DceResult<T> = Result<T, EnhanceError>;

/// Implementation of EnhanceError with utility functions for creating errors.
impl EnhanceError {
    /// Creates an EnhanceError for normalization operations.
    ///
    /// # Arguments
    ///
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    ///
    /// # Returns
    ///
    /// An EnhanceError instance.
    pub fn normalization(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::Normalization,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an EnhanceError for enhancement operations.
    ///
    /// # Arguments
    ///
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    ///
    /// # Returns
    ///
    /// An EnhanceError instance.
    pub fn enhancement(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::Enhancement,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an EnhanceError for archive extraction operations.
    ///
    /// # Arguments
    ///
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    ///
    /// # Returns
    ///
    /// An EnhanceError instance.
    pub fn extraction(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::Extraction,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an EnhanceError for storage cleanup operations.
    ///
    /// # Arguments
    ///
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    ///
    /// # Returns
    ///
    /// An EnhanceError instance.
    pub fn cleanup(context: &str, error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Processing {
            kind: ProcessingStage::Cleanup,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an EnhanceError for invalid input.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing the invalid input.
    ///
    /// # Returns
    ///
    /// An EnhanceError instance.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates an EnhanceError for configuration errors.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing the configuration error.
    ///
    /// # Returns
    ///
    /// An EnhanceError instance.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates an EnhanceError for resource limit errors.
    ///
    /// # Arguments
    ///
    /// * `resource` - The resource that exceeded its limit.
    /// * `limit` - The maximum allowed limit.
    /// * `requested` - The requested amount.
    ///
    /// # Returns
    ///
    /// An EnhanceError instance.
    pub fn resource_limit_error(resource: &str, limit: usize, requested: usize) -> Self {
        Self::InvalidInput {
            message: format!(
                "Resource limit exceeded for {}: requested {} but limit is {}",
                resource, requested, limit
            ),
        }
    }

    /// Creates an EnhanceError for a batch archive that cannot be read.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying error that caused this error.
    ///
    /// # Returns
    ///
    /// An EnhanceError instance.
    pub fn invalid_archive(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidArchive(Box::new(error))
    }

    /// Returns true if this error is fatal for a whole batch rather than a
    /// single image.
    ///
    /// Batch-fatal errors stop the pipeline before any per-image work;
    /// everything else is isolated to the item that produced it.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            Self::ModelUnavailable { .. } | Self::UnsupportedFormat { .. } | Self::InvalidArchive(_)
        )
    }
}

impl From<zip::result::ZipError> for EnhanceError {
    fn from(error: zip::result::ZipError) -> Self {
        Self::InvalidArchive(Box::new(error))
    }
}
