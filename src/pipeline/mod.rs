//! The batch pipeline driver.
//!
//! The driver owns the sequencing of one upload-to-completion cycle:
//! acquire a fresh workspace, ingest the payload into an ordered batch,
//! enhance each image in order, stream results to an output sink, and
//! release the workspace exactly once regardless of how the batch ended.
//!
//! Per-image failures are data, not control flow: each source resolves to
//! a tagged [`ItemOutcome`], and a decode or enhancement failure on one
//! image never aborts the rest of the batch. Only ingestion-level failures
//! (unsupported payload, unreadable archive) surface as batch errors, and
//! even then the workspace is still released.

use crate::core::config::EnhancerConfig;
use crate::core::errors::{DceResult, EnhanceError};
use crate::core::CurveEstimator;
use crate::enhancer;
use crate::ingest::{BatchIngestor, BatchWorkspace, ImageSource};
use crate::utils::{dynamic_to_rgb, load_image};
use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Receives per-image results as the batch progresses.
///
/// The pipeline calls exactly one of these methods per ingested source, in
/// batch order, as soon as that source finishes.
pub trait OutputSink {
    /// Called with the decoded original and the enhanced raster for a
    /// successfully processed source.
    fn deliver(&mut self, source: ImageSource, original: RgbImage, enhanced: RgbImage);

    /// Called when a source failed to decode or enhance.
    fn report_failure(&mut self, source: ImageSource, error: EnhanceError);
}

/// The tagged result of processing one image source.
#[derive(Debug)]
pub enum ItemOutcome {
    /// The source was decoded and enhanced.
    Enhanced {
        /// The ingested source.
        source: ImageSource,
        /// The original image as decoded, at its native resolution.
        original: RgbImage,
        /// The enhanced 512x512 raster.
        enhanced: RgbImage,
    },
    /// The source failed to decode or enhance; the rest of the batch is
    /// unaffected.
    Failed {
        /// The ingested source.
        source: ImageSource,
        /// The error that stopped this source.
        error: EnhanceError,
    },
}

impl ItemOutcome {
    /// The source this outcome belongs to.
    pub fn source(&self) -> &ImageSource {
        match self {
            ItemOutcome::Enhanced { source, .. } => source,
            ItemOutcome::Failed { source, .. } => source,
        }
    }

    /// Returns true if the source was successfully enhanced.
    pub fn is_enhanced(&self) -> bool {
        matches!(self, ItemOutcome::Enhanced { .. })
    }
}

/// Summary counters for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Number of sources the batch contained.
    pub total: usize,
    /// Number of sources successfully enhanced.
    pub enhanced: usize,
    /// Number of sources that failed.
    pub failed: usize,
}

/// The collected result of one batch run.
#[derive(Debug)]
pub struct BatchResult {
    /// Per-source outcomes, in batch order.
    pub outcomes: Vec<ItemOutcome>,
    /// Summary counters.
    pub stats: BatchStats,
    /// Where the batch's ephemeral storage lived. Released (removed) by
    /// the time the result is returned.
    pub workspace_root: PathBuf,
}

/// An [`OutputSink`] that collects outcomes in batch order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    outcomes: Vec<ItemOutcome>,
}

impl CollectingSink {
    /// Consumes the sink and returns the collected outcomes.
    pub fn into_outcomes(self) -> Vec<ItemOutcome> {
        self.outcomes
    }
}

impl OutputSink for CollectingSink {
    fn deliver(&mut self, source: ImageSource, original: RgbImage, enhanced: RgbImage) {
        self.outcomes.push(ItemOutcome::Enhanced {
            source,
            original,
            enhanced,
        });
    }

    fn report_failure(&mut self, source: ImageSource, error: EnhanceError) {
        self.outcomes.push(ItemOutcome::Failed { source, error });
    }
}

/// Sequences ingestion, per-image enhancement, and workspace cleanup for
/// one upload at a time.
#[derive(Debug)]
pub struct EnhancePipeline<M: CurveEstimator> {
    model: M,
    config: EnhancerConfig,
    ingestor: BatchIngestor,
}

impl<M: CurveEstimator> EnhancePipeline<M> {
    /// Creates a pipeline from a loaded model and a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(model: M, config: EnhancerConfig) -> DceResult<Self> {
        config.validate()?;
        let ingestor = BatchIngestor::with_max_batch_size(config.max_batch_size);
        Ok(Self {
            model,
            config,
            ingestor,
        })
    }

    /// The configuration the pipeline runs with.
    pub fn config(&self) -> &EnhancerConfig {
        &self.config
    }

    /// Processes one upload and collects every outcome.
    ///
    /// Convenience wrapper over [`EnhancePipeline::run_with_sink`] using a
    /// [`CollectingSink`].
    pub fn run(&self, payload: &Path) -> DceResult<BatchResult> {
        let workspace = BatchWorkspace::create()?;
        let workspace_root = workspace.root().to_path_buf();

        let mut sink = CollectingSink::default();
        let outcome = self.run_batch(payload, &workspace, &mut sink);
        Self::release_workspace(workspace);

        let stats = outcome?;
        Ok(BatchResult {
            outcomes: sink.into_outcomes(),
            stats,
            workspace_root,
        })
    }

    /// Processes one upload, streaming each result to `sink` as soon as it
    /// is ready.
    ///
    /// # Errors
    ///
    /// Returns a batch-level error if ingestion fails; per-image failures
    /// are reported through the sink instead. The batch workspace is
    /// released on every path.
    pub fn run_with_sink(&self, payload: &Path, sink: &mut dyn OutputSink) -> DceResult<BatchStats> {
        let workspace = BatchWorkspace::create()?;
        let outcome = self.run_batch(payload, &workspace, sink);
        Self::release_workspace(workspace);
        outcome
    }

    fn release_workspace(workspace: BatchWorkspace) {
        if let Err(e) = workspace.release() {
            warn!("failed to release batch workspace: {e}");
        }
    }

    fn run_batch(
        &self,
        payload: &Path,
        workspace: &BatchWorkspace,
        sink: &mut dyn OutputSink,
    ) -> DceResult<BatchStats> {
        let sources = self.ingestor.ingest(payload, workspace)?;
        debug!("ingested {} image source(s)", sources.len());

        let mut stats = BatchStats {
            total: sources.len(),
            ..BatchStats::default()
        };

        for source in sources {
            match self.process_source(&source) {
                Ok((original, enhanced)) => {
                    stats.enhanced += 1;
                    sink.deliver(source, original, enhanced);
                }
                Err(error) => {
                    warn!("failed to enhance '{}': {error}", source.name());
                    stats.failed += 1;
                    sink.report_failure(source, error);
                }
            }
        }

        info!(
            "batch finished: {} enhanced, {} failed of {}",
            stats.enhanced, stats.failed, stats.total
        );
        Ok(stats)
    }

    fn process_source(&self, source: &ImageSource) -> DceResult<(RgbImage, RgbImage)> {
        let decoded = load_image(source.path())?;
        let original = dynamic_to_rgb(&decoded);
        let enhanced = enhancer::enhance_image(&self.model, &decoded, self.config.intensity)?;
        Ok((original, enhanced))
    }
}
