//! Upload ingestion: resolving a payload into an ordered batch of images.
//!
//! An upload is either a single image file (png/jpg/jpeg, matched
//! case-insensitively) or a zip archive containing any number of such
//! files. Ingestion materializes every image under batch-scoped ephemeral
//! storage and returns the sources in a stable order: a single upload is a
//! one-element batch, and archive members keep the archive's internal
//! order. Non-image archive entries are extracted but not listed; entries
//! whose names would resolve outside the storage root are never written.

pub mod workspace;

pub use workspace::BatchWorkspace;

use crate::core::constants::{ARCHIVE_EXTENSION, IMAGE_EXTENSIONS};
use crate::core::errors::{DceResult, EnhanceError};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zip::ZipArchive;

/// Where an image source came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOrigin {
    /// The payload itself was a single image file.
    Upload,
    /// The image was a member of an uploaded archive.
    ArchiveMember,
}

/// One image in a batch: its display name, the path it was materialized
/// under, and its provenance.
///
/// Sources are read-only after ingestion and live only as long as the
/// workspace that owns their bytes.
#[derive(Debug, Clone)]
pub struct ImageSource {
    name: String,
    path: PathBuf,
    origin: SourceOrigin,
}

impl ImageSource {
    /// The display name of the source (the uploaded file name, or the
    /// archive member name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The path the image bytes were materialized under.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The provenance of the source.
    pub fn origin(&self) -> SourceOrigin {
        self.origin
    }
}

/// Resolves upload payloads into ordered image batches.
#[derive(Debug, Clone, Default)]
pub struct BatchIngestor {
    max_batch_size: Option<usize>,
}

impl BatchIngestor {
    /// Creates an ingestor with no batch size cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an ingestor that rejects batches with more images than `limit`.
    pub fn with_max_batch_size(limit: Option<usize>) -> Self {
        Self {
            max_batch_size: limit,
        }
    }

    /// Resolves `payload` into an ordered sequence of image sources
    /// materialized under the workspace root.
    ///
    /// # Errors
    ///
    /// * [`EnhanceError::UnsupportedFormat`] if the payload is neither a
    ///   recognized image nor an archive
    /// * [`EnhanceError::InvalidArchive`] if an archive payload cannot be
    ///   opened or parsed
    /// * [`EnhanceError::InvalidInput`] if the batch exceeds the configured
    ///   size cap
    ///
    /// An archive with zero recognized image entries yields an empty
    /// batch, not an error.
    pub fn ingest(
        &self,
        payload: &Path,
        workspace: &BatchWorkspace,
    ) -> DceResult<Vec<ImageSource>> {
        let sources = if has_image_extension(payload) {
            self.ingest_single(payload, workspace)?
        } else if has_extension(payload, ARCHIVE_EXTENSION) {
            self.ingest_archive(payload, workspace)?
        } else {
            return Err(EnhanceError::UnsupportedFormat {
                name: display_name(payload),
            });
        };

        if let Some(limit) = self.max_batch_size {
            if sources.len() > limit {
                return Err(EnhanceError::resource_limit_error(
                    "batch images",
                    limit,
                    sources.len(),
                ));
            }
        }

        Ok(sources)
    }

    /// Materializes a single uploaded image under the workspace root.
    fn ingest_single(
        &self,
        payload: &Path,
        workspace: &BatchWorkspace,
    ) -> DceResult<Vec<ImageSource>> {
        let name = display_name(payload);
        let dest = workspace.root().join(&name);
        fs::copy(payload, &dest)?;
        debug!("materialized single upload '{name}' at {}", dest.display());

        Ok(vec![ImageSource {
            name,
            path: dest,
            origin: SourceOrigin::Upload,
        }])
    }

    /// Extracts an archive into the workspace root and lists its image
    /// members in archive order.
    fn ingest_archive(
        &self,
        payload: &Path,
        workspace: &BatchWorkspace,
    ) -> DceResult<Vec<ImageSource>> {
        let file = File::open(payload).map_err(EnhanceError::invalid_archive)?;
        let mut archive = ZipArchive::new(file)?;

        let mut sources = Vec::new();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;

            // Entries whose names escape the extraction root (parent
            // traversal, absolute paths) are neutralized: nothing is
            // written for them, inside or outside the workspace.
            let Some(relative) = entry.enclosed_name() else {
                warn!("skipping archive entry with unsafe name: '{}'", entry.name());
                continue;
            };

            let dest = workspace.root().join(&relative);
            if entry.is_dir() {
                fs::create_dir_all(&dest)?;
                continue;
            }

            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&dest)?;
            std::io::copy(&mut entry, &mut out)?;

            if has_image_extension(&relative) {
                sources.push(ImageSource {
                    name: entry.name().to_string(),
                    path: dest,
                    origin: SourceOrigin::ArchiveMember,
                });
            } else {
                debug!("ignoring non-image archive entry: '{}'", entry.name());
            }
        }

        Ok(sources)
    }
}

/// Returns true if the path carries a recognized image extension,
/// matched case-insensitively.
fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
