//! The seam between orchestration and the engines that do the work.

use std::path::Path;

use crate::error::Result;
use crate::select::FileKind;

/// Compresses one file and strips its metadata.
///
/// Implementations write `destination` and leave `source` alone. A failure
/// after `destination` was written (metadata removal) must be reported as
/// [`crate::SqueezeError::MetadataStripFailure`] and leaves the file in place.
pub trait Compressor {
    /// Which files this compressor accepts.
    fn kind(&self) -> &FileKind;

    fn compress(&self, source: &Path, destination: &Path) -> Result<()>;
}
