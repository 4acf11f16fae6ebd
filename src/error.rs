//! Error type shared by both tools.

use std::path::PathBuf;

/// Error type for compression runs
#[derive(Debug, thiserror::Error)]
pub enum SqueezeError {
    /// Bad or contradictory command-line input. Nothing has been processed.
    #[error("{0}")]
    InvalidArguments(String),

    /// A filesystem path could not be read, created or removed.
    #[error("{}: {source}", path.display())]
    PathError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external engine failed or the source could not be decoded.
    #[error("Conversion failed: {0}")]
    ConversionFailure(String),

    /// Compression succeeded but the metadata pass did not. The compressed
    /// output stays on disk.
    #[error("Metadata removal failed: {0}")]
    MetadataStripFailure(String),
}

impl SqueezeError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        SqueezeError::InvalidArguments(msg.into())
    }

    pub fn path(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SqueezeError::PathError {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for an error that ends the run.
    pub fn exit_code(&self) -> u8 {
        match self {
            SqueezeError::InvalidArguments(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, SqueezeError>;
