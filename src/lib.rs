//! PDF and JPEG compression with metadata removal.
//!
//! Shared core of the `pdftool` and `imgtool` binaries. A run either targets
//! one file or walks a folder (optionally recursively), mirrors the folder
//! structure into an output folder, and hands each file to a [`Compressor`]:
//! Ghostscript for PDFs, the `image` crate and `jpeg-encoder` for JPEGs.
//! Files are processed strictly one after another.

pub mod cli;
pub mod compressor;
pub mod confirm;
pub mod error;
pub mod invoke;
pub mod jpeg;
pub mod logging;
pub mod pdf;
pub mod plan;
pub mod report;
pub mod run;
pub mod select;
pub mod traverse;

pub use compressor::Compressor;
pub use error::{Result, SqueezeError};
pub use jpeg::{ImageOptions, JpegCompressor, Quality, ResizeBounds};
pub use pdf::{GhostscriptCompressor, PdfOptions, Preset};
pub use plan::{BatchPlan, Job};
pub use report::{OutcomeRecord, RunSummary, Status};
pub use run::{run, RunOptions};
pub use select::{FileKind, Mode, Selection, JPEG, PDF};
