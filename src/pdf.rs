//! PDF compression through Ghostscript, followed by a metadata pass.
//!
//! Ghostscript rewrites the file with one of its `-dPDFSETTINGS` presets.
//! It leaves a fresh document information dictionary behind (Producer,
//! CreationDate and whatever Title/Author it carried over), so the output
//! is reopened with lopdf and every Info and XMP entry is dropped.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use lopdf::{Document, Object, ObjectId};

use crate::compressor::Compressor;
use crate::error::{Result, SqueezeError};
use crate::select::{FileKind, PDF};

/// Ghostscript `-dPDFSETTINGS` presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// Lowest quality, smallest size (72 dpi)
    Screen,
    /// Medium quality for e-books (150 dpi)
    Ebook,
    /// High quality for printing (300 dpi)
    Printer,
    /// Maximum quality for professional use (300 dpi+, colour preserving)
    Prepress,
    /// Ghostscript's own general-purpose defaults
    Default,
}

impl Preset {
    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Screen => "screen",
            Preset::Ebook => "ebook",
            Preset::Printer => "printer",
            Preset::Prepress => "prepress",
            Preset::Default => "default",
        }
    }

    /// The Ghostscript argument selecting this preset
    pub fn pdfsettings_arg(self) -> String {
        format!("-dPDFSETTINGS=/{}", self.as_str())
    }
}

/// Options for PDF compression
#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub preset: Preset,
    /// Ghostscript executable
    pub ghostscript: PathBuf,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            preset: Preset::Ebook,
            ghostscript: PathBuf::from("gs"),
        }
    }
}

/// Full argument list for one Ghostscript run.
pub fn ghostscript_args(preset: Preset, source: &Path, destination: &Path) -> Vec<OsString> {
    let mut output_arg = OsString::from("-sOutputFile=");
    output_arg.push(destination.as_os_str());

    vec![
        OsString::from("-sDEVICE=pdfwrite"),
        OsString::from("-dCompatibilityLevel=1.6"),
        OsString::from(preset.pdfsettings_arg()),
        OsString::from("-dNOPAUSE"),
        OsString::from("-dQUIET"),
        OsString::from("-dBATCH"),
        output_arg,
        source.as_os_str().to_os_string(),
    ]
}

pub struct GhostscriptCompressor {
    options: PdfOptions,
}

impl GhostscriptCompressor {
    pub fn new(options: PdfOptions) -> Self {
        Self { options }
    }

    fn run_ghostscript(&self, source: &Path, destination: &Path) -> Result<()> {
        let program: &OsStr = self.options.ghostscript.as_os_str();
        let args = ghostscript_args(self.options.preset, source, destination);
        tracing::debug!("Running {:?} {:?}", program, args);

        let output = Command::new(program).args(&args).output().map_err(|e| {
            SqueezeError::ConversionFailure(format!(
                "failed to execute {}: {e}",
                self.options.ghostscript.display()
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(SqueezeError::ConversionFailure(format!(
                "Ghostscript failed on {} (exit code {}): {}",
                source.display(),
                output
                    .status
                    .code()
                    .map_or_else(|| "unknown".to_string(), |c| c.to_string()),
                detail
            )));
        }

        let written = std::fs::metadata(destination).map_or(false, |m| m.len() > 0);
        if !written {
            return Err(SqueezeError::ConversionFailure(format!(
                "Ghostscript reported success but wrote no file at {}",
                destination.display()
            )));
        }

        Ok(())
    }
}

impl Compressor for GhostscriptCompressor {
    fn kind(&self) -> &FileKind {
        &PDF
    }

    /// Ghostscript writes to a staging file next to `destination`, which only
    /// replaces the destination once Ghostscript has succeeded. A failed run
    /// leaves an existing destination as it was.
    fn compress(&self, source: &Path, destination: &Path) -> Result<()> {
        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut builder = tempfile::Builder::new();
        builder.prefix(".squeeze-").suffix(".pdf");
        // tempfile would create the output 0600
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o644));
        }
        let staging = builder
            .tempfile_in(dir)
            .map_err(|e| SqueezeError::path(dir, e))?;

        self.run_ghostscript(source, staging.path())?;
        staging
            .persist(destination)
            .map_err(|e| SqueezeError::path(destination, e.error))?;

        strip_pdf_metadata(destination)
    }
}

/// Metadata still present in a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFindings {
    /// The trailer still points at a document information dictionary
    pub info_dictionary: bool,
    /// Objects carrying a `/Metadata` entry
    pub metadata_refs: Vec<ObjectId>,
    /// `/Type /Metadata` streams (XMP packets)
    pub xmp_streams: Vec<ObjectId>,
}

impl MetadataFindings {
    pub fn is_clean(&self) -> bool {
        !self.info_dictionary && self.metadata_refs.is_empty() && self.xmp_streams.is_empty()
    }
}

/// Scan a document for Info and XMP metadata.
pub fn find_metadata(doc: &Document) -> MetadataFindings {
    let mut findings = MetadataFindings {
        info_dictionary: doc.trailer.has(b"Info"),
        ..Default::default()
    };

    for (id, object) in doc.objects.iter() {
        let dict = match object {
            Object::Dictionary(dict) => dict,
            Object::Stream(stream) => &stream.dict,
            _ => continue,
        };

        if dict.has(b"Metadata") {
            findings.metadata_refs.push(*id);
        }
        if is_metadata_stream(object) {
            findings.xmp_streams.push(*id);
        }
    }

    findings
}

fn is_metadata_stream(object: &Object) -> bool {
    match object {
        Object::Stream(stream) => matches!(
            stream.dict.get(b"Type"),
            Ok(Object::Name(name)) if name.as_slice() == b"Metadata"
        ),
        _ => false,
    }
}

/// Remove the Info dictionary and all XMP metadata from a loaded document.
pub fn remove_metadata(doc: &mut Document) {
    if let Some(Object::Reference(id)) = doc.trailer.remove(b"Info") {
        doc.objects.remove(&id);
    }

    let xmp_ids: Vec<ObjectId> = doc
        .objects
        .iter()
        .filter(|(_, object)| is_metadata_stream(object))
        .map(|(id, _)| *id)
        .collect();
    for id in xmp_ids {
        doc.objects.remove(&id);
    }

    for object in doc.objects.values_mut() {
        match object {
            Object::Dictionary(dict) => {
                dict.remove(b"Metadata");
            }
            Object::Stream(stream) => {
                stream.dict.remove(b"Metadata");
            }
            _ => {}
        }
    }

    doc.prune_objects();
}

/// Strip metadata from the PDF at `path`, rewriting it in place.
///
/// The rewritten file is reloaded and checked; anything left behind is a
/// [`SqueezeError::MetadataStripFailure`].
pub fn strip_pdf_metadata(path: &Path) -> Result<()> {
    let strip_err = |what: &str, e: &dyn std::fmt::Display| {
        SqueezeError::MetadataStripFailure(format!("{what} {}: {e}", path.display()))
    };

    let mut doc = Document::load(path).map_err(|e| strip_err("cannot load", &e))?;
    remove_metadata(&mut doc);
    doc.save(path).map_err(|e| strip_err("cannot save", &e))?;

    let reloaded = Document::load(path).map_err(|e| strip_err("cannot reload", &e))?;
    let findings = find_metadata(&reloaded);
    if !findings.is_clean() {
        return Err(SqueezeError::MetadataStripFailure(format!(
            "metadata still present in {}: {:?}",
            path.display(),
            findings
        )));
    }

    Ok(())
}
