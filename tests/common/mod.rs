#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use squeeze::{Compressor, FileKind, SqueezeError};
use tempfile::{Builder, TempDir};
use walkdir::WalkDir;

pub fn tempdir() -> anyhow::Result<TempDir> {
    Ok(Builder::new().prefix("squeeze-test-").tempdir()?)
}

/// A one-page PDF with an Info dictionary and an XMP stream.
pub fn write_pdf_with_metadata(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(Dictionary::new(), b"BT ET".to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let xmp_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "Metadata",
            "Subtype" => "XML",
        },
        b"<x:xmpmeta><dc:creator>Jane Roe</dc:creator></x:xmpmeta>".to_vec(),
    ));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "Metadata" => xmp_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Quarterly report"),
        "Author" => Object::string_literal("Jane Roe"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    doc.save(path)?;
    Ok(())
}

fn exif_segment() -> Vec<u8> {
    let payload: &[u8] = b"Exif\0\0MM\0*GPS 51.5N 0.1W Canon EOS (c) Jane Roe";
    let mut seg = vec![0xFF, 0xE1];
    seg.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    seg.extend_from_slice(payload);
    seg
}

/// A JPEG of the given size carrying an EXIF block right after SOI.
pub fn write_jpeg_with_exif(path: &Path, width: u32, height: u32) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }));
    let mut encoded = Vec::new();
    img.write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Jpeg)?;

    let mut with_exif = encoded[..2].to_vec();
    with_exif.extend(exif_segment());
    with_exif.extend_from_slice(&encoded[2..]);
    fs::write(path, with_exif)?;
    Ok(())
}

pub fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Relative paths of all files under `root`, sorted.
pub fn relative_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Copies the source verbatim; fails for names containing `fail_on`.
pub struct CopyCompressor {
    pub kind: FileKind,
    pub fail_on: Option<&'static str>,
    pub strip_fails: bool,
}

impl CopyCompressor {
    pub fn new(kind: FileKind) -> Self {
        Self {
            kind,
            fail_on: None,
            strip_fails: false,
        }
    }
}

impl Compressor for CopyCompressor {
    fn kind(&self) -> &FileKind {
        &self.kind
    }

    fn compress(&self, source: &Path, destination: &Path) -> squeeze::Result<()> {
        let name = source.file_name().unwrap().to_string_lossy();
        if self.fail_on.is_some_and(|needle| name.contains(needle)) {
            return Err(SqueezeError::ConversionFailure(format!("engine rejected {name}")));
        }
        fs::copy(source, destination).map_err(|e| SqueezeError::path(destination, e))?;
        if self.strip_fails {
            return Err(SqueezeError::MetadataStripFailure("stub".to_string()));
        }
        Ok(())
    }
}

/// A stand-in for `gs`: copies its last argument to `-sOutputFile=`, or
/// writes a truncated file there and exits with `exit_code`.
#[cfg(unix)]
pub fn fake_ghostscript(dir: &Path, exit_code: i32) -> anyhow::Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let script = if exit_code == 0 {
        r#"#!/bin/sh
out=""
last=""
for arg in "$@"; do
  case "$arg" in
    -sOutputFile=*) out="${arg#-sOutputFile=}" ;;
  esac
  last="$arg"
done
cp "$last" "$out"
"#
        .to_string()
    } else {
        // leaves a truncated file behind, as an interrupted Ghostscript does
        format!(
            r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    -sOutputFile=*) printf '%%PDF-1.6 truncated' > "${{arg#-sOutputFile=}}" ;;
  esac
done
echo 'Error: /syntaxerror in pdf' >&2
exit {exit_code}
"#
        )
    };

    let path = dir.join(format!("fake-gs-{exit_code}"));
    fs::write(&path, script)?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}
