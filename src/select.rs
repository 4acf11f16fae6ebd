//! Input selection: one file, or one folder tree.

use std::path::{Path, PathBuf};

use crate::error::{Result, SqueezeError};

/// The family of files a tool accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileKind {
    /// Name used in messages ("PDF", "JPG")
    pub label: &'static str,
    /// Accepted extensions, lowercase, without the dot
    pub extensions: &'static [&'static str],
    /// Characters refused in single-file paths
    pub forbidden_chars: &'static str,
}

pub const PDF: FileKind = FileKind {
    label: "PDF",
    extensions: &["pdf"],
    forbidden_chars: "|;`><{}#*",
};

pub const JPEG: FileKind = FileKind {
    label: "JPG",
    extensions: &["jpg", "jpeg"],
    forbidden_chars: "",
};

impl FileKind {
    /// Case-insensitive extension check; `.JpEg` matches `jpeg`.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|accepted| ext.eq_ignore_ascii_case(accepted))
            })
    }

    /// `(.jpg, .jpeg)`
    pub fn describe_extensions(&self) -> String {
        let dotted: Vec<String> = self.extensions.iter().map(|ext| format!(".{ext}")).collect();
        format!("({})", dotted.join(", "))
    }

    fn check_safe_chars(&self, role: &str, path: &Path) -> Result<()> {
        let text = path.to_string_lossy();
        if text.chars().any(|c| self.forbidden_chars.contains(c)) {
            let listed: Vec<String> = self.forbidden_chars.chars().map(String::from).collect();
            return Err(SqueezeError::invalid(format!(
                "{role} \"{}\" contains invalid characters: [{}]",
                path.display(),
                listed.join(" ")
            )));
        }
        Ok(())
    }
}

/// Raw selection flags as they come off the command line.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub input_folder: Option<PathBuf>,
    pub output_folder: Option<PathBuf>,
    pub recursive: bool,
}

/// What a run operates on after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Single {
        input: PathBuf,
        output: Option<PathBuf>,
    },
    Batch {
        input_folder: PathBuf,
        output_folder: Option<PathBuf>,
        recursive: bool,
    },
}

impl Selection {
    /// Checks which flags go together without touching the filesystem.
    pub fn shape(self) -> Result<Mode> {
        match (self.input, self.input_folder) {
            (Some(_), Some(_)) => Err(SqueezeError::invalid(
                "--input and --input-folder cannot be used together",
            )),
            (None, None) => Err(SqueezeError::invalid(
                "one of --input or --input-folder is required",
            )),
            (Some(input), None) => {
                if self.recursive {
                    return Err(SqueezeError::invalid(
                        "The --recursive flag is only valid when using --input-folder",
                    ));
                }
                if self.output_folder.is_some() {
                    return Err(SqueezeError::invalid(
                        "--output-folder is only valid when using --input-folder",
                    ));
                }
                Ok(Mode::Single {
                    input,
                    output: self.output,
                })
            }
            (None, Some(input_folder)) => {
                if self.output.is_some() {
                    return Err(SqueezeError::invalid(
                        "--output is only valid when using --input; use --output-folder",
                    ));
                }
                Ok(Mode::Batch {
                    input_folder,
                    output_folder: self.output_folder,
                    recursive: self.recursive,
                })
            }
        }
    }

    /// Full validation: flag shape, then existence and file kind.
    pub fn resolve(self, kind: &FileKind) -> Result<Mode> {
        let mode = self.shape()?;

        match &mode {
            Mode::Single { input, output } => {
                kind.check_safe_chars("Input file", input)?;
                if let Some(output) = output {
                    kind.check_safe_chars("Output file", output)?;
                }
                if !input.is_file() {
                    return Err(SqueezeError::invalid(format!(
                        "Input file does not exist: {}",
                        input.display()
                    )));
                }
                if !kind.matches(input) {
                    return Err(SqueezeError::invalid(format!(
                        "Input file needs to be a {} file: {}",
                        kind.describe_extensions(),
                        input.display()
                    )));
                }
            }
            Mode::Batch { input_folder, .. } => {
                if !input_folder.is_dir() {
                    return Err(SqueezeError::invalid(format!(
                        "Input folder does not exist: {}",
                        input_folder.display()
                    )));
                }
            }
        }

        Ok(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection() -> Selection {
        Selection::default()
    }

    #[test]
    fn extension_match_ignores_case() {
        assert!(JPEG.matches(Path::new("a/photo.JpEg")));
        assert!(JPEG.matches(Path::new("photo.JPG")));
        assert!(PDF.matches(Path::new("b.PDF")));
        assert!(!PDF.matches(Path::new("notes.txt")));
        assert!(!PDF.matches(Path::new("pdf")));
        assert!(!JPEG.matches(Path::new("archive.jpg.gz")));
    }

    #[test]
    fn both_inputs_are_rejected() {
        let err = Selection {
            input: Some("a.pdf".into()),
            input_folder: Some("docs".into()),
            ..selection()
        }
        .shape()
        .unwrap_err();
        assert!(matches!(err, SqueezeError::InvalidArguments(_)));
    }

    #[test]
    fn missing_input_is_rejected() {
        assert!(matches!(
            selection().shape(),
            Err(SqueezeError::InvalidArguments(_))
        ));
    }

    #[test]
    fn recursive_needs_a_folder() {
        let err = Selection {
            input: Some("a.pdf".into()),
            recursive: true,
            ..selection()
        }
        .shape()
        .unwrap_err();
        assert!(err.to_string().contains("--recursive"));
    }

    #[test]
    fn output_flags_must_match_mode() {
        let single_with_folder = Selection {
            input: Some("a.pdf".into()),
            output_folder: Some("out".into()),
            ..selection()
        };
        assert!(single_with_folder.shape().is_err());

        let batch_with_file = Selection {
            input_folder: Some("docs".into()),
            output: Some("a.pdf".into()),
            ..selection()
        };
        assert!(batch_with_file.shape().is_err());
    }

    #[test]
    fn batch_shape_keeps_recursive_flag() {
        let mode = Selection {
            input_folder: Some("docs".into()),
            recursive: true,
            ..selection()
        }
        .shape()
        .unwrap();
        assert_eq!(
            mode,
            Mode::Batch {
                input_folder: "docs".into(),
                output_folder: None,
                recursive: true,
            }
        );
    }

    #[test]
    fn pdf_paths_with_shell_characters_are_rejected() {
        let err = Selection {
            input: Some("report;rm.pdf".into()),
            ..selection()
        }
        .resolve(&PDF)
        .unwrap_err();
        assert!(err.to_string().contains("invalid characters"));
    }

    #[test]
    fn nonexistent_input_is_invalid() {
        let err = Selection {
            input: Some("definitely/not/here.jpg".into()),
            ..selection()
        }
        .resolve(&JPEG)
        .unwrap_err();
        assert!(matches!(err, SqueezeError::InvalidArguments(_)));
        assert!(err.to_string().contains("does not exist"));
    }
}
