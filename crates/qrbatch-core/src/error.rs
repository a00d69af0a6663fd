//! Error taxonomy for a generation run.
//!
//! Input validation errors quote the offending line and are shown to the user
//! as-is. Encoding and packaging failures surface as a generic message; their
//! cause chain is logged.

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A line of the input file could not be turned into an identifier, or the
/// file could not be read at all.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid line {line_number}: \"{line}\" (only digits are allowed)")]
    InvalidLine { line_number: usize, line: String },
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a QR image could not be produced.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("QR symbol could not be built: {0}")]
    Symbol(qrcode::types::QrError),
    #[error("image size {size}px is smaller than the {modules}-module symbol")]
    ImageTooSmall { size: u32, modules: u32 },
    #[error("PNG encoding failed")]
    Png(#[from] image::ImageError),
}

/// Rendering failed for one identifier.
#[derive(Debug, Error)]
#[error("failed to encode identifier {identifier}")]
pub struct EncodeError {
    pub identifier: String,
    #[source]
    pub source: RenderError,
}

/// An image data URI could not be decoded back to bytes.
#[derive(Debug, Error)]
pub enum DataUriError {
    #[error("not a base64 data URI")]
    MissingPrefix,
    #[error("invalid base64 payload")]
    Base64(#[from] base64::DecodeError),
}

/// Building or writing one batch archive failed.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("failed to create output directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create archive {}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to add {entry} to archive")]
    Entry {
        entry: String,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("failed to write image {entry}")]
    Write {
        entry: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to finalize archive {}", .path.display())]
    Finalize {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("failed to move archive into place at {}", .path.display())]
    Rename {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Precondition checked before any batch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    NoIdentifiers,
    NoSecret,
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precondition::NoIdentifiers => {
                write!(f, "no identifiers loaded; load a non-empty file first")
            }
            Precondition::NoSecret => write!(f, "a secret is required to generate QR codes"),
        }
    }
}

/// Terminal failure of a generation run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    MissingPrecondition(Precondition),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("QR code generation failed")]
    Encoding(#[from] EncodeError),
    #[error("QR code generation failed")]
    Packaging(#[from] PackageError),
    #[error("QR code generation failed")]
    Task(#[from] tokio::task::JoinError),
}

impl RunError {
    /// Message safe to show the user: specific for preconditions and settings,
    /// generic otherwise.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Display adapter that renders an error and all its sources on one line.
pub struct ErrorChain<'a>(pub &'a (dyn StdError + 'static));

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_line_quotes_input() {
        let err = InputError::InvalidLine {
            line_number: 3,
            line: "12a3".to_string(),
        };
        assert!(err.to_string().contains("\"12a3\""));
    }

    #[test]
    fn run_error_user_message_hides_cause() {
        let err = RunError::Encoding(EncodeError {
            identifier: "42".to_string(),
            source: RenderError::ImageTooSmall { size: 10, modules: 45 },
        });
        assert_eq!(err.user_message(), "QR code generation failed");
        let chain = ErrorChain(&err).to_string();
        assert!(chain.contains("identifier 42"));
        assert!(chain.contains("45-module"));
    }

    #[test]
    fn precondition_message_is_specific() {
        let err = RunError::MissingPrecondition(Precondition::NoSecret);
        assert_eq!(err.user_message(), "a secret is required to generate QR codes");
    }
}
