//! Error types for the stepdoc library.

use std::io;
use thiserror::Error;

/// Result type alias for stepdoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during a conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The source document is missing, corrupt, or otherwise unreadable.
    ///
    /// This is the fatal-input case: it aborts the affected document's
    /// conversion but must not abort a batch run.
    #[error("Unreadable document {path}: {reason}")]
    UnreadableDocument {
        /// Path of the offending document.
        path: String,
        /// Underlying cause.
        reason: String,
    },

    /// The document is encrypted; decryption is not supported.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error extracting text from a page.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Error extracting or decoding an embedded image.
    #[error("Image extraction error: {0}")]
    ImageExtract(String),

    /// Error rendering output (JSON, HTML, report).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Invalid batch file pattern.
    #[error("Invalid file pattern: {0}")]
    InvalidPattern(String),

    /// Invalid correction rule configuration.
    #[error("Invalid correction rules: {0}")]
    InvalidRules(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::Other(err.to_string()),
        }
    }
}

impl Error {
    /// True for errors that should abort a single document's conversion
    /// (as opposed to degrading to a warning on the record).
    pub fn is_fatal_input(&self) -> bool {
        matches!(
            self,
            Error::UnreadableDocument { .. } | Error::UnknownFormat | Error::Encrypted
        )
    }
}
