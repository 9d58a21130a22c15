//! Error types for email parsing, input validation and extraction

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while turning raw bytes into an [`EmailData`](crate::EmailData)
#[derive(Error, Debug)]
pub enum ParseError {
    /// Failed to parse the email structure
    #[error("Failed to parse email structure: {0}")]
    Structure(String),

    /// Failed to decode email content
    #[error("Failed to decode content: {0}")]
    Decode(String),

    /// Failed to read the source file
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for email parsing operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Disqualifying problems with an input email. Any of these ends a pipeline
/// run before an extractor is invoked.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Email file is not readable: {}", .path.display())]
    Unreadable { path: PathBuf },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Email missing Subject header")]
    MissingSubject,

    #[error("Email missing From header or From header is empty")]
    EmptyFrom,

    #[error("Email carries a non-text attachment: {0}")]
    NonTextAttachment(String),
}

/// Failures inside an extractor. These never cross the extractor boundary;
/// they are reported as a 5xx status instead.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Email file does not exist: {}", .0.display())]
    MissingInput(PathBuf),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Output directory is not usable: {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to publish joke: {0}")]
    Persist(#[from] std::io::Error),
}
