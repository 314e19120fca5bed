//! Error types for the PDF form filling library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF form filling library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF parsing or writing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Field values file could not be read as JSON
    #[error("Invalid field values: {0}")]
    Values(#[from] serde_json::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// Merge called without inputs
    #[error("No input files provided")]
    NoInputFiles,

    /// Document structure we cannot work with
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// General error
    #[error("{0}")]
    General(String),
}
