//! Error types for the PDF combine library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF combine library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// A listed input could not be loaded as a PDF
    #[error("Failed to load {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Path does not carry a `.pdf` extension
    #[error("Not a PDF: {}", .0.display())]
    NotPdf(PathBuf),

    /// A `file://` token that could not be parsed
    #[error("Invalid file URL {url}: {reason}")]
    InvalidFileUrl { url: String, reason: String },

    /// Drop payload with unbalanced braces or quotes
    #[error("Malformed drop payload: {0}")]
    MalformedPayload(String),

    /// Merge requested with an empty input list
    #[error("No input files provided")]
    NoInputFiles,

    /// A written file does not hold the pages that went into it
    #[error("{} has {found} pages, expected {expected}", .path.display())]
    PageCountMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    /// Invalid glob pattern
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// No files matched pattern
    #[error("No PDF files found matching pattern: {0}")]
    NoFilesMatched(String),
}
