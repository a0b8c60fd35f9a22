//! Errors surfaced to the caller of a document conversion.
//!
//! Only conditions that make a whole document impossible to produce live
//! here. Recoverable trouble inside a document (bad image, odd table row,
//! unprintable character) is handled where it happens and never reaches
//! this type.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The markdown source could not be read.
    #[error("Failed to read '{path}': {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The PDF could not be written to its destination.
    #[error("Failed to write '{path}': {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Typst rejected the generated markup.
    #[error("Typst compilation failed: {0}")]
    Compile(String),

    /// Typst compiled the document but PDF export failed.
    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, Error>;
