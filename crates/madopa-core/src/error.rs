//! Error types for parsing and rendering.
//!
//! Parsing has exactly one fatal error: a table whose header row and
//! delimiter row disagree on the number of columns. Every other oddity in
//! the input degrades to literal text instead of failing the document.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A structural error that aborts the whole parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The header row and the delimiter row have different cell counts.
    #[error(
        "number of header cells ({header}) doesn't match number of columns in delimiter row ({delimiter})"
    )]
    TableColumnMismatch { header: usize, delimiter: usize },
}

/// Failure raised by a renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An external asset (stylesheet) could not be read.
    #[error("failed to read asset '{}': {source}", path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Error returned by [`crate::convert`], covering both stages.
#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}
