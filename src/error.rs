// src/error.rs

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a run.
///
/// Missing or malformed monthly data never lands here: the store and the
/// normalizer degrade those to empty results with a warning. Only output
/// I/O and chart-backend failures propagate to the caller.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The output directory could not be created.
    #[error("cannot create output directory {path}: {source}")]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A rendered page could not be encoded or written.
    #[error("failed to write page {path}: {msg}")]
    WritePage { path: PathBuf, msg: String },

    /// The chart backend failed while drawing a page.
    #[error("chart backend failed on {page}: {msg}")]
    Draw { page: String, msg: String },

    /// A file on the data tree could not be written.
    #[error("cannot write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
}
