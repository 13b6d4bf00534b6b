//! Construction-time errors.
//!
//! Parse-time errors do not exist in this permissive grammar: every byte
//! stream parses to some sequence of rows. Only opening/mapping an input
//! file can fail, and those failures are fatal at construction time.

use thiserror::Error;

#[cfg(feature = "std")]
use std::path::PathBuf;

/// Errors surfaced when opening a file-backed [`crate::RowParser`].
#[derive(Error, Debug)]
pub enum CsvError {
    /// The input file could not be opened or `stat`-ed.
    #[cfg(feature = "std")]
    #[error("failed to open {path:?}: {source}")]
    ResourceOpen {
        /// The path that was opened.
        path: PathBuf,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Placing the file mapping (and its trailing guard page) failed.
    #[cfg(feature = "std")]
    #[error("failed to map {path:?}: {source}")]
    ResourceMap {
        /// The path that was being mapped.
        path: PathBuf,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
}
