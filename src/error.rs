//! Error types for standoff.

use std::path::Path;

use thiserror::Error;

/// Result type for standoff operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for standoff operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A record violated the file format (wrong field count, missing
    /// separator, bad integer, length mismatch).
    #[error("format error in line {line} of {file}: {message}")]
    Format {
        /// 1-based line number of the offending record.
        line: usize,
        /// File the record came from.
        file: String,
        /// What was wrong with the record.
        message: String,
    },

    /// A record referenced an id that is absent from an earlier table.
    #[error("unresolved reference in line {line} of {file}: {message}")]
    Reference {
        /// 1-based line number of the offending record.
        line: usize,
        /// File the record came from.
        file: String,
        /// Which id failed to resolve.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A document failed to load; wraps the per-stage error.
    #[error("failed to load document '{name}': {source}")]
    Document {
        /// Name of the document whose load was abandoned.
        name: String,
        /// The underlying per-stage error.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a format error for a record line.
    pub fn format(line: usize, file: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Error::Format {
            line,
            file: file.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Create a reference-resolution error for a record line.
    pub fn reference(line: usize, file: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Error::Reference {
            line,
            file: file.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Wrap a per-stage error with the name of the document being loaded.
    pub fn document(name: impl Into<String>, source: Error) -> Self {
        Error::Document {
            name: name.into(),
            source: Box::new(source),
        }
    }
}
