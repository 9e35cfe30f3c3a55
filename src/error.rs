//! Error types for adjlist2gml

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for adjlist2gml operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading, converting or writing graphs
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The input file does not exist
    #[error("input file not found: {}", path.display())]
    MissingInput { path: PathBuf },

    /// The input file exists but could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be created or written
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited record reader failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed adjacency-list line
    #[error("line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Malformed GML document
    #[error("GML line {line}: {message}")]
    Gml { line: u64, message: String },

    /// A node label that the adjacency-list format cannot represent
    #[error("cannot write label {label:?}: {message}")]
    Label { label: String, message: String },

    /// Delimiters are single ASCII bytes
    #[error("delimiter byte {byte:#04x} is not ASCII")]
    InvalidDelimiter { byte: u8 },

    /// Conversion would overwrite its own input
    #[error("refusing to overwrite input file {}", path.display())]
    SelfOverwrite { path: PathBuf },

    #[error("path is not valid UTF-8: {}", path.display())]
    NonUtf8Path { path: PathBuf },
}

impl Error {
    pub(crate) fn parse(line: u64, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn gml(line: u64, message: impl Into<String>) -> Self {
        Error::Gml {
            line,
            message: message.into(),
        }
    }

    /// Map an open/read failure on `path`, distinguishing a missing file.
    pub(crate) fn reading(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::MissingInput { path }
        } else {
            Error::Read { path, source }
        }
    }
}
