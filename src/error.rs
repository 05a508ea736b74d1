//! Error types for Memlog

use std::path::PathBuf;
use thiserror::Error;

/// Memlog errors
///
/// The classification engine itself never returns these to the host: sink
/// failures degrade to the fallback stream and are only logged. They surface
/// from the trace reader and the session-path helper.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Output file could not be opened for writing
    #[error("Cannot open trace output {path}: {message}")]
    SinkOpen {
        /// Requested output path
        path: PathBuf,
        /// Underlying I/O error description
        message: String,
    },

    /// Writing an event line failed
    #[error("Trace write failed: {message}")]
    Write {
        /// Underlying I/O error description
        message: String,
    },

    /// An event could not be encoded as JSON
    #[error("Serialization error: {message}")]
    Serialize {
        /// Encoder error description
        message: String,
    },

    /// Session output directory could not be created
    #[error("Cannot create session directory {path}: {message}")]
    SessionDir {
        /// Directory path
        path: PathBuf,
        /// Underlying I/O error description
        message: String,
    },

    /// A trace line is not a valid event
    ///
    /// **Triggered by:** malformed JSON, a missing payload object, or a payload
    /// that does not match the `kind` field
    #[error("Decode error at line {line}: {message}")]
    Decode {
        /// 1-based line number in the stream
        line: usize,
        /// Error description
        message: String,
    },

    /// The `v` field names a schema this reader does not understand
    #[error("Unsupported schema version {version} at line {line}")]
    UnsupportedSchema {
        /// 1-based line number in the stream
        line: usize,
        /// Schema version found in the line
        version: u64,
    },

    /// Site identifiers are not strictly increasing
    #[error("Site id {got} at line {line} does not follow {previous}")]
    SiteOrder {
        /// 1-based line number in the stream
        line: usize,
        /// Site id of the previous event
        previous: u64,
        /// Site id found on this line
        got: u64,
    },
}

/// Result type for Memlog operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wraps an I/O failure that happened while writing a trace line
    pub fn write(err: &std::io::Error) -> Self {
        Error::Write {
            message: err.to_string(),
        }
    }

    /// Wraps an encoder failure
    pub fn serialize(err: &serde_json::Error) -> Self {
        Error::Serialize {
            message: err.to_string(),
        }
    }

    /// Returns the stream line the error refers to, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Decode { line, .. }
            | Error::UnsupportedSchema { line, .. }
            | Error::SiteOrder { line, .. } => Some(*line),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::SiteOrder {
            line: 3,
            previous: 5,
            got: 5,
        };
        assert_eq!(err.to_string(), "Site id 5 at line 3 does not follow 5");

        let err = Error::UnsupportedSchema {
            line: 1,
            version: 2,
        };
        assert!(err.to_string().contains("version 2"));
    }

    #[test]
    fn test_error_line() {
        let err = Error::Decode {
            line: 7,
            message: "bad".to_string(),
        };
        assert_eq!(err.line(), Some(7));
        let write = Error::Write {
            message: "x".to_string(),
        };
        assert_eq!(write.line(), None);
    }
}
