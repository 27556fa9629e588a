use crate::models::{Range, UploadId};

/// Errors surfaced by the code navigation engine.
///
/// "Not found" conditions are never represented here; lookups return `Option`
/// or `bool` and callers branch on the flag.
#[derive(Debug, thiserror::Error)]
pub enum CodeNavError {
    #[error("malformed document {path} in upload {upload_id}: {reason}")]
    MalformedDocument {
        upload_id: UploadId,
        path: String,
        reason: String,
    },
    #[error("malformed symbol {symbol:?}: {reason}")]
    MalformedSymbol { symbol: String, reason: String },
    #[error("malformed symbol names in upload {upload_id}: {reason}")]
    MalformedSymbolNames { upload_id: UploadId, reason: String },
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
    #[error("result set changed while paginating")]
    ConcurrentModification,
    #[error("illegal argument: {0}")]
    IllegalArgument(String),
    #[error("{count} distinct occurrences share range {range} in {path}")]
    AmbiguousOccurrence {
        path: String,
        range: Range,
        count: usize,
    },
    #[error("{operation} failed for {key}: {message}")]
    Store {
        operation: &'static str,
        key: String,
        message: String,
    },
    #[error("request cancelled")]
    Cancelled,
}

impl CodeNavError {
    pub fn store(operation: &'static str, key: impl Into<String>, err: impl std::fmt::Display) -> Self {
        CodeNavError::Store {
            operation,
            key: key.into(),
            message: err.to_string(),
        }
    }

    pub fn malformed_symbol(symbol: &str, reason: impl Into<String>) -> Self {
        CodeNavError::MalformedSymbol {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CodeNavError>;
