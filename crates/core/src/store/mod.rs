//! Persistent storage of uploads, documents and the derived symbol tables.

pub mod codec;
pub mod fixture;
pub mod schema;
pub mod sqlite;

pub use fixture::{ImportBundle, ImportDocument, PayloadLayout, SymbolLocationRow};
pub use sqlite::{ImportSummary, SqliteStore};

use codenav_api::CodeNavError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("connection pool: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("blocking task: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("codec: {0}")]
    Codec(#[from] codec::CodecError),
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("write connection lock poisoned")]
    Poisoned,
    #[error(transparent)]
    CodeNav(#[from] CodeNavError),
}

impl StoreError {
    /// Wraps infrastructure failures with the operation and key. Domain
    /// errors raised inside the store pass through unchanged.
    pub fn into_codenav(self, operation: &'static str, key: impl Into<String>) -> CodeNavError {
        match self {
            StoreError::CodeNav(err) => err,
            other => CodeNavError::store(operation, key, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_pass_through() {
        let err = StoreError::CodeNav(CodeNavError::ConcurrentModification);
        assert!(matches!(
            err.into_codenav("document", "1:a.go"),
            CodeNavError::ConcurrentModification
        ));
    }

    #[test]
    fn infrastructure_errors_carry_context() {
        let err = StoreError::Poisoned.into_codenav("insert_upload", "upload 3");
        match err {
            CodeNavError::Store {
                operation, key, ..
            } => {
                assert_eq!(operation, "insert_upload");
                assert_eq!(key, "upload 3");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
