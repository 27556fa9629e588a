//! Collaborators the navigation engine depends on but does not own.
//!
//! Production deployments back these with external services; the core crate
//! ships a SQLite implementation of [`UploadService`] and [`CodeIntelStore`]
//! plus an identity [`PositionTranslator`].

use crate::error::Result;
use crate::models::{
    Document, Location, LocationKind, Moniker, Position, Range, RepositoryId, StoredDocument,
    SymbolNameSegment, Upload, UploadId,
};
use async_trait::async_trait;

/// Parameters for finding uploads outside the visible set that carry rows
/// for any of the given monikers.
#[derive(Debug, Clone, Copy)]
pub struct MonikerUploadQuery<'a> {
    pub kind: LocationKind,
    pub monikers: &'a [Moniker],
    pub exclude: &'a [UploadId],
    pub repository_id: RepositoryId,
    pub commit: &'a str,
    pub limit: usize,
    pub offset: usize,
}

/// One page of candidate uploads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadBatch {
    pub uploads: Vec<Upload>,
    /// Candidates consumed from the underlying ordering by this page.
    pub scanned: usize,
    /// Total candidates across all pages.
    pub total: usize,
}

#[async_trait]
pub trait UploadService: Send + Sync {
    /// Uploads whose data applies to `path` at `commit`.
    async fn visible_uploads(
        &self,
        repository_id: RepositoryId,
        commit: &str,
        path: &str,
    ) -> Result<Vec<Upload>>;

    /// Missing ids are silently absent from the result.
    async fn uploads_by_ids(&self, ids: &[UploadId]) -> Result<Vec<Upload>>;

    async fn uploads_providing_monikers(&self, query: MonikerUploadQuery<'_>)
    -> Result<UploadBatch>;
}

/// Maps positions between commits of the same repository.
///
/// `None` means the position (or range) does not survive the edit history
/// between the two commits. Callers treat that as "skip" or "fall back",
/// never as an error.
#[async_trait]
pub trait PositionTranslator: Send + Sync {
    async fn translate_position(
        &self,
        repository_id: RepositoryId,
        from_commit: &str,
        to_commit: &str,
        path: &str,
        position: Position,
    ) -> Result<Option<Position>>;

    async fn translate_range(
        &self,
        repository_id: RepositoryId,
        from_commit: &str,
        to_commit: &str,
        path: &str,
        range: Range,
    ) -> Result<Option<Range>>;
}

/// Search over the precomputed symbol-location tables.
#[derive(Debug, Clone, Copy)]
pub struct BulkLocationQuery<'a> {
    pub kind: LocationKind,
    pub upload_ids: &'a [UploadId],
    /// Rows match on (scheme, identifier).
    pub monikers: &'a [Moniker],
    /// At most one path per upload whose rows are left out.
    pub skip_paths: &'a [(UploadId, String)],
    pub limit: usize,
    pub offset: usize,
}

/// Read access to indexed documents and their derived tables.
#[async_trait]
pub trait CodeIntelStore: Send + Sync {
    async fn document(&self, upload_id: UploadId, path: &str) -> Result<Option<Document>>;

    async fn document_by_id(&self, document_id: i64) -> Result<Option<StoredDocument>>;

    async fn path_exists(&self, upload_id: UploadId, path: &str) -> Result<bool>;

    /// Returns the requested page ordered by (upload id, path, start line,
    /// start character) and the total number of matching rows.
    async fn bulk_locations(&self, query: BulkLocationQuery<'_>) -> Result<(Vec<Location>, usize)>;

    async fn symbol_name_segments(&self, upload_id: UploadId) -> Result<Vec<SymbolNameSegment>>;
}
