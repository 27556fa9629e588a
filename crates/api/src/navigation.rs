use crate::error::Result;
use crate::models::{
    CodeIntelligenceRange, DiagnosticAtUpload, PackageInformation, Position, Range, RepositoryId,
    Upload, UploadId, UploadLocation,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Where a query is asked from: a path at a commit of a repository.
///
/// Cancelling `cancel_token` aborts the query at its next external call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub repository_id: RepositoryId,
    pub commit: String,
    /// Repository-relative path.
    pub path: String,
    pub cancel_token: CancellationToken,
}

impl RequestContext {
    pub fn new(repository_id: RepositoryId, commit: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            repository_id,
            commit: commit.into(),
            path: path.into(),
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, cancel_token: CancellationToken) -> Self {
        self.cancel_token = cancel_token;
        self
    }

    pub fn at(self, line: u32, character: u32) -> PositionalRequest {
        PositionalRequest {
            context: self,
            position: Position::new(line, character),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PositionalRequest {
    pub context: RequestContext,
    pub position: Position,
}

/// `cursor` is the opaque token from a previous [`LocationPage`]; `None`
/// starts from the beginning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub cursor: Option<String>,
}

impl PageRequest {
    pub fn first(limit: usize) -> Self {
        Self { limit, cursor: None }
    }

    pub fn next(limit: usize, cursor: impl Into<String>) -> Self {
        Self {
            limit,
            cursor: Some(cursor.into()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct LocationPage {
    pub locations: Vec<UploadLocation>,
    /// Absent when the result set is exhausted.
    pub next_cursor: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct DiagnosticPage {
    pub diagnostics: Vec<DiagnosticAtUpload>,
    /// Diagnostics found across the visible uploads before the limit applied.
    pub total: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Hover {
    pub text: String,
    /// Range of the hovered occurrence, in the requested commit.
    pub range: Range,
}

/// The query surface of the engine.
///
/// Location queries are paginated: pass `next_cursor` back with the same
/// request to continue. Pages may come back shorter than `limit` while more
/// results remain; only a missing cursor means the end.
#[async_trait]
pub trait CodeNavigator: Send + Sync {
    async fn definitions(&self, request: &PositionalRequest, page: &PageRequest)
    -> Result<LocationPage>;

    async fn references(&self, request: &PositionalRequest, page: &PageRequest)
    -> Result<LocationPage>;

    async fn implementations(
        &self,
        request: &PositionalRequest,
        page: &PageRequest,
    ) -> Result<LocationPage>;

    async fn hover(&self, request: &PositionalRequest) -> Result<Option<Hover>>;

    /// Every occurrence range in the document, sorted and deduplicated.
    async fn stencil(&self, context: &RequestContext) -> Result<Vec<Range>>;

    /// Code intelligence for occurrences touching `[start_line, end_line)`.
    async fn ranges(
        &self,
        context: &RequestContext,
        start_line: u32,
        end_line: u32,
    ) -> Result<Vec<CodeIntelligenceRange>>;

    /// Distinct packages referenced by the given uploads, sorted.
    async fn dependencies(
        &self,
        context: &RequestContext,
        upload_ids: &[UploadId],
    ) -> Result<Vec<PackageInformation>>;

    /// Diagnostics of the request path in every visible upload, in upload
    /// then document order, at most `limit` of them.
    async fn diagnostics(&self, context: &RequestContext, limit: usize) -> Result<DiagnosticPage>;

    /// Visible uploads that contain a document for the request path.
    async fn visible_uploads_for_path(&self, context: &RequestContext) -> Result<Vec<Upload>>;
}
