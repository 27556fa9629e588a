//! Query orchestration.
//!
//! A location query runs through up to two phases recorded in its cursor:
//! local (the uploads visible at the requested commit) and remote (other
//! uploads sharing a moniker with the queried symbol). A single call may
//! cross from local into remote to fill its page.

mod diagnostics;
mod hover;
mod local;
mod ranges;
mod remote;
pub mod state;

use crate::cache::LineRangeCache;
use crate::config::{CodeNavConfig, RemoteMonikerKinds};
use crate::cursor::{Cursor, CursorPhase};
use crate::moniker::package_coordinates;
use crate::observability::{Operation, Operations};
use crate::symbol_names::reconstruct_names;
use crate::util::paginate;
use async_trait::async_trait;
use codenav_api::{
    CodeIntelStore, CodeIntelligenceRange, CodeNavError, CodeNavigator, DiagnosticPage, Hover,
    Location, LocationKind, LocationPage, PackageInformation, PageRequest, PositionTranslator,
    Position, PositionalRequest, Range, RequestContext, Result, Upload, UploadId, UploadLocation,
    UploadService,
};
use state::RequestState;
use std::future::Future;
use std::sync::Arc;
use tracing::Instrument;

/// Tunables the locator reads from [`CodeNavConfig`].
#[derive(Debug, Clone)]
pub struct LocatorSettings {
    pub moniker_limit: usize,
    pub definitions_limit: usize,
    pub upload_batch_size: usize,
    pub remote_moniker_kinds: RemoteMonikerKinds,
}

impl From<&CodeNavConfig> for LocatorSettings {
    fn from(config: &CodeNavConfig) -> Self {
        Self {
            moniker_limit: config.moniker_limit,
            definitions_limit: config.definitions_limit,
            upload_batch_size: config.upload_batch_size.max(1),
            remote_moniker_kinds: config.remote_moniker_kinds.clone(),
        }
    }
}

pub struct CodeNavService {
    store: Arc<dyn CodeIntelStore>,
    uploads: Arc<dyn UploadService>,
    translator: Arc<dyn PositionTranslator>,
    settings: LocatorSettings,
    line_cache: Option<LineRangeCache>,
    operations: Arc<Operations>,
}

impl CodeNavService {
    pub fn new(
        store: Arc<dyn CodeIntelStore>,
        uploads: Arc<dyn UploadService>,
        translator: Arc<dyn PositionTranslator>,
        config: &CodeNavConfig,
        operations: Arc<Operations>,
    ) -> Self {
        let line_cache = (config.line_cache_budget_bytes > 0)
            .then(|| LineRangeCache::new(config.line_cache_budget_bytes));
        Self {
            store,
            uploads,
            translator,
            settings: LocatorSettings::from(config),
            line_cache,
            operations,
        }
    }

    pub fn operations(&self) -> &Operations {
        &self.operations
    }

    async fn observe<T>(
        &self,
        operation: &Operation,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let guard = operation.start();
        let result = fut.instrument(operation.span()).await;
        guard.finish(&result);
        result
    }

    /// Builds request state with the visible uploads adjusted to the
    /// request path and, if given, position.
    async fn prepare(
        &self,
        context: &RequestContext,
        position: Option<Position>,
    ) -> Result<RequestState> {
        let mut state = RequestState::new(context);
        let visible = state
            .guard(self.uploads.visible_uploads(
                context.repository_id,
                &context.commit,
                &context.path,
            ))
            .await?;
        state.adjust(visible, position, self.translator.as_ref()).await?;
        Ok(state)
    }

    async fn locate(
        &self,
        kind: LocationKind,
        request: &PositionalRequest,
        page: &PageRequest,
    ) -> Result<LocationPage> {
        if page.limit == 0 {
            return Err(CodeNavError::IllegalArgument(
                "page limit must be positive".to_string(),
            ));
        }
        let cursor = page.cursor.as_deref().map(Cursor::decode).transpose()?;

        let mut state = RequestState::new(&request.context);
        let visible = state
            .guard(self.uploads.visible_uploads(
                request.context.repository_id,
                &request.context.commit,
                &request.context.path,
            ))
            .await?;

        let (mut cursor, visible) = match cursor {
            None => {
                let ids = visible.iter().map(|upload| upload.id).collect();
                (Cursor::start(ids), visible)
            }
            Some(cursor) => {
                // Later pages stay on the uploads the first page saw.
                let mut pinned = Vec::with_capacity(cursor.visible_upload_ids.len());
                for id in &cursor.visible_upload_ids {
                    match visible.iter().find(|upload| upload.id == *id) {
                        Some(upload) => pinned.push(upload.clone()),
                        None => return Err(CodeNavError::ConcurrentModification),
                    }
                }
                (cursor, pinned)
            }
        };
        if cursor.is_done() {
            return Ok(LocationPage::default());
        }

        state
            .adjust(visible, Some(request.position), self.translator.as_ref())
            .await?;

        let mut locations: Vec<Location> = Vec::new();
        loop {
            if locations.len() >= page.limit {
                break;
            }
            match cursor.phase.clone() {
                CursorPhase::Local { offset } => {
                    let local = self.local_locations(&state, kind).await?;
                    let (slice, total) = paginate(&local, page.limit - locations.len(), offset);
                    cursor.advance_local(slice.len());
                    let consumed = offset + slice.len();
                    locations.extend(slice);
                    if consumed < total {
                        break;
                    }
                    // Definitions found locally are authoritative.
                    match kind {
                        LocationKind::Definitions if total > 0 => cursor.finish(),
                        _ => cursor.enter_remote(),
                    }
                }
                CursorPhase::Remote { .. } => {
                    self.remote_locations(&state, kind, &mut cursor, &mut locations, page.limit)
                        .await?;
                    break;
                }
                CursorPhase::Done => break,
            }
        }

        let locations = self.to_upload_locations(&state, locations).await?;
        Ok(LocationPage {
            locations,
            next_cursor: cursor.next_token()?,
        })
    }

    /// Translates a range of `upload` back into the requested commit. Falls
    /// back to the indexed commit and range when translation fails or the
    /// upload belongs to another repository.
    async fn translate_to_request(
        &self,
        state: &RequestState,
        upload: &Upload,
        path: &str,
        range: Range,
    ) -> Result<(String, Range)> {
        if upload.repository_id != state.repository_id {
            return Ok((upload.commit.clone(), range));
        }
        let translated = state
            .guard(self.translator.translate_range(
                state.repository_id,
                &upload.commit,
                &state.commit,
                &upload.full_path(path),
                range,
            ))
            .await?;
        Ok(match translated {
            Some(range) => (state.commit.clone(), range),
            None => (upload.commit.clone(), range),
        })
    }

    async fn to_upload_locations(
        &self,
        state: &RequestState,
        locations: Vec<Location>,
    ) -> Result<Vec<UploadLocation>> {
        let mut ids: Vec<UploadId> = locations.iter().map(|location| location.upload_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let uploads = state.uploads_for(self.uploads.as_ref(), &ids).await?;

        let mut result = Vec::with_capacity(locations.len());
        for location in locations {
            let Some(upload) = uploads.iter().find(|upload| upload.id == location.upload_id) else {
                tracing::warn!("dropping location in unknown upload {}", location.upload_id);
                continue;
            };
            let (target_commit, target_range) = self
                .translate_to_request(state, upload, &location.path, location.range)
                .await?;
            result.push(UploadLocation {
                upload: upload.clone(),
                path: upload.full_path(&location.path),
                target_commit,
                target_range,
            });
        }
        Ok(result)
    }

    async fn dependencies_of(
        &self,
        state: &RequestState,
        upload_ids: &[UploadId],
    ) -> Result<Vec<PackageInformation>> {
        let mut names = Vec::new();
        for &upload_id in upload_ids {
            let segments = state.guard(self.store.symbol_name_segments(upload_id)).await?;
            names.extend(reconstruct_names(upload_id, &segments)?);
        }
        Ok(package_coordinates(names.iter().map(String::as_str)))
    }

    async fn uploads_with_path(&self, state: &RequestState) -> Result<Vec<Upload>> {
        let mut uploads = Vec::new();
        for adjusted in &state.visible {
            if state
                .guard(self.store.path_exists(adjusted.upload.id, &adjusted.target_path))
                .await?
            {
                uploads.push(adjusted.upload.clone());
            }
        }
        Ok(uploads)
    }
}

#[async_trait]
impl CodeNavigator for CodeNavService {
    async fn definitions(&self, request: &PositionalRequest, page: &PageRequest) -> Result<LocationPage> {
        self.observe(
            &self.operations.definitions,
            self.locate(LocationKind::Definitions, request, page),
        )
        .await
    }

    async fn references(&self, request: &PositionalRequest, page: &PageRequest) -> Result<LocationPage> {
        self.observe(
            &self.operations.references,
            self.locate(LocationKind::References, request, page),
        )
        .await
    }

    async fn implementations(
        &self,
        request: &PositionalRequest,
        page: &PageRequest,
    ) -> Result<LocationPage> {
        self.observe(
            &self.operations.implementations,
            self.locate(LocationKind::Implementations, request, page),
        )
        .await
    }

    async fn hover(&self, request: &PositionalRequest) -> Result<Option<Hover>> {
        self.observe(&self.operations.hover, async {
            let state = self.prepare(&request.context, Some(request.position)).await?;
            self.hover_at(&state).await
        })
        .await
    }

    async fn stencil(&self, context: &RequestContext) -> Result<Vec<Range>> {
        self.observe(&self.operations.stencil, async {
            let state = self.prepare(context, None).await?;
            self.stencil_for(&state).await
        })
        .await
    }

    async fn ranges(
        &self,
        context: &RequestContext,
        start_line: u32,
        end_line: u32,
    ) -> Result<Vec<CodeIntelligenceRange>> {
        self.observe(&self.operations.ranges, async {
            if start_line > end_line {
                return Err(CodeNavError::IllegalArgument(format!(
                    "start line {} is after end line {}",
                    start_line, end_line
                )));
            }
            let state = self.prepare(context, None).await?;
            self.ranges_for(&state, start_line, end_line).await
        })
        .await
    }

    async fn dependencies(
        &self,
        context: &RequestContext,
        upload_ids: &[UploadId],
    ) -> Result<Vec<PackageInformation>> {
        self.observe(&self.operations.dependencies, async {
            let state = RequestState::new(context);
            self.dependencies_of(&state, upload_ids).await
        })
        .await
    }

    async fn diagnostics(&self, context: &RequestContext, limit: usize) -> Result<DiagnosticPage> {
        self.observe(&self.operations.diagnostics, async {
            if limit == 0 {
                return Err(CodeNavError::IllegalArgument(
                    "diagnostic limit must be positive".to_string(),
                ));
            }
            let state = self.prepare(context, None).await?;
            self.diagnostics_for(&state, limit).await
        })
        .await
    }

    async fn visible_uploads_for_path(&self, context: &RequestContext) -> Result<Vec<Upload>> {
        self.observe(&self.operations.visible_uploads, async {
            let state = self.prepare(context, None).await?;
            self.uploads_with_path(&state).await
        })
        .await
    }
}
