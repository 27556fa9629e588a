use codenav_api::{
    CodeIntelStore, CodeNavError, Document, Position, PositionTranslator, RequestContext, Result,
    Upload, UploadId, UploadService,
};
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A visible upload with the request path and position mapped into it.
#[derive(Debug, Clone)]
pub struct AdjustedUpload {
    pub upload: Upload,
    /// Request path relative to the upload root.
    pub target_path: String,
    /// Request position in the upload's commit. `None` for path-only queries.
    pub target_position: Option<Position>,
}

/// Per-call state shared by the phases of one query.
pub struct RequestState {
    pub repository_id: i64,
    pub commit: String,
    pub path: String,
    pub cancel_token: CancellationToken,
    pub visible: Vec<AdjustedUpload>,
    uploads: DashMap<UploadId, Upload>,
    documents: DashMap<(UploadId, String), Option<Arc<Document>>>,
}

impl RequestState {
    pub fn new(context: &RequestContext) -> Self {
        Self {
            repository_id: context.repository_id,
            commit: context.commit.clone(),
            path: context.path.clone(),
            cancel_token: context.cancel_token.clone(),
            visible: Vec::new(),
            uploads: DashMap::new(),
            documents: DashMap::new(),
        }
    }

    /// Races `fut` against cancellation of the request.
    pub async fn guard<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        if self.cancel_token.is_cancelled() {
            return Err(CodeNavError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => Err(CodeNavError::Cancelled),
            result = fut => result,
        }
    }

    pub fn visible_ids(&self) -> Vec<UploadId> {
        self.visible.iter().map(|adjusted| adjusted.upload.id).collect()
    }

    /// Visible uploads that have a position to query at.
    pub fn positioned(&self) -> impl Iterator<Item = (&AdjustedUpload, Position)> {
        self.visible.iter().filter_map(|adjusted| {
            adjusted
                .target_position
                .map(|position| (adjusted, position))
        })
    }

    pub fn remember_uploads(&self, uploads: impl IntoIterator<Item = Upload>) {
        for upload in uploads {
            self.uploads.insert(upload.id, upload);
        }
    }

    /// Resolves upload records, fetching the ones not seen yet.
    pub async fn uploads_for(
        &self,
        service: &dyn UploadService,
        ids: &[UploadId],
    ) -> Result<Vec<Upload>> {
        let missing: Vec<UploadId> = ids
            .iter()
            .copied()
            .filter(|id| !self.uploads.contains_key(id))
            .collect();
        if !missing.is_empty() {
            let fetched = self.guard(service.uploads_by_ids(&missing)).await?;
            self.remember_uploads(fetched);
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.uploads.get(id).map(|entry| entry.value().clone()))
            .collect())
    }

    /// Loads a document once per request.
    pub async fn document(
        &self,
        store: &dyn CodeIntelStore,
        upload_id: UploadId,
        path: &str,
    ) -> Result<Option<Arc<Document>>> {
        let key = (upload_id, path.to_string());
        if let Some(cached) = self.documents.get(&key) {
            return Ok(cached.value().clone());
        }
        let document = self.guard(store.document(upload_id, path)).await?.map(Arc::new);
        self.documents.insert(key, document.clone());
        Ok(document)
    }

    /// Maps the request path (and position) into each visible upload.
    /// Uploads the path lies outside of, or whose commit the position does
    /// not survive into, are dropped.
    pub async fn adjust(
        &mut self,
        uploads: Vec<Upload>,
        position: Option<Position>,
        translator: &dyn PositionTranslator,
    ) -> Result<()> {
        let mut visible = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let Some(target_path) = upload.path_within_root(&self.path).map(str::to_string) else {
                continue;
            };
            let target_position = match position {
                None => None,
                Some(position) => {
                    let translated = self
                        .guard(translator.translate_position(
                            self.repository_id,
                            &self.commit,
                            &upload.commit,
                            &self.path,
                            position,
                        ))
                        .await?;
                    match translated {
                        Some(translated) => Some(translated),
                        None => {
                            tracing::debug!(
                                "position does not translate into upload {} at {}",
                                upload.id,
                                upload.commit
                            );
                            continue;
                        }
                    }
                }
            };
            self.uploads.insert(upload.id, upload.clone());
            visible.push(AdjustedUpload {
                upload,
                target_path,
                target_position,
            });
        }
        self.visible = visible;
        Ok(())
    }
}
