//! Diagnostics reported by the visible uploads for one document.

use super::CodeNavService;
use super::state::RequestState;
use codenav_api::{DiagnosticAtUpload, DiagnosticPage, Result};

impl CodeNavService {
    /// Walks the visible uploads in order, keeping the first `limit`
    /// diagnostics. `total` counts every diagnostic seen, kept or not.
    pub(crate) async fn diagnostics_for(
        &self,
        state: &RequestState,
        limit: usize,
    ) -> Result<DiagnosticPage> {
        let mut page = DiagnosticPage::default();
        for adjusted in &state.visible {
            let Some(document) = state
                .document(self.store.as_ref(), adjusted.upload.id, &adjusted.target_path)
                .await?
            else {
                continue;
            };

            let found: Vec<_> = document
                .occurrences
                .iter()
                .flat_map(|occurrence| {
                    occurrence
                        .diagnostics
                        .iter()
                        .map(move |diagnostic| (occurrence.range, diagnostic))
                })
                .collect();
            for (range, diagnostic) in found {
                page.total += 1;
                if page.diagnostics.len() >= limit {
                    continue;
                }
                let (target_commit, target_range) = self
                    .translate_to_request(state, &adjusted.upload, &adjusted.target_path, range)
                    .await?;
                page.diagnostics.push(DiagnosticAtUpload {
                    upload: adjusted.upload.clone(),
                    path: adjusted.upload.full_path(&adjusted.target_path),
                    diagnostic: diagnostic.clone(),
                    target_commit,
                    target_range,
                });
            }
        }
        tracing::debug!(
            "{} of {} diagnostics for {}",
            page.diagnostics.len(),
            page.total,
            state.path
        );
        Ok(page)
    }
}
