//! Whole-document queries: stencils and per-range code intelligence.

use super::CodeNavService;
use super::state::RequestState;
use crate::cache::LineRangeKey;
use crate::occurrence::occurrences_in_lines;
use crate::resolver::expand;
use codenav_api::{CodeIntelligenceRange, Location, Range, Result};

impl CodeNavService {
    pub(crate) async fn stencil_for(&self, state: &RequestState) -> Result<Vec<Range>> {
        let key = LineRangeKey::new(state.repository_id, &state.commit, &state.path);
        if let Some(cache) = &self.line_cache {
            if let Some(ranges) = cache.get(&key) {
                tracing::debug!("stencil cache hit for {}", state.path);
                return Ok(ranges);
            }
        }

        let mut ranges = Vec::new();
        for adjusted in &state.visible {
            let Some(document) = state
                .document(self.store.as_ref(), adjusted.upload.id, &adjusted.target_path)
                .await?
            else {
                continue;
            };
            for occurrence in &document.occurrences {
                let translated = state
                    .guard(self.translator.translate_range(
                        state.repository_id,
                        &adjusted.upload.commit,
                        &state.commit,
                        &state.path,
                        occurrence.range,
                    ))
                    .await?;
                if let Some(range) = translated {
                    ranges.push(range);
                }
            }
        }
        ranges.sort();
        ranges.dedup();

        if let Some(cache) = &self.line_cache {
            cache.insert(key, ranges.clone());
        }
        Ok(ranges)
    }

    pub(crate) async fn ranges_for(
        &self,
        state: &RequestState,
        start_line: u32,
        end_line: u32,
    ) -> Result<Vec<CodeIntelligenceRange>> {
        let mut result = Vec::new();
        for adjusted in &state.visible {
            let Some(document) = state
                .document(self.store.as_ref(), adjusted.upload.id, &adjusted.target_path)
                .await?
            else {
                continue;
            };
            let upload_id = adjusted.upload.id;
            let in_document = |ranges: Vec<Range>| -> Vec<Location> {
                ranges
                    .into_iter()
                    .map(|range| Location::new(upload_id, adjusted.target_path.clone(), range))
                    .collect()
            };

            for occurrence in occurrences_in_lines(&document.occurrences, start_line, end_line) {
                let translated = state
                    .guard(self.translator.translate_range(
                        state.repository_id,
                        &adjusted.upload.commit,
                        &state.commit,
                        &state.path,
                        occurrence.range,
                    ))
                    .await?;
                let Some(range) = translated else {
                    continue;
                };
                let expansion = expand(&document, occurrence);
                result.push(CodeIntelligenceRange {
                    range,
                    definitions: self
                        .to_upload_locations(state, in_document(expansion.definitions))
                        .await?,
                    references: self
                        .to_upload_locations(state, in_document(expansion.references))
                        .await?,
                    implementations: self
                        .to_upload_locations(state, in_document(expansion.implementations))
                        .await?,
                    hover_text: expansion.hover_text,
                });
            }
        }
        Ok(result)
    }
}
