use super::CodeNavService;
use super::state::RequestState;
use crate::occurrence::{find_occurrences, occurrence_at_exact_range};
use crate::resolver::expand;
use codenav_api::{
    BulkLocationQuery, Hover, LocationKind, MonikerKind, MonikerUploadQuery, Range, Result,
};

impl CodeNavService {
    pub(crate) async fn hover_at(&self, state: &RequestState) -> Result<Option<Hover>> {
        // Range of the innermost occurrence at the position, in the requested
        // commit. Remote hover text is reported against it.
        let mut source_range: Option<Range> = None;

        for (adjusted, position) in state.positioned() {
            let Some(document) = state
                .document(self.store.as_ref(), adjusted.upload.id, &adjusted.target_path)
                .await?
            else {
                continue;
            };
            let occurrences = find_occurrences(&document.occurrences, position.line, position.character);
            let Some(innermost) = occurrences.first().map(|occurrence| occurrence.range) else {
                continue;
            };
            let hovered = occurrences.iter().find_map(|occurrence| {
                let text = expand(&document, occurrence).hover_text;
                (!text.is_empty()).then_some((occurrence.range, text))
            });
            match hovered {
                Some((range, text)) => {
                    let (_, range) = self
                        .translate_to_request(state, &adjusted.upload, &adjusted.target_path, range)
                        .await?;
                    return Ok(Some(Hover { text, range }));
                }
                None if source_range.is_none() => {
                    let (_, range) = self
                        .translate_to_request(state, &adjusted.upload, &adjusted.target_path, innermost)
                        .await?;
                    source_range = Some(range);
                }
                None => {}
            }
        }

        let Some(range) = source_range else {
            return Ok(None);
        };

        let monikers = self.ordered_monikers(state, &[MonikerKind::Import]).await?;
        if monikers.is_empty() {
            return Ok(None);
        }

        let candidates = state
            .guard(self.uploads.uploads_providing_monikers(MonikerUploadQuery {
                kind: LocationKind::Definitions,
                monikers: &monikers,
                exclude: &[],
                repository_id: state.repository_id,
                commit: &state.commit,
                limit: self.settings.upload_batch_size,
                offset: 0,
            }))
            .await?;
        if candidates.uploads.is_empty() {
            return Ok(None);
        }
        let upload_ids: Vec<_> = candidates.uploads.iter().map(|upload| upload.id).collect();
        state.remember_uploads(candidates.uploads);

        let (definitions, _) = state
            .guard(self.store.bulk_locations(BulkLocationQuery {
                kind: LocationKind::Definitions,
                upload_ids: &upload_ids,
                monikers: &monikers,
                skip_paths: &[],
                limit: self.settings.definitions_limit,
                offset: 0,
            }))
            .await?;

        for location in definitions {
            let Some(document) = state
                .document(self.store.as_ref(), location.upload_id, &location.path)
                .await?
            else {
                continue;
            };
            let Some(occurrence) =
                occurrence_at_exact_range(&location.path, &document.occurrences, location.range)?
            else {
                continue;
            };
            let text = expand(&document, occurrence).hover_text;
            if !text.is_empty() {
                return Ok(Some(Hover { text, range }));
            }
        }

        Ok(None)
    }
}
