//! Results from uploads outside the visible set, found through monikers.

use super::CodeNavService;
use super::state::RequestState;
use crate::cursor::{Cursor, CursorPhase};
use crate::moniker::{MonikerSet, to_moniker};
use crate::occurrence::find_occurrences;
use codenav_api::{
    BulkLocationQuery, Location, LocationKind, Moniker, MonikerKind, MonikerUploadQuery, Result,
};

impl CodeNavService {
    /// Monikers of the occurrences at the request position, restricted to
    /// `kinds`, in discovery order and capped at the configured limit.
    pub(crate) async fn ordered_monikers(
        &self,
        state: &RequestState,
        kinds: &[MonikerKind],
    ) -> Result<Vec<Moniker>> {
        let mut set = MonikerSet::with_limit(self.settings.moniker_limit);

        for (adjusted, position) in state.positioned() {
            let Some(document) = state
                .document(self.store.as_ref(), adjusted.upload.id, &adjusted.target_path)
                .await?
            else {
                continue;
            };

            for occurrence in find_occurrences(&document.occurrences, position.line, position.character) {
                if !occurrence.has_symbol() {
                    continue;
                }
                let own_kind = if occurrence.is_definition() {
                    MonikerKind::Export
                } else {
                    MonikerKind::Import
                };
                let mut candidates = vec![(occurrence.symbol.as_str(), own_kind)];
                if let Some(info) = document.symbol_information(&occurrence.symbol) {
                    candidates.extend(
                        info.relationships
                            .iter()
                            .filter(|rel| rel.is_implementation)
                            .map(|rel| (rel.symbol.as_str(), MonikerKind::Implementation)),
                    );
                }

                for (symbol, kind) in candidates {
                    if !kinds.contains(&kind) {
                        continue;
                    }
                    if let Some(moniker) = to_moniker(symbol, kind)? {
                        set.add(moniker);
                        if set.is_full() {
                            return Ok(set.into_vec());
                        }
                    }
                }
            }
        }

        Ok(set.into_vec())
    }

    /// Fills `page` up to `limit` from remote uploads, advancing `cursor`.
    /// The cursor must be in the remote phase; it ends in remote (more to
    /// come) or done.
    pub(crate) async fn remote_locations(
        &self,
        state: &RequestState,
        kind: LocationKind,
        cursor: &mut Cursor,
        page: &mut Vec<Location>,
        limit: usize,
    ) -> Result<()> {
        let monikers = self
            .ordered_monikers(state, self.settings.remote_moniker_kinds.for_kind(kind))
            .await?;
        if monikers.is_empty() {
            cursor.finish();
            return Ok(());
        }
        let visible_ids = cursor.visible_upload_ids.clone();

        while page.len() < limit {
            let (upload_offset, batch, location_offset) = match &cursor.phase {
                CursorPhase::Remote {
                    upload_offset,
                    upload_batch_ids,
                    location_offset,
                    ..
                } => (*upload_offset, upload_batch_ids.clone(), *location_offset),
                _ => break,
            };

            if batch.is_empty() {
                let fetched = state
                    .guard(self.uploads.uploads_providing_monikers(MonikerUploadQuery {
                        kind,
                        monikers: &monikers,
                        exclude: &visible_ids,
                        repository_id: state.repository_id,
                        commit: &state.commit,
                        limit: self.settings.upload_batch_size,
                        offset: upload_offset,
                    }))
                    .await?;
                if fetched.uploads.is_empty() {
                    cursor.finish();
                    break;
                }
                let ids = fetched.uploads.iter().map(|upload| upload.id).collect();
                state.remember_uploads(fetched.uploads);
                cursor.begin_batch(ids, fetched.scanned, fetched.total);
                continue;
            }

            let (locations, total) = state
                .guard(self.store.bulk_locations(BulkLocationQuery {
                    kind,
                    upload_ids: &batch,
                    monikers: &monikers,
                    skip_paths: &[],
                    limit: limit - page.len(),
                    offset: location_offset,
                }))
                .await?;
            cursor.advance_locations(locations.len());
            let exhausted = locations.is_empty() || location_offset + locations.len() >= total;

            for location in locations {
                if is_query_position(state, &location) || page.contains(&location) {
                    continue;
                }
                page.push(location);
            }

            if exhausted {
                cursor.end_batch();
            }
        }

        Ok(())
    }
}

/// True if `location` is the occurrence the query was asked from.
fn is_query_position(state: &RequestState, location: &Location) -> bool {
    state.positioned().any(|(adjusted, position)| {
        adjusted.upload.id == location.upload_id
            && adjusted.target_path == location.path
            && location.range.contains(position)
    })
}
