//! Results from the uploads visible at the requested commit.

use super::CodeNavService;
use super::state::RequestState;
use crate::moniker;
use crate::occurrence::find_occurrences;
use crate::resolver::{SymbolExpansion, expand};
use crate::util::dedup_stable;
use codenav_api::{
    BulkLocationQuery, Document, Location, LocationKind, Moniker, MonikerKind, Occurrence, Result,
    UploadId,
};
use std::sync::Arc;

/// Page size used when draining the symbol-location tables.
const LOCAL_SEARCH_PAGE: usize = 1000;

impl CodeNavService {
    /// Every local result for `kind`, deduplicated and ordered.
    pub(crate) async fn local_locations(
        &self,
        state: &RequestState,
        kind: LocationKind,
    ) -> Result<Vec<Location>> {
        let mut locations = Vec::new();
        let mut search: Option<LocationKind> = None;
        let mut search_monikers: Vec<Moniker> = Vec::new();
        let mut skip_paths: Vec<(UploadId, String)> = Vec::new();

        for (adjusted, position) in state.positioned() {
            let upload_id = adjusted.upload.id;
            let Some(document) = state
                .document(self.store.as_ref(), upload_id, &adjusted.target_path)
                .await?
            else {
                continue;
            };
            let Some(expansion) = first_expansion(&document, position.line, position.character, kind)
            else {
                continue;
            };

            locations.extend(
                expansion
                    .ranges(kind)
                    .into_iter()
                    .map(|range| Location::new(upload_id, adjusted.target_path.clone(), range)),
            );

            let (table, symbols) = expansion.search_terms(kind);
            search = Some(table);
            for symbol in symbols {
                // Malformed symbols fail the query before any page is cut.
                if let Some(moniker) = moniker::to_moniker(symbol, MonikerKind::Import)? {
                    search_monikers.push(moniker);
                }
            }
            skip_paths.push((upload_id, adjusted.target_path.clone()));
        }

        if let Some(table) = search {
            if !search_monikers.is_empty() {
                let upload_ids = state.visible_ids();
                let mut offset = 0;
                loop {
                    let query = BulkLocationQuery {
                        kind: table,
                        upload_ids: &upload_ids,
                        monikers: &search_monikers,
                        skip_paths: &skip_paths,
                        limit: LOCAL_SEARCH_PAGE,
                        offset,
                    };
                    let (page, total) = state.guard(self.store.bulk_locations(query)).await?;
                    offset += page.len();
                    let drained = page.is_empty() || offset >= total;
                    locations.extend(page);
                    if drained {
                        break;
                    }
                }
            }
        }

        dedup_stable(&mut locations);
        locations.sort();
        Ok(locations)
    }
}

/// Expands the occurrences at the position, innermost first, and keeps the
/// first expansion that answers `kind` in this document or names a symbol to
/// look for in the others.
fn first_expansion(
    document: &Arc<Document>,
    line: u32,
    character: u32,
    kind: LocationKind,
) -> Option<SymbolExpansion> {
    find_occurrences(&document.occurrences, line, character)
        .into_iter()
        .map(|occurrence: &Occurrence| expand(document, occurrence))
        .find(|expansion| !expansion.is_empty(kind) || !expansion.search_terms(kind).1.is_empty())
}
