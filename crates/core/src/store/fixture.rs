//! Seeding a store with already-built documents.
//!
//! Nothing here indexes source code: documents arrive fully formed and the
//! symbol-location rows are read straight off their occurrences.

use crate::moniker;
use codenav_api::{Document, LocationKind, Range, SymbolNameSegment, Upload, UploadId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PayloadLayout {
    Legacy,
    #[default]
    Current,
}

/// One row of a symbol-location table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolLocationRow {
    pub kind: LocationKind,
    pub scheme: String,
    pub identifier: String,
    pub path: String,
    pub range: Range,
}

/// Rows an indexer would have emitted for `document`:
///
/// - `definitions`: definition occurrences under their own symbol;
/// - `references`: every occurrence under its own symbol;
/// - `implementations`: for each symbol `S` with an implementation
///   relationship to `I`, the definitions of `S` filed under `I`.
///
/// Local symbols are document scoped and produce no rows.
pub fn derive_symbol_locations(document: &Document) -> Vec<SymbolLocationRow> {
    let mut rows = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |kind: LocationKind, symbol: &str, range: Range| {
        let header = match moniker::parse_symbol(symbol) {
            Ok(Some(header)) => header,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!("skipping symbol in {}: {}", document.path, err);
                return;
            }
        };
        let row = SymbolLocationRow {
            kind,
            scheme: header.scheme,
            identifier: symbol.to_string(),
            path: document.path.clone(),
            range,
        };
        if seen.insert(row.clone()) {
            rows.push(row);
        }
    };

    for occurrence in document.occurrences.iter().filter(|o| o.has_symbol()) {
        if occurrence.is_definition() {
            push(LocationKind::Definitions, &occurrence.symbol, occurrence.range);
        }
        push(LocationKind::References, &occurrence.symbol, occurrence.range);
    }

    for info in &document.symbols {
        let definitions: Vec<Range> = document
            .occurrences
            .iter()
            .filter(|o| o.is_definition() && o.symbol == info.symbol)
            .map(|o| o.range)
            .collect();
        for relationship in info.relationships.iter().filter(|r| r.is_implementation) {
            for range in &definitions {
                push(LocationKind::Implementations, &relationship.symbol, *range);
            }
        }
    }

    rows
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ImportDocument {
    pub upload_id: UploadId,
    #[serde(default)]
    pub layout: PayloadLayout,
    pub document: Document,
}

/// JSON shape accepted by the `import` command.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ImportBundle {
    pub uploads: Vec<Upload>,
    pub documents: Vec<ImportDocument>,
    pub symbol_names: Vec<SymbolNameSegment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use codenav_api::{Occurrence, Relationship, SymbolInformation, SymbolRole};

    const IFACE: &str = "scip-go gomod m v1 pkg/Iface#";
    const IMPL: &str = "scip-go gomod m v1 pkg/Impl#";

    fn document() -> Document {
        Document {
            path: "impl.go".into(),
            occurrences: vec![
                Occurrence {
                    range: Range::new(1, 5, 1, 9),
                    symbol: IMPL.into(),
                    symbol_roles: SymbolRole::DEFINITION,
                    ..Default::default()
                },
                Occurrence {
                    range: Range::new(4, 0, 4, 5),
                    symbol: IFACE.into(),
                    ..Default::default()
                },
                Occurrence {
                    range: Range::new(5, 0, 5, 1),
                    symbol: "local 0".into(),
                    symbol_roles: SymbolRole::DEFINITION,
                    ..Default::default()
                },
            ],
            symbols: vec![SymbolInformation {
                symbol: IMPL.into(),
                relationships: vec![Relationship {
                    symbol: IFACE.into(),
                    is_implementation: true,
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn derives_rows_per_table() {
        let rows = derive_symbol_locations(&document());
        let by_kind = |kind| rows.iter().filter(|r| r.kind == kind).collect::<Vec<_>>();

        let definitions = by_kind(LocationKind::Definitions);
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].identifier, IMPL);
        assert_eq!(definitions[0].scheme, "scip-go");

        assert_eq!(by_kind(LocationKind::References).len(), 2);

        let implementations = by_kind(LocationKind::Implementations);
        assert_eq!(implementations.len(), 1);
        assert_eq!(implementations[0].identifier, IFACE);
        assert_eq!(implementations[0].range, Range::new(1, 5, 1, 9));
    }

    #[test]
    fn bundle_defaults_missing_sections() {
        let bundle: ImportBundle = serde_json::from_str(r#"{"uploads": []}"#).unwrap();
        assert!(bundle.documents.is_empty());
        assert!(bundle.symbol_names.is_empty());
    }
}
