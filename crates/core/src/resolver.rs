//! Expands one occurrence into related ranges of the same document.

use codenav_api::{Document, LocationKind, Occurrence, Range};
use std::collections::HashSet;

/// Everything one occurrence resolves to inside its document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolExpansion {
    pub definitions: Vec<Range>,
    pub references: Vec<Range>,
    pub implementations: Vec<Range>,
    pub hover_text: String,
    /// Empty when the occurrence carries no symbol.
    pub definition_symbol: String,
    pub reference_symbols: Vec<String>,
    pub implementation_symbols: Vec<String>,
}

impl SymbolExpansion {
    /// Ranges answering a query of `kind`. References include definitions.
    pub fn ranges(&self, kind: LocationKind) -> Vec<Range> {
        match kind {
            LocationKind::Definitions => self.definitions.clone(),
            LocationKind::References => self
                .definitions
                .iter()
                .chain(self.references.iter())
                .copied()
                .collect(),
            LocationKind::Implementations => self.implementations.clone(),
        }
    }

    pub fn is_empty(&self, kind: LocationKind) -> bool {
        match kind {
            LocationKind::Definitions => self.definitions.is_empty(),
            LocationKind::References => self.definitions.is_empty() && self.references.is_empty(),
            LocationKind::Implementations => self.implementations.is_empty(),
        }
    }

    /// The symbol-location table and symbol names that find the same answer
    /// in other documents of the upload.
    pub fn search_terms(&self, kind: LocationKind) -> (LocationKind, Vec<&str>) {
        let mut symbols: Vec<&str> = match kind {
            LocationKind::Definitions => vec![self.definition_symbol.as_str()],
            LocationKind::References => std::iter::once(self.definition_symbol.as_str())
                .chain(self.reference_symbols.iter().map(String::as_str))
                .collect(),
            LocationKind::Implementations => {
                self.implementation_symbols.iter().map(String::as_str).collect()
            }
        };
        let mut seen = HashSet::new();
        symbols.retain(|symbol| !symbol.is_empty() && seen.insert(*symbol));
        let table = match kind {
            LocationKind::Implementations => LocationKind::Definitions,
            other => other,
        };
        (table, symbols)
    }
}

pub fn hover_text(documentation: &[String]) -> String {
    documentation.join("\n\n")
}

/// Resolves `occurrence` against the symbol graph of `document`.
///
/// A symbol missing from the document's symbol table is not an error; it
/// resolves to itself with no documentation and no relationships.
pub fn expand(document: &Document, occurrence: &Occurrence) -> SymbolExpansion {
    let mut expansion = SymbolExpansion::default();

    if occurrence.has_symbol() {
        let symbol = occurrence.symbol.as_str();
        expansion.definition_symbol = symbol.to_string();
        expansion.reference_symbols.push(symbol.to_string());

        if let Some(info) = document.symbol_information(symbol) {
            expansion.hover_text = hover_text(&info.documentation);
            for relationship in &info.relationships {
                if relationship.is_definition {
                    expansion.definition_symbol = relationship.symbol.clone();
                }
                if relationship.is_reference
                    && !expansion.reference_symbols.contains(&relationship.symbol)
                {
                    expansion.reference_symbols.push(relationship.symbol.clone());
                }
                if relationship.is_implementation
                    && !expansion.implementation_symbols.contains(&relationship.symbol)
                {
                    expansion.implementation_symbols.push(relationship.symbol.clone());
                }
            }
        }

        for other in &document.occurrences {
            if !other.has_symbol() {
                continue;
            }
            let is_definition = other.is_definition();
            if is_definition && other.symbol == expansion.definition_symbol {
                expansion.definitions.push(other.range);
            }
            if !is_definition && expansion.reference_symbols.contains(&other.symbol) {
                expansion.references.push(other.range);
            }
            if is_definition && expansion.implementation_symbols.contains(&other.symbol) {
                expansion.implementations.push(other.range);
            }
        }
    }

    if !occurrence.override_documentation.is_empty() {
        expansion.hover_text = hover_text(&occurrence.override_documentation);
    }

    expansion
}

#[cfg(test)]
mod tests {
    use super::*;
    use codenav_api::{Relationship, SymbolInformation, SymbolRole};

    fn def(symbol: &str, line: u32) -> Occurrence {
        Occurrence {
            range: Range::new(line, 0, line, 4),
            symbol: symbol.to_string(),
            symbol_roles: SymbolRole::DEFINITION,
            ..Default::default()
        }
    }

    fn reference(symbol: &str, line: u32) -> Occurrence {
        Occurrence {
            range: Range::new(line, 0, line, 4),
            symbol: symbol.to_string(),
            symbol_roles: SymbolRole::READ_ACCESS,
            ..Default::default()
        }
    }

    fn relationship(symbol: &str) -> Relationship {
        Relationship {
            symbol: symbol.to_string(),
            ..Default::default()
        }
    }

    fn document() -> Document {
        Document {
            path: "main.go".into(),
            occurrences: vec![
                def("s S#", 0),
                def("s I#", 1),
                reference("s S#", 2),
                reference("s S#", 3),
                reference("s I#", 4),
                def("s T#", 5),
            ],
            symbols: vec![
                SymbolInformation {
                    symbol: "s S#".into(),
                    documentation: vec!["```go\ntype S\n```".into(), "S does things".into()],
                    relationships: vec![Relationship {
                        is_implementation: true,
                        ..relationship("s I#")
                    }],
                },
                SymbolInformation {
                    symbol: "s T#".into(),
                    documentation: vec![],
                    relationships: vec![Relationship {
                        is_definition: true,
                        is_reference: true,
                        ..relationship("s S#")
                    }],
                },
            ],
        }
    }

    #[test]
    fn definitions_and_references_of_own_symbol() {
        let doc = document();
        let expansion = expand(&doc, &doc.occurrences[2]);
        assert_eq!(expansion.definitions, vec![Range::new(0, 0, 0, 4)]);
        assert_eq!(
            expansion.references,
            vec![Range::new(2, 0, 2, 4), Range::new(3, 0, 3, 4)]
        );
        assert_eq!(expansion.hover_text, "```go\ntype S\n```\n\nS does things");
    }

    #[test]
    fn implementation_relationships() {
        let doc = document();
        let expansion = expand(&doc, &doc.occurrences[0]);
        assert_eq!(expansion.implementations, vec![Range::new(1, 0, 1, 4)]);
        assert_eq!(expansion.implementation_symbols, vec!["s I#".to_string()]);
    }

    #[test]
    fn own_definition_is_never_an_implementation() {
        let doc = document();
        for occurrence in &doc.occurrences {
            let expansion = expand(&doc, occurrence);
            for range in &expansion.implementations {
                assert!(
                    !expansion.definitions.contains(range),
                    "{range} is both a definition and an implementation of {}",
                    occurrence.symbol
                );
            }
        }
    }

    #[test]
    fn definition_relationship_reassigns_definition_symbol() {
        let doc = document();
        let expansion = expand(&doc, &doc.occurrences[5]);
        assert_eq!(expansion.definition_symbol, "s S#");
        assert_eq!(expansion.definitions, vec![Range::new(0, 0, 0, 4)]);
        // references of T itself plus references of S
        assert_eq!(expansion.references.len(), 2);
    }

    #[test]
    fn references_query_is_union_of_definitions_and_references() {
        let doc = document();
        let expansion = expand(&doc, &doc.occurrences[2]);
        let refs = expansion.ranges(LocationKind::References);
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0], Range::new(0, 0, 0, 4));
    }

    #[test]
    fn unknown_symbol_resolves_to_itself() {
        let doc = document();
        let expansion = expand(&doc, &reference("s I#", 9));
        assert_eq!(expansion.definitions, vec![Range::new(1, 0, 1, 4)]);
        assert_eq!(expansion.references, vec![Range::new(4, 0, 4, 4)]);
        assert!(expansion.hover_text.is_empty());
    }

    #[test]
    fn empty_symbol_only_uses_override_documentation() {
        let doc = document();
        let occurrence = Occurrence {
            range: Range::new(7, 0, 7, 1),
            override_documentation: vec!["keyword".into()],
            ..Default::default()
        };
        let expansion = expand(&doc, &occurrence);
        assert!(expansion.is_empty(LocationKind::References));
        assert_eq!(expansion.hover_text, "keyword");
    }

    #[test]
    fn override_documentation_wins() {
        let doc = document();
        let mut occurrence = doc.occurrences[2].clone();
        occurrence.override_documentation = vec!["field of S".into()];
        assert_eq!(expand(&doc, &occurrence).hover_text, "field of S");
    }

    #[test]
    fn search_terms_per_kind() {
        let doc = document();
        let expansion = expand(&doc, &doc.occurrences[5]);
        let (table, symbols) = expansion.search_terms(LocationKind::References);
        assert_eq!(table, LocationKind::References);
        assert_eq!(symbols, vec!["s S#", "s T#"]);

        let expansion = expand(&doc, &doc.occurrences[0]);
        let (table, symbols) = expansion.search_terms(LocationKind::Implementations);
        assert_eq!(table, LocationKind::Definitions);
        assert_eq!(symbols, vec!["s I#"]);
    }
}
