//! Position lookups over a document's occurrence list.

use codenav_api::{CodeNavError, Occurrence, Position, Range, Result};
use std::cmp::Reverse;

/// Occurrences whose range contains `(line, character)`, innermost first.
///
/// A range nested in another sorts before its container. Identical ranges
/// keep their document order.
pub fn find_occurrences(occurrences: &[Occurrence], line: u32, character: u32) -> Vec<&Occurrence> {
    let position = Position::new(line, character);
    let mut matches: Vec<&Occurrence> = occurrences
        .iter()
        .filter(|occurrence| occurrence.range.contains(position))
        .collect();
    // Every match contains the position, so a later start or an earlier end
    // means a tighter range.
    matches.sort_by_key(|occurrence| (Reverse(occurrence.range.start), occurrence.range.end));
    matches
}

/// The occurrence whose range equals `range` exactly.
///
/// Several matches naming the same symbol collapse to the first. Matches
/// naming different symbols cannot be told apart and are an error.
pub fn occurrence_at_exact_range<'a>(
    path: &str,
    occurrences: &'a [Occurrence],
    range: Range,
) -> Result<Option<&'a Occurrence>> {
    let mut matches = occurrences.iter().filter(|occurrence| occurrence.range == range);
    let Some(first) = matches.next() else {
        return Ok(None);
    };
    let rest: Vec<&Occurrence> = matches.collect();
    if rest.iter().any(|other| other.symbol != first.symbol) {
        return Err(CodeNavError::AmbiguousOccurrence {
            path: path.to_string(),
            range,
            count: rest.len() + 1,
        });
    }
    Ok(Some(first))
}

/// Occurrences touching the half-open line interval, in document order.
pub fn occurrences_in_lines(occurrences: &[Occurrence], start_line: u32, end_line: u32) -> Vec<&Occurrence> {
    occurrences
        .iter()
        .filter(|occurrence| occurrence.range.intersects_lines(start_line, end_line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(symbol: &str, range: Range) -> Occurrence {
        Occurrence {
            range,
            symbol: symbol.to_string(),
            ..Default::default()
        }
    }

    fn symbols<'a>(found: &[&'a Occurrence]) -> Vec<&'a str> {
        found.iter().map(|o| o.symbol.as_str()).collect()
    }

    #[test]
    fn matches_inclusive_boundaries() {
        let occurrences = vec![occ("a", Range::new(1, 4, 1, 8)), occ("b", Range::new(2, 0, 2, 3))];
        assert_eq!(symbols(&find_occurrences(&occurrences, 1, 4)), vec!["a"]);
        assert_eq!(symbols(&find_occurrences(&occurrences, 1, 8)), vec!["a"]);
        assert!(find_occurrences(&occurrences, 1, 9).is_empty());
        assert!(find_occurrences(&occurrences, 0, 5).is_empty());
    }

    #[test]
    fn multi_line_ranges_use_lexicographic_order() {
        let occurrences = vec![occ("block", Range::new(3, 10, 6, 2))];
        assert_eq!(find_occurrences(&occurrences, 4, 0).len(), 1);
        assert_eq!(find_occurrences(&occurrences, 3, 99).len(), 1);
        assert!(find_occurrences(&occurrences, 3, 9).is_empty());
        assert!(find_occurrences(&occurrences, 6, 3).is_empty());
    }

    #[test]
    fn innermost_first() {
        let occurrences = vec![
            occ("outer", Range::new(0, 0, 10, 0)),
            occ("inner", Range::new(2, 4, 2, 9)),
            occ("middle", Range::new(1, 0, 5, 0)),
        ];
        assert_eq!(
            symbols(&find_occurrences(&occurrences, 2, 5)),
            vec!["inner", "middle", "outer"]
        );
    }

    #[test]
    fn identical_ranges_keep_document_order() {
        let range = Range::new(1, 0, 1, 5);
        let occurrences = vec![occ("first", range), occ("second", range)];
        assert_eq!(
            symbols(&find_occurrences(&occurrences, 1, 2)),
            vec!["first", "second"]
        );
    }

    #[test]
    fn exact_range_lookup() {
        let range = Range::new(1, 0, 1, 5);
        let occurrences = vec![occ("a", range), occ("b", Range::new(1, 0, 1, 6))];
        let found = occurrence_at_exact_range("a.go", &occurrences, range).unwrap();
        assert_eq!(found.map(|o| o.symbol.as_str()), Some("a"));
        assert!(
            occurrence_at_exact_range("a.go", &occurrences, Range::new(9, 0, 9, 1))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn exact_range_with_same_symbol_twice_is_fine() {
        let range = Range::new(1, 0, 1, 5);
        let occurrences = vec![occ("a", range), occ("a", range)];
        assert!(occurrence_at_exact_range("a.go", &occurrences, range).unwrap().is_some());
    }

    #[test]
    fn exact_range_with_distinct_symbols_is_ambiguous() {
        let range = Range::new(1, 0, 1, 5);
        let occurrences = vec![occ("a", range), occ("b", range)];
        let err = occurrence_at_exact_range("a.go", &occurrences, range).unwrap_err();
        assert!(matches!(err, CodeNavError::AmbiguousOccurrence { count: 2, .. }));
    }

    #[test]
    fn line_window_is_half_open() {
        let occurrences = vec![
            occ("a", Range::new(0, 0, 0, 3)),
            occ("b", Range::new(2, 0, 2, 3)),
            occ("c", Range::new(4, 0, 4, 3)),
        ];
        assert_eq!(symbols(&occurrences_in_lines(&occurrences, 0, 4)), vec!["a", "b"]);
        assert_eq!(symbols(&occurrences_in_lines(&occurrences, 4, 5)), vec!["c"]);
    }
}
