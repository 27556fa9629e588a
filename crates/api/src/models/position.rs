use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based (line, character) position. Ordering is lexicographic.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, JsonSchema,
)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, JsonSchema,
)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start_line: u32, start_character: u32, end_line: u32, end_character: u32) -> Self {
        Self {
            start: Position::new(start_line, start_character),
            end: Position::new(end_line, end_character),
        }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    /// True if `other` lies entirely within `self`.
    pub fn encloses(&self, other: &Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True if the range touches any line in `[start_line, end_line)`.
    pub fn intersects_lines(&self, start_line: u32, end_line: u32) -> bool {
        self.start.line < end_line && self.end.line >= start_line
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start.line, self.start.character, self.end.line, self.end.character
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_lexicographic_and_inclusive() {
        let range = Range::new(2, 10, 4, 3);
        assert!(range.contains(Position::new(2, 10)));
        assert!(range.contains(Position::new(3, 0)));
        assert!(range.contains(Position::new(3, 500)));
        assert!(range.contains(Position::new(4, 3)));
        assert!(!range.contains(Position::new(2, 9)));
        assert!(!range.contains(Position::new(4, 4)));
        assert!(!range.contains(Position::new(1, 50)));
    }

    #[test]
    fn single_line_range() {
        let range = Range::new(5, 4, 5, 8);
        assert!(range.contains(Position::new(5, 4)));
        assert!(range.contains(Position::new(5, 8)));
        assert!(!range.contains(Position::new(5, 9)));
        assert!(!range.contains(Position::new(6, 0)));
    }

    #[test]
    fn encloses_nested_ranges() {
        let outer = Range::new(1, 0, 10, 0);
        let inner = Range::new(3, 2, 3, 9);
        assert!(outer.encloses(&inner));
        assert!(!inner.encloses(&outer));
        assert!(outer.encloses(&outer));
    }

    #[test]
    fn intersects_half_open_line_interval() {
        let range = Range::new(3, 0, 5, 2);
        assert!(range.intersects_lines(0, 4));
        assert!(range.intersects_lines(5, 6));
        assert!(!range.intersects_lines(0, 3));
        assert!(!range.intersects_lines(6, 9));
    }
}
