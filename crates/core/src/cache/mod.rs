pub mod line_ranges;

pub use line_ranges::{LineRangeCache, LineRangeKey};
