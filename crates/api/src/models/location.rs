use super::document::Diagnostic;
use super::position::Range;
use super::upload::{Upload, UploadId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The result type a location query asks for. Each kind has its own
/// symbol-location table in the store.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Definitions,
    References,
    Implementations,
}

impl LocationKind {
    pub const ALL: [LocationKind; 3] = [
        LocationKind::Definitions,
        LocationKind::References,
        LocationKind::Implementations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LocationKind::Definitions => "definitions",
            LocationKind::References => "references",
            LocationKind::Implementations => "implementations",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A range inside one document of one upload. Paths are relative to the
/// upload root.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
pub struct Location {
    pub upload_id: UploadId,
    pub path: String,
    pub range: Range,
}

impl Location {
    pub fn new(upload_id: UploadId, path: impl Into<String>, range: Range) -> Self {
        Self {
            upload_id,
            path: path.into(),
            range,
        }
    }
}

/// A location translated into the commit the caller asked about.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct UploadLocation {
    pub upload: Upload,
    /// Repository-relative path (upload root included).
    pub path: String,
    pub target_commit: String,
    pub target_range: Range,
}

/// A diagnostic of a visible upload, translated like [`UploadLocation`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct DiagnosticAtUpload {
    pub upload: Upload,
    /// Repository-relative path (upload root included).
    pub path: String,
    pub diagnostic: Diagnostic,
    pub target_commit: String,
    pub target_range: Range,
}

/// Code intelligence attached to one occurrence, restricted to its document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct CodeIntelligenceRange {
    pub range: Range,
    pub definitions: Vec<UploadLocation>,
    pub references: Vec<UploadLocation>,
    pub implementations: Vec<UploadLocation>,
    pub hover_text: String,
}
