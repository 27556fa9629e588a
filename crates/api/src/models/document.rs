use super::position::Range;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Bit flags describing how an occurrence relates to its symbol.
pub struct SymbolRole;

impl SymbolRole {
    pub const DEFINITION: i32 = 0x1;
    pub const IMPORT: i32 = 0x2;
    pub const WRITE_ACCESS: i32 = 0x4;
    pub const READ_ACCESS: i32 = 0x8;
    pub const GENERATED: i32 = 0x10;
    pub const TEST: i32 = 0x20;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Occurrence {
    pub range: Range,
    /// Empty for ranges that carry no symbol.
    pub symbol: String,
    pub symbol_roles: i32,
    /// Documentation attached to this occurrence only. Takes precedence over
    /// the symbol's own documentation.
    pub override_documentation: Vec<String>,
    /// Compiler or linter findings reported at this range.
    pub diagnostics: Vec<Diagnostic>,
}

impl Occurrence {
    pub fn is_definition(&self) -> bool {
        self.symbol_roles & SymbolRole::DEFINITION != 0
    }

    pub fn has_symbol(&self) -> bool {
        !self.symbol.is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSeverity {
    #[default]
    Unspecified,
    Error,
    Warning,
    Information,
    Hint,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, JsonSchema)]
#[serde(default)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: String,
    pub message: String,
    /// Tool that produced the diagnostic, e.g. `go vet`.
    pub source: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Relationship {
    pub symbol: String,
    pub is_reference: bool,
    pub is_implementation: bool,
    pub is_definition: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SymbolInformation {
    pub symbol: String,
    pub documentation: Vec<String>,
    pub relationships: Vec<Relationship>,
}

/// One file's indexed data within an upload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Document {
    pub path: String,
    pub occurrences: Vec<Occurrence>,
    pub symbols: Vec<SymbolInformation>,
}

impl Document {
    pub fn symbol_information(&self, symbol: &str) -> Option<&SymbolInformation> {
        self.symbols.iter().find(|info| info.symbol == symbol)
    }
}

/// A decoded document together with its storage identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: i64,
    pub upload_id: super::upload::UploadId,
    pub document: Document,
}

/// One link of a prefix-compressed symbol name. A full name is the
/// concatenation of segment texts from a root down to a leaf.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SymbolNameSegment {
    pub id: i64,
    pub upload_id: super::upload::UploadId,
    pub parent_id: Option<i64>,
    pub text: String,
}
