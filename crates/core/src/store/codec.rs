//! On-disk document payloads.
//!
//! Payloads are MessagePack compressed with zstd. Two layouts exist and are
//! told apart by the row's `schema_version`:
//!
//! - version 1 stores every symbol, documentation and diagnostic string once
//!   in a pool and refers to it by `u32` id;
//! - version 2 stores strings inline.
//!
//! Both decode into the same [`Document`]; callers never see the layout.

use codenav_api::{
    Diagnostic, DiagnosticSeverity, Document, Occurrence, Range, Relationship, SymbolInformation,
};
use lasso::{Key, Rodeo};
use serde::{Deserialize, Serialize};

pub const LEGACY_SCHEMA_VERSION: i64 = 1;
pub const CURRENT_SCHEMA_VERSION: i64 = 2;

const ZSTD_LEVEL: i32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("unknown schema version {0}")]
    UnknownSchema(i64),
    #[error("zstd: {0}")]
    Compression(#[from] std::io::Error),
    #[error("msgpack decode: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("msgpack encode: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("string id {0} is outside the pool")]
    DanglingString(u32),
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct StringPool {
    pub strings: Vec<String>,
}

impl StringPool {
    fn resolve(&self, sid: u32) -> Result<&str, CodecError> {
        self.strings
            .get(sid as usize)
            .map(String::as_str)
            .ok_or(CodecError::DanglingString(sid))
    }

    fn resolve_all(&self, sids: &[u32]) -> Result<Vec<String>, CodecError> {
        sids.iter()
            .map(|sid| self.resolve(*sid).map(str::to_string))
            .collect()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PooledOccurrence {
    pub range: Range,
    pub symbol_sid: Option<u32>,
    pub roles: i32,
    pub documentation_sids: Vec<u32>,
    /// Absent from payloads written before diagnostics were stored.
    #[serde(default)]
    pub diagnostics: Vec<PooledDiagnostic>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PooledDiagnostic {
    pub severity: DiagnosticSeverity,
    pub code_sid: u32,
    pub message_sid: u32,
    pub source_sid: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PooledRelationship {
    pub symbol_sid: u32,
    pub is_reference: bool,
    pub is_implementation: bool,
    pub is_definition: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PooledSymbol {
    pub symbol_sid: u32,
    pub documentation_sids: Vec<u32>,
    pub relationships: Vec<PooledRelationship>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct LegacyDocument {
    pub pool: StringPool,
    pub occurrences: Vec<PooledOccurrence>,
    pub symbols: Vec<PooledSymbol>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CurrentDocument {
    pub occurrences: Vec<Occurrence>,
    pub symbols: Vec<SymbolInformation>,
}

/// A payload resolved to its layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentPayload {
    Legacy(LegacyDocument),
    Current(CurrentDocument),
}

impl DocumentPayload {
    pub fn current(document: &Document) -> Self {
        DocumentPayload::Current(CurrentDocument {
            occurrences: document.occurrences.clone(),
            symbols: document.symbols.clone(),
        })
    }

    /// Builds the pooled layout, interning each distinct string once.
    pub fn legacy(document: &Document) -> Self {
        let mut rodeo = Rodeo::default();
        let mut intern = |s: &str| rodeo.get_or_intern(s).into_usize() as u32;

        let occurrences = document
            .occurrences
            .iter()
            .map(|occurrence| PooledOccurrence {
                range: occurrence.range,
                symbol_sid: occurrence.has_symbol().then(|| intern(occurrence.symbol.as_str())),
                roles: occurrence.symbol_roles,
                documentation_sids: occurrence
                    .override_documentation
                    .iter()
                    .map(|doc| intern(doc.as_str()))
                    .collect(),
                diagnostics: occurrence
                    .diagnostics
                    .iter()
                    .map(|diagnostic| PooledDiagnostic {
                        severity: diagnostic.severity,
                        code_sid: intern(diagnostic.code.as_str()),
                        message_sid: intern(diagnostic.message.as_str()),
                        source_sid: intern(diagnostic.source.as_str()),
                    })
                    .collect(),
            })
            .collect();

        let symbols = document
            .symbols
            .iter()
            .map(|info| PooledSymbol {
                symbol_sid: intern(info.symbol.as_str()),
                documentation_sids: info.documentation.iter().map(|doc| intern(doc.as_str())).collect(),
                relationships: info
                    .relationships
                    .iter()
                    .map(|rel| PooledRelationship {
                        symbol_sid: intern(rel.symbol.as_str()),
                        is_reference: rel.is_reference,
                        is_implementation: rel.is_implementation,
                        is_definition: rel.is_definition,
                    })
                    .collect(),
            })
            .collect();

        let mut strings = vec![String::new(); rodeo.len()];
        for (key, value) in rodeo.iter() {
            strings[key.into_usize()] = value.to_string();
        }

        DocumentPayload::Legacy(LegacyDocument {
            pool: StringPool { strings },
            occurrences,
            symbols,
        })
    }

    pub fn schema_version(&self) -> i64 {
        match self {
            DocumentPayload::Legacy(_) => LEGACY_SCHEMA_VERSION,
            DocumentPayload::Current(_) => CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let bytes = match self {
            DocumentPayload::Legacy(doc) => rmp_serde::to_vec(doc)?,
            DocumentPayload::Current(doc) => rmp_serde::to_vec(doc)?,
        };
        Ok(zstd::encode_all(&bytes[..], ZSTD_LEVEL)?)
    }

    pub fn decode(schema_version: i64, bytes: &[u8]) -> Result<Self, CodecError> {
        if schema_version != LEGACY_SCHEMA_VERSION && schema_version != CURRENT_SCHEMA_VERSION {
            return Err(CodecError::UnknownSchema(schema_version));
        }
        let decompressed = zstd::decode_all(bytes)?;
        Ok(match schema_version {
            LEGACY_SCHEMA_VERSION => DocumentPayload::Legacy(rmp_serde::from_slice(&decompressed)?),
            _ => DocumentPayload::Current(rmp_serde::from_slice(&decompressed)?),
        })
    }

    pub fn into_document(self, path: String) -> Result<Document, CodecError> {
        match self {
            DocumentPayload::Current(doc) => Ok(Document {
                path,
                occurrences: doc.occurrences,
                symbols: doc.symbols,
            }),
            DocumentPayload::Legacy(doc) => {
                let pool = &doc.pool;
                let occurrences = doc
                    .occurrences
                    .iter()
                    .map(|occurrence| {
                        Ok(Occurrence {
                            range: occurrence.range,
                            symbol: match occurrence.symbol_sid {
                                Some(sid) => pool.resolve(sid)?.to_string(),
                                None => String::new(),
                            },
                            symbol_roles: occurrence.roles,
                            override_documentation: pool.resolve_all(&occurrence.documentation_sids)?,
                            diagnostics: occurrence
                                .diagnostics
                                .iter()
                                .map(|diagnostic| {
                                    Ok(Diagnostic {
                                        severity: diagnostic.severity,
                                        code: pool.resolve(diagnostic.code_sid)?.to_string(),
                                        message: pool.resolve(diagnostic.message_sid)?.to_string(),
                                        source: pool.resolve(diagnostic.source_sid)?.to_string(),
                                    })
                                })
                                .collect::<Result<Vec<_>, CodecError>>()?,
                        })
                    })
                    .collect::<Result<Vec<_>, CodecError>>()?;
                let symbols = doc
                    .symbols
                    .iter()
                    .map(|symbol| {
                        let relationships = symbol
                            .relationships
                            .iter()
                            .map(|rel| {
                                Ok(Relationship {
                                    symbol: pool.resolve(rel.symbol_sid)?.to_string(),
                                    is_reference: rel.is_reference,
                                    is_implementation: rel.is_implementation,
                                    is_definition: rel.is_definition,
                                })
                            })
                            .collect::<Result<Vec<_>, CodecError>>()?;
                        Ok(SymbolInformation {
                            symbol: pool.resolve(symbol.symbol_sid)?.to_string(),
                            documentation: pool.resolve_all(&symbol.documentation_sids)?,
                            relationships,
                        })
                    })
                    .collect::<Result<Vec<_>, CodecError>>()?;
                Ok(Document {
                    path,
                    occurrences,
                    symbols,
                })
            }
        }
    }
}

/// Decodes a stored row into a document.
pub fn decode_document(path: &str, schema_version: i64, bytes: &[u8]) -> Result<Document, CodecError> {
    DocumentPayload::decode(schema_version, bytes)?.into_document(path.to_string())
}
