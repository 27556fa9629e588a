#![allow(dead_code)]

use codenav_api::{
    Document, Occurrence, Range, Relationship, RepositoryId, SymbolInformation, SymbolRole, Upload,
    UploadId,
};
use codenav_core::store::PayloadLayout;
use codenav_core::{CodeNavConfig, CodeNavService, IdentityTranslator, Operations, SqliteStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const FUNC: &str = "scip-go gomod github.com/acme/pkg v1.2.0 pkg/Func().";
pub const IFACE: &str = "scip-go gomod github.com/acme/pkg v1.2.0 pkg/Shape#";
pub const CIRCLE: &str = "scip-go gomod github.com/acme/pkg v1.2.0 pkg/Circle#";

pub struct Fixture {
    pub _dir: TempDir,
    pub store: SqliteStore,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store =
            SqliteStore::open_with(&dir.path().join("codenav.db"), 2, 1, Duration::from_secs(5))
                .unwrap();
        Self { _dir: dir, store }
    }

    pub fn service(&self) -> CodeNavService {
        self.service_with(CodeNavConfig::default())
    }

    pub fn service_with(&self, config: CodeNavConfig) -> CodeNavService {
        let store = Arc::new(self.store.clone());
        CodeNavService::new(
            store.clone(),
            store,
            Arc::new(IdentityTranslator),
            &config,
            Arc::new(Operations::default()),
        )
    }

    pub async fn upload(&self, upload: Upload) {
        self.store.insert_upload(&upload).await.unwrap();
    }

    pub async fn document(&self, upload_id: UploadId, document: Document) {
        self.store
            .insert_document(upload_id, &document, PayloadLayout::Current)
            .await
            .unwrap();
    }
}

pub fn upload(id: UploadId, repository_id: RepositoryId, commit: &str, root: &str) -> Upload {
    Upload {
        id,
        repository_id,
        repository_name: format!("github.com/acme/repo{repository_id}"),
        commit: commit.to_string(),
        root: root.to_string(),
        indexer: "scip-go".to_string(),
    }
}

pub fn definition(symbol: &str, range: Range) -> Occurrence {
    Occurrence {
        range,
        symbol: symbol.to_string(),
        symbol_roles: SymbolRole::DEFINITION,
        ..Default::default()
    }
}

pub fn reference(symbol: &str, range: Range) -> Occurrence {
    Occurrence {
        range,
        symbol: symbol.to_string(),
        symbol_roles: SymbolRole::READ_ACCESS,
        ..Default::default()
    }
}

pub fn documented(symbol: &str, documentation: &[&str]) -> SymbolInformation {
    SymbolInformation {
        symbol: symbol.to_string(),
        documentation: documentation.iter().map(|line| line.to_string()).collect(),
        relationships: vec![],
    }
}

pub fn implementing(symbol: &str, target: &str) -> SymbolInformation {
    SymbolInformation {
        symbol: symbol.to_string(),
        documentation: vec![],
        relationships: vec![Relationship {
            symbol: target.to_string(),
            is_implementation: true,
            ..Default::default()
        }],
    }
}

pub fn document(path: &str, occurrences: Vec<Occurrence>, symbols: Vec<SymbolInformation>) -> Document {
    Document {
        path: path.to_string(),
        occurrences,
        symbols,
    }
}
