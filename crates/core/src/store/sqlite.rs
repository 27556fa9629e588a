use super::codec::{self, DocumentPayload};
use super::fixture::{ImportBundle, PayloadLayout, SymbolLocationRow, derive_symbol_locations};
use super::{StoreError, schema};
use crate::config::CodeNavConfig;
use async_trait::async_trait;
use codenav_api::{
    BulkLocationQuery, CodeIntelStore, CodeNavError, Document, Location, Moniker,
    MonikerUploadQuery, Range, RepositoryId, Result, StoredDocument, SymbolNameSegment, Upload,
    UploadBatch, UploadId, UploadService,
};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const UPLOAD_COLUMNS: &str = "u.id, u.repository_id, u.repository_name, u.commit_sha, u.root, u.indexer";

#[derive(Debug)]
struct ConnectionCustomizer {
    busy_timeout: Duration,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        configure(conn, self.busy_timeout)
    }

    fn on_release(&self, _conn: Connection) {}
}

fn configure(conn: &Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        ",
    )
}

/// SQLite-backed document store and upload catalogue.
///
/// Reads go through a connection pool; the fixture writer serialises on a
/// single write connection. Every call runs on the blocking thread pool.
#[derive(Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
    write_conn: Arc<Mutex<Connection>>,
    read_pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    pub fn open(config: &CodeNavConfig) -> std::result::Result<Self, StoreError> {
        Self::open_with(
            &config.database_path,
            config.pool_size,
            config.pool_min_idle,
            Duration::from_secs(config.busy_timeout_secs),
        )
    }

    pub fn open_with(
        db_path: &Path,
        pool_size: u32,
        pool_min_idle: u32,
        busy_timeout: Duration,
    ) -> std::result::Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!(
            "Opening {} (pool size: {}, min idle: {})",
            db_path.display(),
            pool_size,
            pool_min_idle
        );

        let write_conn = Connection::open(db_path)?;
        configure(&write_conn, busy_timeout)?;
        schema::migrate(&write_conn)?;

        let manager = SqliteConnectionManager::file(db_path);
        let max_size = pool_size.max(1);
        let read_pool = Pool::builder()
            .max_size(max_size)
            .min_idle(Some(pool_min_idle.min(max_size)))
            .connection_timeout(busy_timeout)
            .connection_customizer(Box::new(ConnectionCustomizer { busy_timeout }))
            .build(manager)?;

        Ok(Self {
            db_path: db_path.to_path_buf(),
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn read<T, F>(&self, operation: &'static str, key: String, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> std::result::Result<T, StoreError> + Send + 'static,
    {
        let pool = self.read_pool.clone();
        let joined = tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            f(&conn)
        })
        .await;
        match joined {
            Ok(result) => result.map_err(|err| err.into_codenav(operation, key)),
            Err(err) => Err(StoreError::Join(err).into_codenav(operation, key)),
        }
    }

    async fn write<T, F>(&self, operation: &'static str, key: String, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> std::result::Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.write_conn);
        let joined = tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut conn)
        })
        .await;
        match joined {
            Ok(result) => result.map_err(|err| err.into_codenav(operation, key)),
            Err(err) => Err(StoreError::Join(err).into_codenav(operation, key)),
        }
    }

    // ---- Fixture writer ----

    pub async fn insert_upload(&self, upload: &Upload) -> Result<()> {
        let upload = upload.clone();
        self.write("insert_upload", format!("upload {}", upload.id), move |conn| {
            conn.execute(
                "INSERT INTO uploads (id, repository_id, repository_name, commit_sha, root, indexer)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    upload.id,
                    upload.repository_id,
                    upload.repository_name,
                    upload.commit,
                    upload.root,
                    upload.indexer
                ],
            )?;
            Ok(())
        })
        .await
    }

    /// Stores `document` and the symbol-location rows derived from it.
    /// Returns the document id.
    pub async fn insert_document(
        &self,
        upload_id: UploadId,
        document: &Document,
        layout: PayloadLayout,
    ) -> Result<i64> {
        let payload = match layout {
            PayloadLayout::Legacy => DocumentPayload::legacy(document),
            PayloadLayout::Current => DocumentPayload::current(document),
        };
        let rows = derive_symbol_locations(document);
        let path = document.path.clone();
        self.write(
            "insert_document",
            format!("{}:{}", upload_id, path),
            move |conn| {
                let bytes = payload.encode()?;
                let tx = conn.transaction()?;
                let id = upsert_document(&tx, upload_id, &path, payload.schema_version(), &bytes)?;
                tx.execute(
                    "DELETE FROM symbol_locations WHERE upload_id = ?1 AND path = ?2",
                    params![upload_id, path],
                )?;
                insert_location_rows(&tx, upload_id, &rows)?;
                tx.commit()?;
                Ok(id)
            },
        )
        .await
    }

    /// Stores a payload as-is, without deriving any rows.
    pub async fn insert_encoded_document(
        &self,
        upload_id: UploadId,
        path: &str,
        schema_version: i64,
        payload: Vec<u8>,
    ) -> Result<i64> {
        let path = path.to_string();
        self.write(
            "insert_encoded_document",
            format!("{}:{}", upload_id, path),
            move |conn| Ok(upsert_document(conn, upload_id, &path, schema_version, &payload)?),
        )
        .await
    }

    pub async fn insert_symbol_locations(
        &self,
        upload_id: UploadId,
        rows: Vec<SymbolLocationRow>,
    ) -> Result<()> {
        self.write(
            "insert_symbol_locations",
            format!("upload {}", upload_id),
            move |conn| {
                let tx = conn.transaction()?;
                insert_location_rows(&tx, upload_id, &rows)?;
                tx.commit()?;
                Ok(())
            },
        )
        .await
    }

    pub async fn insert_symbol_names(&self, segments: Vec<SymbolNameSegment>) -> Result<()> {
        self.write(
            "insert_symbol_names",
            format!("{} segments", segments.len()),
            move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO symbol_names (id, upload_id, parent_id, text)
                         VALUES (?1, ?2, ?3, ?4)",
                    )?;
                    for segment in &segments {
                        stmt.execute(params![
                            segment.id,
                            segment.upload_id,
                            segment.parent_id,
                            segment.text
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(())
            },
        )
        .await
    }

    /// Loads a whole bundle. Uploads go in first so documents can refer
    /// to them.
    pub async fn import_bundle(&self, bundle: ImportBundle) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        for upload in &bundle.uploads {
            self.insert_upload(upload).await?;
            summary.uploads += 1;
        }
        for entry in &bundle.documents {
            self.insert_document(entry.upload_id, &entry.document, entry.layout)
                .await?;
            summary.documents += 1;
        }
        summary.symbol_names = bundle.symbol_names.len();
        if !bundle.symbol_names.is_empty() {
            self.insert_symbol_names(bundle.symbol_names).await?;
        }
        tracing::info!(
            "Imported {} uploads, {} documents, {} symbol name segments",
            summary.uploads,
            summary.documents,
            summary.symbol_names
        );
        Ok(summary)
    }
}

/// Counts reported by [`SqliteStore::import_bundle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportSummary {
    pub uploads: usize,
    pub documents: usize,
    pub symbol_names: usize,
}

fn upsert_document(
    conn: &Connection,
    upload_id: UploadId,
    path: &str,
    schema_version: i64,
    payload: &[u8],
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO documents (upload_id, path, schema_version, payload)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(upload_id, path) DO UPDATE SET
            schema_version = excluded.schema_version,
            payload = excluded.payload",
        params![upload_id, path, schema_version, payload],
    )?;
    conn.query_row(
        "SELECT id FROM documents WHERE upload_id = ?1 AND path = ?2",
        params![upload_id, path],
        |row| row.get(0),
    )
}

fn insert_location_rows(
    conn: &Connection,
    upload_id: UploadId,
    rows: &[SymbolLocationRow],
) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO symbol_locations
            (upload_id, kind, scheme, identifier, path, start_line, start_char, end_line, end_char)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for row in rows {
        stmt.execute(params![
            upload_id,
            row.kind.as_str(),
            row.scheme,
            row.identifier,
            row.path,
            row.range.start.line,
            row.range.start.character,
            row.range.end.line,
            row.range.end.character
        ])?;
    }
    Ok(())
}

fn upload_from_row(row: &Row<'_>) -> rusqlite::Result<Upload> {
    Ok(Upload {
        id: row.get(0)?,
        repository_id: row.get(1)?,
        repository_name: row.get(2)?,
        commit: row.get(3)?,
        root: row.get(4)?,
        indexer: row.get(5)?,
    })
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn to_sql_count(value: usize) -> Value {
    Value::Integer(i64::try_from(value).unwrap_or(i64::MAX))
}

/// Monikers reduced to distinct (scheme, identifier) pairs, in order.
fn moniker_terms(monikers: &[Moniker]) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    monikers
        .iter()
        .map(|m| (m.scheme.clone(), m.identifier.clone()))
        .filter(|term| seen.insert(term.clone()))
        .collect()
}

fn push_moniker_filter(sql: &mut String, values: &mut Vec<Value>, terms: &[(String, String)]) {
    let clause = vec!["(s.scheme = ? AND s.identifier = ?)"; terms.len()].join(" OR ");
    sql.push_str(&format!(" AND ({clause})"));
    for (scheme, identifier) in terms {
        values.push(Value::Text(scheme.clone()));
        values.push(Value::Text(identifier.clone()));
    }
}

#[async_trait]
impl CodeIntelStore for SqliteStore {
    async fn document(&self, upload_id: UploadId, path: &str) -> Result<Option<Document>> {
        let path = path.to_string();
        self.read("document", format!("{}:{}", upload_id, path), move |conn| {
            let row: Option<(i64, Vec<u8>)> = conn
                .query_row(
                    "SELECT schema_version, payload FROM documents WHERE upload_id = ?1 AND path = ?2",
                    params![upload_id, path],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            let Some((schema_version, payload)) = row else {
                return Ok(None);
            };
            codec::decode_document(&path, schema_version, &payload)
                .map(Some)
                .map_err(|err| {
                    StoreError::CodeNav(CodeNavError::MalformedDocument {
                        upload_id,
                        path: path.clone(),
                        reason: err.to_string(),
                    })
                })
        })
        .await
    }

    async fn document_by_id(&self, document_id: i64) -> Result<Option<StoredDocument>> {
        self.read("document_by_id", format!("document {}", document_id), move |conn| {
            let row: Option<(UploadId, String, i64, Vec<u8>)> = conn
                .query_row(
                    "SELECT upload_id, path, schema_version, payload FROM documents WHERE id = ?1",
                    params![document_id],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                )
                .optional()?;
            let Some((upload_id, path, schema_version, payload)) = row else {
                return Ok(None);
            };
            let document = codec::decode_document(&path, schema_version, &payload).map_err(|err| {
                StoreError::CodeNav(CodeNavError::MalformedDocument {
                    upload_id,
                    path: path.clone(),
                    reason: err.to_string(),
                })
            })?;
            Ok(Some(StoredDocument {
                id: document_id,
                upload_id,
                document,
            }))
        })
        .await
    }

    async fn path_exists(&self, upload_id: UploadId, path: &str) -> Result<bool> {
        let path = path.to_string();
        self.read("path_exists", format!("{}:{}", upload_id, path), move |conn| {
            Ok(conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM documents WHERE upload_id = ?1 AND path = ?2)",
                params![upload_id, path],
                |row| row.get(0),
            )?)
        })
        .await
    }

    async fn bulk_locations(&self, query: BulkLocationQuery<'_>) -> Result<(Vec<Location>, usize)> {
        let terms = moniker_terms(query.monikers);
        if terms.is_empty() || query.upload_ids.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let mut filter = format!(
            "s.kind = ? AND s.upload_id IN ({})",
            placeholders(query.upload_ids.len())
        );
        let mut values = vec![Value::Text(query.kind.as_str().to_string())];
        values.extend(query.upload_ids.iter().map(|id| Value::Integer(*id)));
        push_moniker_filter(&mut filter, &mut values, &terms);
        for (upload_id, path) in query.skip_paths {
            filter.push_str(" AND NOT (s.upload_id = ? AND s.path = ?)");
            values.push(Value::Integer(*upload_id));
            values.push(Value::Text(path.clone()));
        }

        let key = format!("{} in {:?}", query.kind, query.upload_ids);
        let (limit, offset) = (to_sql_count(query.limit), to_sql_count(query.offset));
        self.read("bulk_locations", key, move |conn| {
            let distinct = format!(
                "SELECT DISTINCT s.upload_id, s.path, s.start_line, s.start_char, s.end_line, s.end_char
                 FROM symbol_locations s WHERE {filter}"
            );
            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM ({distinct})"),
                params_from_iter(values.iter()),
                |row| row.get(0),
            )?;

            let mut page_values = values;
            page_values.push(limit);
            page_values.push(offset);
            let mut stmt = conn.prepare(&format!(
                "{distinct} ORDER BY s.upload_id, s.path, s.start_line, s.start_char, s.end_line, s.end_char
                 LIMIT ? OFFSET ?"
            ))?;
            let rows = stmt.query_map(params_from_iter(page_values.iter()), |row| {
                Ok(Location {
                    upload_id: row.get(0)?,
                    path: row.get(1)?,
                    range: Range::new(row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?),
                })
            })?;
            let mut locations = Vec::new();
            for row in rows {
                locations.push(row?);
            }
            Ok((locations, total as usize))
        })
        .await
    }

    async fn symbol_name_segments(&self, upload_id: UploadId) -> Result<Vec<SymbolNameSegment>> {
        self.read("symbol_name_segments", format!("upload {}", upload_id), move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, upload_id, parent_id, text FROM symbol_names
                 WHERE upload_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![upload_id], |row| {
                Ok(SymbolNameSegment {
                    id: row.get(0)?,
                    upload_id: row.get(1)?,
                    parent_id: row.get(2)?,
                    text: row.get(3)?,
                })
            })?;
            let mut segments = Vec::new();
            for row in rows {
                segments.push(row?);
            }
            Ok(segments)
        })
        .await
    }
}

#[async_trait]
impl UploadService for SqliteStore {
    /// Uploads of the same repository and commit whose root is a prefix of
    /// `path`.
    async fn visible_uploads(
        &self,
        repository_id: RepositoryId,
        commit: &str,
        path: &str,
    ) -> Result<Vec<Upload>> {
        let commit = commit.to_string();
        let path = path.to_string();
        let key = format!("{}@{}:{}", repository_id, commit, path);
        self.read("visible_uploads", key, move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {UPLOAD_COLUMNS} FROM uploads u
                 WHERE u.repository_id = ?1 AND u.commit_sha = ?2
                   AND substr(?3, 1, length(u.root)) = u.root
                 ORDER BY u.id"
            ))?;
            let rows = stmt.query_map(params![repository_id, commit, path], upload_from_row)?;
            let mut uploads = Vec::new();
            for row in rows {
                uploads.push(row?);
            }
            Ok(uploads)
        })
        .await
    }

    async fn uploads_by_ids(&self, ids: &[UploadId]) -> Result<Vec<Upload>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let values: Vec<Value> = ids.iter().map(|id| Value::Integer(*id)).collect();
        self.read("uploads_by_ids", format!("{:?}", ids), move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {UPLOAD_COLUMNS} FROM uploads u WHERE u.id IN ({}) ORDER BY u.id",
                placeholders(values.len())
            ))?;
            let rows = stmt.query_map(params_from_iter(values.iter()), upload_from_row)?;
            let mut uploads = Vec::new();
            for row in rows {
                uploads.push(row?);
            }
            Ok(uploads)
        })
        .await
    }

    /// Candidates are uploads with rows for any of the monikers in the kind's
    /// table, ascending by id. Uploads of the requesting repository only
    /// count when they are at the requested commit.
    async fn uploads_providing_monikers(
        &self,
        query: MonikerUploadQuery<'_>,
    ) -> Result<UploadBatch> {
        let terms = moniker_terms(query.monikers);
        if terms.is_empty() {
            return Ok(UploadBatch::default());
        }

        let mut filter = String::from("s.kind = ?");
        let mut values = vec![Value::Text(query.kind.as_str().to_string())];
        push_moniker_filter(&mut filter, &mut values, &terms);
        if !query.exclude.is_empty() {
            filter.push_str(&format!(
                " AND u.id NOT IN ({})",
                placeholders(query.exclude.len())
            ));
            values.extend(query.exclude.iter().map(|id| Value::Integer(*id)));
        }
        filter.push_str(" AND (u.repository_id != ? OR u.commit_sha = ?)");
        values.push(Value::Integer(query.repository_id));
        values.push(Value::Text(query.commit.to_string()));

        let key = format!("{} monikers for {}", terms.len(), query.kind);
        let (limit, offset) = (to_sql_count(query.limit), to_sql_count(query.offset));
        self.read("uploads_providing_monikers", key, move |conn| {
            let from = format!(
                "FROM uploads u JOIN symbol_locations s ON s.upload_id = u.id WHERE {filter}"
            );
            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(DISTINCT u.id) {from}"),
                params_from_iter(values.iter()),
                |row| row.get(0),
            )?;

            let mut page_values = values;
            page_values.push(limit);
            page_values.push(offset);
            let mut stmt = conn.prepare(&format!(
                "SELECT DISTINCT {UPLOAD_COLUMNS} {from} ORDER BY u.id LIMIT ? OFFSET ?"
            ))?;
            let rows = stmt.query_map(params_from_iter(page_values.iter()), upload_from_row)?;
            let mut uploads = Vec::new();
            for row in rows {
                uploads.push(row?);
            }
            Ok(UploadBatch {
                scanned: uploads.len(),
                uploads,
                total: total as usize,
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codenav_api::{LocationKind, MonikerKind, Occurrence, SymbolRole};
    use tempfile::TempDir;

    const FUNC: &str = "scip-go gomod github.com/x/pkg v1 pkg/Func().";

    fn open(dir: &TempDir) -> SqliteStore {
        SqliteStore::open_with(&dir.path().join("codenav.db"), 2, 1, Duration::from_secs(5))
            .unwrap()
    }

    fn upload(id: UploadId, repository_id: RepositoryId, commit: &str, root: &str) -> Upload {
        Upload {
            id,
            repository_id,
            repository_name: format!("repo{repository_id}"),
            commit: commit.to_string(),
            root: root.to_string(),
            indexer: "scip-go".to_string(),
        }
    }

    fn func_document(path: &str, role: i32) -> Document {
        Document {
            path: path.to_string(),
            occurrences: vec![Occurrence {
                range: Range::new(2, 5, 2, 9),
                symbol: FUNC.to_string(),
                symbol_roles: role,
                ..Default::default()
            }],
            symbols: vec![],
        }
    }

    fn import_moniker() -> Vec<Moniker> {
        vec![crate::moniker::to_moniker(FUNC, MonikerKind::Import).unwrap().unwrap()]
    }

    #[tokio::test]
    async fn document_roundtrip_and_existence() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store.insert_upload(&upload(1, 10, "abc", "")).await.unwrap();
        let doc = func_document("main.go", SymbolRole::DEFINITION);
        let id = store.insert_document(1, &doc, PayloadLayout::Legacy).await.unwrap();

        assert_eq!(store.document(1, "main.go").await.unwrap(), Some(doc.clone()));
        assert!(store.document(1, "other.go").await.unwrap().is_none());
        assert!(store.path_exists(1, "main.go").await.unwrap());
        assert!(!store.path_exists(2, "main.go").await.unwrap());

        let stored = store.document_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.upload_id, 1);
        assert_eq!(stored.document, doc);
        assert!(store.document_by_id(id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_payload_is_malformed_not_missing() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store.insert_upload(&upload(1, 10, "abc", "")).await.unwrap();
        store
            .insert_encoded_document(1, "bad.go", codec::CURRENT_SCHEMA_VERSION, b"junk".to_vec())
            .await
            .unwrap();
        store
            .insert_encoded_document(1, "future.go", 42, b"junk".to_vec())
            .await
            .unwrap();

        for path in ["bad.go", "future.go"] {
            let err = store.document(1, path).await.unwrap_err();
            assert!(
                matches!(err, CodeNavError::MalformedDocument { upload_id: 1, .. }),
                "{path}: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn visible_uploads_respect_root_and_commit() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store.insert_upload(&upload(1, 10, "abc", "")).await.unwrap();
        store.insert_upload(&upload(2, 10, "abc", "sub/")).await.unwrap();
        store.insert_upload(&upload(3, 10, "def", "")).await.unwrap();
        store.insert_upload(&upload(4, 11, "abc", "")).await.unwrap();

        let ids = |uploads: Vec<Upload>| uploads.into_iter().map(|u| u.id).collect::<Vec<_>>();
        assert_eq!(ids(store.visible_uploads(10, "abc", "sub/a.go").await.unwrap()), vec![1, 2]);
        assert_eq!(ids(store.visible_uploads(10, "abc", "main.go").await.unwrap()), vec![1]);
        assert_eq!(ids(store.uploads_by_ids(&[4, 2, 99]).await.unwrap()), vec![2, 4]);
    }

    #[tokio::test]
    async fn moniker_candidates_are_paged_and_filtered() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store.insert_upload(&upload(1, 10, "abc", "")).await.unwrap();
        store.insert_upload(&upload(2, 20, "x", "")).await.unwrap();
        store.insert_upload(&upload(3, 30, "y", "")).await.unwrap();
        // same repository, stale commit
        store.insert_upload(&upload(4, 10, "old", "")).await.unwrap();
        for id in 1..=4 {
            let doc = func_document("pkg/func.go", SymbolRole::DEFINITION);
            store.insert_document(id, &doc, PayloadLayout::Current).await.unwrap();
        }

        let monikers = import_moniker();
        let query = |offset| MonikerUploadQuery {
            kind: LocationKind::Definitions,
            monikers: &monikers,
            exclude: &[1],
            repository_id: 10,
            commit: "abc",
            limit: 1,
            offset,
        };
        let first = store.uploads_providing_monikers(query(0)).await.unwrap();
        assert_eq!(first.total, 2);
        assert_eq!(first.scanned, 1);
        assert_eq!(first.uploads[0].id, 2);
        let second = store.uploads_providing_monikers(query(1)).await.unwrap();
        assert_eq!(second.uploads[0].id, 3);
        let past = store.uploads_providing_monikers(query(2)).await.unwrap();
        assert!(past.uploads.is_empty());
    }

    #[tokio::test]
    async fn bulk_locations_page_and_skip_paths() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store.insert_upload(&upload(1, 10, "abc", "")).await.unwrap();
        for path in ["a.go", "b.go", "c.go"] {
            store
                .insert_document(1, &func_document(path, 0), PayloadLayout::Current)
                .await
                .unwrap();
        }

        let monikers = import_moniker();
        let skip = vec![(1, "b.go".to_string())];
        let query = |offset| BulkLocationQuery {
            kind: LocationKind::References,
            upload_ids: &[1],
            monikers: &monikers,
            skip_paths: &skip,
            limit: 1,
            offset,
        };
        let (page, total) = store.bulk_locations(query(0)).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(page[0].path, "a.go");
        let (page, _) = store.bulk_locations(query(1)).await.unwrap();
        assert_eq!(page[0].path, "c.go");
        assert_eq!(page[0].range, Range::new(2, 5, 2, 9));
    }

    #[tokio::test]
    async fn symbol_name_segments_are_per_upload() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store.insert_upload(&upload(1, 10, "abc", "")).await.unwrap();
        store.insert_upload(&upload(2, 10, "abc", "")).await.unwrap();
        store
            .insert_symbol_names(vec![
                SymbolNameSegment { id: 1, upload_id: 1, parent_id: None, text: "foo".into() },
                SymbolNameSegment { id: 2, upload_id: 1, parent_id: Some(1), text: "/bar".into() },
                SymbolNameSegment { id: 3, upload_id: 2, parent_id: None, text: "x".into() },
            ])
            .await
            .unwrap();
        let segments = store.symbol_name_segments(1).await.unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].parent_id, Some(1));
    }
}
