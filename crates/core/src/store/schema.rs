use rusqlite::{Connection, OptionalExtension, params};

pub const SCHEMA_VERSION: i64 = 1;

pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        BEGIN;
        CREATE TABLE IF NOT EXISTS meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS uploads (
            id INTEGER PRIMARY KEY,
            repository_id INTEGER NOT NULL,
            repository_name TEXT NOT NULL,
            commit_sha TEXT NOT NULL,
            root TEXT NOT NULL DEFAULT '',
            indexer TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_uploads_repository_commit
            ON uploads(repository_id, commit_sha);

        CREATE TABLE IF NOT EXISTS documents (
            id INTEGER PRIMARY KEY,
            upload_id INTEGER NOT NULL,
            path TEXT NOT NULL,
            schema_version INTEGER NOT NULL,
            payload BLOB NOT NULL,
            UNIQUE(upload_id, path),
            FOREIGN KEY(upload_id) REFERENCES uploads(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS symbol_locations (
            upload_id INTEGER NOT NULL,
            kind TEXT NOT NULL,
            scheme TEXT NOT NULL,
            identifier TEXT NOT NULL,
            path TEXT NOT NULL,
            start_line INTEGER NOT NULL,
            start_char INTEGER NOT NULL,
            end_line INTEGER NOT NULL,
            end_char INTEGER NOT NULL,
            FOREIGN KEY(upload_id) REFERENCES uploads(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_symbol_locations_lookup
            ON symbol_locations(kind, scheme, identifier);
        CREATE INDEX IF NOT EXISTS idx_symbol_locations_upload
            ON symbol_locations(upload_id, path);

        CREATE TABLE IF NOT EXISTS symbol_names (
            id INTEGER PRIMARY KEY,
            upload_id INTEGER NOT NULL,
            parent_id INTEGER,
            text TEXT NOT NULL,
            FOREIGN KEY(upload_id) REFERENCES uploads(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_symbol_names_upload ON symbol_names(upload_id);
        COMMIT;
        ",
    )?;

    let current: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    if current.is_none() {
        conn.execute(
            "INSERT INTO meta(key, value) VALUES ('schema_version', ?1)",
            params![SCHEMA_VERSION.to_string()],
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        let version: String = conn
            .query_row("SELECT value FROM meta WHERE key = 'schema_version'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION.to_string());
    }
}
