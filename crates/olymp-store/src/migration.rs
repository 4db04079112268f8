//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use olymp_core::now_millis;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
            tracing::debug!(version, "applied schema migration");
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Resources: buckets of entries, in creation order
        CREATE TABLE resources (
            resource_uid BLOB PRIMARY KEY,    -- 32 random bytes
            seq INTEGER NOT NULL UNIQUE,      -- creation order
            created_at INTEGER NOT NULL,      -- Unix ms
            public_body TEXT NOT NULL,        -- JSON
            private_body TEXT NOT NULL,       -- JSON
            origin_url TEXT NOT NULL,
            user_agent TEXT NOT NULL
        );

        -- Entries: one append-only log per resource
        CREATE TABLE entries (
            resource_uid BLOB NOT NULL REFERENCES resources(resource_uid),
            entry_uid BLOB NOT NULL,          -- 32 random bytes
            seq INTEGER NOT NULL,             -- position within the resource log
            created_at INTEGER NOT NULL,      -- Unix ms
            identification TEXT NOT NULL,
            public_body TEXT NOT NULL,        -- JSON
            private_body TEXT NOT NULL,       -- JSON
            origin_url TEXT NOT NULL,
            user_agent TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('active', 'deleted')),
            supersedes BLOB,                  -- entry_uid replaced by this record

            PRIMARY KEY (resource_uid, entry_uid),
            UNIQUE (resource_uid, seq),
            UNIQUE (resource_uid, supersedes)
        );

        -- Secret lookup: latest entry per identification
        CREATE INDEX idx_entries_identification ON entries(resource_uid, identification, seq);

        -- Nothing is ever rewritten or removed
        CREATE TRIGGER resources_insert_only_update BEFORE UPDATE ON resources
        BEGIN SELECT RAISE(ABORT, 'resources are insert-only'); END;
        CREATE TRIGGER resources_insert_only_delete BEFORE DELETE ON resources
        BEGIN SELECT RAISE(ABORT, 'resources are insert-only'); END;
        CREATE TRIGGER entries_insert_only_update BEFORE UPDATE ON entries
        BEGIN SELECT RAISE(ABORT, 'entries are insert-only'); END;
        CREATE TRIGGER entries_insert_only_delete BEFORE DELETE ON entries
        BEGIN SELECT RAISE(ABORT, 'entries are insert-only'); END;
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"resources".to_string()));
        assert!(tables.contains(&"entries".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn test_rows_cannot_be_rewritten() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        conn.execute(
            "INSERT INTO resources VALUES (x'01', 1, 0, '{}', '{}', '', '')",
            [],
        )
        .unwrap();

        assert!(conn
            .execute("UPDATE resources SET public_body = '{\"x\":1}'", [])
            .is_err());
        assert!(conn.execute("DELETE FROM resources", []).is_err());
    }

    #[test]
    fn test_newer_schema_is_refused() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (99, 0)",
            [],
        )
        .unwrap();

        assert!(matches!(migrate(&mut conn), Err(StoreError::Migration(_))));
    }
}
