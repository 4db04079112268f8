//! SQLite implementation of the Store trait.
//!
//! This is the durable storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking. Tables are
//! insert-only; triggers reject any UPDATE or DELETE.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde_json::Value;

use olymp_core::{Entry, EntryDraft, EntryStatus, EntryUid, Resource, ResourceUid};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{AppendResult, InsertResult, Store};

/// Entry columns plus the stored status of the successor, aliased on `e`.
/// `UNIQUE(resource_uid, supersedes)` allows at most one successor.
const ENTRY_COLUMNS: &str = "e.resource_uid, e.entry_uid, e.seq, e.created_at, e.identification,
    e.public_body, e.private_body, e.origin_url, e.user_agent, e.status, e.supersedes,
    (SELECT s.status FROM entries s
     WHERE s.resource_uid = e.resource_uid AND s.supersedes = e.entry_uid)";

const RESOURCE_COLUMNS: &str =
    "resource_uid, created_at, public_body, private_body, origin_url, user_agent";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file (and its parent directory) and runs migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Self::from_connection(conn)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking thread pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::LockPoisoned(format!("sqlite connection: {e}")))?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn uid_column<T: From<[u8; 32]>>(row: &rusqlite::Row<'_>, idx: usize, name: &str) -> rusqlite::Result<T> {
    let bytes: Vec<u8> = row.get(idx)?;
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| rusqlite::Error::InvalidColumnType(idx, name.into(), Type::Blob))?;
    Ok(T::from(arr))
}

fn json_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Value> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// Helper to convert a row selected with RESOURCE_COLUMNS to a Resource
fn row_to_resource(row: &rusqlite::Row<'_>) -> rusqlite::Result<Resource> {
    Ok(Resource {
        uid: uid_column(row, 0, "resource_uid")?,
        created_at: row.get(1)?,
        public_body: json_column(row, 2)?,
        private_body: json_column(row, 3)?,
        origin_url: row.get(4)?,
        user_agent: row.get(5)?,
    })
}

fn status_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Option<EntryStatus>> {
    row.get::<_, Option<String>>(idx)?
        .map(|s| EntryStatus::parse(&s))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// Helper to convert a row selected with ENTRY_COLUMNS to an Entry
fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entry> {
    let stored = status_column(row, 9)?
        .ok_or_else(|| rusqlite::Error::InvalidColumnType(9, "status".into(), Type::Null))?;
    let successor = status_column(row, 11)?;
    let supersedes = match row.get::<_, Option<Vec<u8>>>(10)? {
        None => None,
        Some(_) => Some(uid_column::<EntryUid>(row, 10, "supersedes")?),
    };

    Ok(Entry {
        resource_uid: uid_column(row, 0, "resource_uid")?,
        uid: uid_column(row, 1, "entry_uid")?,
        seq: row.get::<_, i64>(2)? as u64,
        created_at: row.get(3)?,
        identification: row.get(4)?,
        public_body: json_column(row, 5)?,
        private_body: json_column(row, 6)?,
        origin_url: row.get(7)?,
        user_agent: row.get(8)?,
        status: EntryStatus::effective(stored, successor),
        supersedes,
    })
}

fn append_in_tx(
    conn: &mut Connection,
    resource_uid: ResourceUid,
    draft: EntryDraft,
) -> Result<AppendResult> {
    // IMMEDIATE takes the write lock up front so the target check and the
    // insert see the same log.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let rid = resource_uid.as_bytes().as_slice();

    let resource_exists: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM resources WHERE resource_uid = ?1)",
        params![rid],
        |row| row.get(0),
    )?;
    if !resource_exists {
        return Ok(AppendResult::ResourceNotFound);
    }

    let uid_taken: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM entries WHERE resource_uid = ?1 AND entry_uid = ?2)",
        params![rid, draft.uid.as_bytes().as_slice()],
        |row| row.get(0),
    )?;
    if uid_taken {
        return Ok(AppendResult::DuplicateUid);
    }

    let identification = match draft.target() {
        None => draft.identification.clone(),
        Some(target) => {
            let current = tx
                .query_row(
                    &format!(
                        "SELECT {ENTRY_COLUMNS} FROM entries e
                         WHERE e.resource_uid = ?1 AND e.entry_uid = ?2"
                    ),
                    params![rid, target.as_bytes().as_slice()],
                    row_to_entry,
                )
                .optional()?;
            let Some(current) = current else {
                return Ok(AppendResult::TargetNotFound(target));
            };
            if !current.is_active() {
                return Ok(AppendResult::TargetNotActive {
                    target,
                    status: current.status,
                });
            }
            current.identification
        }
    };

    let seq: i64 = tx.query_row(
        "SELECT COALESCE(MAX(seq), 0) + 1 FROM entries WHERE resource_uid = ?1",
        params![rid],
        |row| row.get(0),
    )?;

    let entry = draft.into_entry(resource_uid, seq as u64, identification);

    tx.execute(
        "INSERT INTO entries (
            resource_uid, entry_uid, seq, created_at, identification,
            public_body, private_body, origin_url, user_agent, status, supersedes
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            rid,
            entry.uid.as_bytes().as_slice(),
            seq,
            entry.created_at,
            entry.identification,
            serde_json::to_string(&entry.public_body)?,
            serde_json::to_string(&entry.private_body)?,
            entry.origin_url,
            entry.user_agent,
            entry.status.as_str(),
            entry.supersedes.as_ref().map(|uid| uid.as_bytes().to_vec()),
        ],
    )?;

    tx.commit()?;
    Ok(AppendResult::Appended(entry))
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_resource(&self, resource: &Resource) -> Result<InsertResult> {
        let resource = resource.clone();

        self.blocking(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let rid = resource.uid.as_bytes().as_slice();

            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM resources WHERE resource_uid = ?1)",
                params![rid],
                |row| row.get(0),
            )?;
            if exists {
                return Ok(InsertResult::AlreadyExists);
            }

            tx.execute(
                "INSERT INTO resources (
                    resource_uid, seq, created_at, public_body, private_body,
                    origin_url, user_agent
                ) VALUES (
                    ?1, (SELECT COALESCE(MAX(seq), 0) + 1 FROM resources),
                    ?2, ?3, ?4, ?5, ?6
                )",
                params![
                    rid,
                    resource.created_at,
                    serde_json::to_string(&resource.public_body)?,
                    serde_json::to_string(&resource.private_body)?,
                    resource.origin_url,
                    resource.user_agent,
                ],
            )?;

            tx.commit()?;
            Ok(InsertResult::Inserted)
        })
        .await
    }

    async fn get_resource(&self, uid: &ResourceUid) -> Result<Option<Resource>> {
        let uid = *uid;

        self.blocking(move |conn| {
            conn.query_row(
                &format!("SELECT {RESOURCE_COLUMNS} FROM resources WHERE resource_uid = ?1"),
                params![uid.as_bytes().as_slice()],
                row_to_resource,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn has_resource(&self, uid: &ResourceUid) -> Result<bool> {
        let uid = *uid;

        self.blocking(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM resources WHERE resource_uid = ?1)",
                params![uid.as_bytes().as_slice()],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await
    }

    async fn list_resources(&self) -> Result<Vec<Resource>> {
        self.blocking(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {RESOURCE_COLUMNS} FROM resources ORDER BY seq"))?;
            let resources = stmt
                .query_map([], row_to_resource)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(resources)
        })
        .await
    }

    async fn append_entry(
        &self,
        resource_uid: &ResourceUid,
        draft: &EntryDraft,
    ) -> Result<AppendResult> {
        let resource_uid = *resource_uid;
        let draft = draft.clone();

        self.blocking(move |conn| append_in_tx(conn, resource_uid, draft))
            .await
    }

    async fn get_entry(
        &self,
        resource_uid: &ResourceUid,
        uid: &EntryUid,
    ) -> Result<Option<Entry>> {
        let resource_uid = *resource_uid;
        let uid = *uid;

        self.blocking(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {ENTRY_COLUMNS} FROM entries e
                     WHERE e.resource_uid = ?1 AND e.entry_uid = ?2"
                ),
                params![resource_uid.as_bytes().as_slice(), uid.as_bytes().as_slice()],
                row_to_entry,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list_entries(&self, resource_uid: &ResourceUid) -> Result<Vec<Entry>> {
        let resource_uid = *resource_uid;

        self.blocking(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM entries e
                 WHERE e.resource_uid = ?1 ORDER BY e.seq"
            ))?;
            let entries = stmt
                .query_map(params![resource_uid.as_bytes().as_slice()], row_to_entry)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
        .await
    }

    async fn count_entries(&self, resource_uid: &ResourceUid) -> Result<u64> {
        let resource_uid = *resource_uid;

        self.blocking(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM entries WHERE resource_uid = ?1",
                params![resource_uid.as_bytes().as_slice()],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }

    async fn latest_by_identification(
        &self,
        resource_uid: &ResourceUid,
        identification: &str,
    ) -> Result<Option<Entry>> {
        if identification.is_empty() {
            return Ok(None);
        }
        let resource_uid = *resource_uid;
        let identification = identification.to_string();

        self.blocking(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {ENTRY_COLUMNS} FROM entries e
                     WHERE e.resource_uid = ?1 AND e.identification = ?2
                     ORDER BY e.seq DESC LIMIT 1"
                ),
                params![resource_uid.as_bytes().as_slice(), identification],
                row_to_entry,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }
}
