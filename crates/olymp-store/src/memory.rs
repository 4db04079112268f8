//! In-memory implementation of the Store trait.
//!
//! Same semantics as SQLite, no persistence. Each resource owns its own
//! lock, so writers on different resources never wait on each other. The
//! table lock is only held long enough to find or insert a resource.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use olymp_core::{Entry, EntryDraft, EntryStatus, EntryUid, Resource, ResourceUid, SecretIndex};

use crate::error::{Result, StoreError};
use crate::traits::{AppendResult, InsertResult, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped.
pub struct MemoryStore {
    table: RwLock<ResourceTable>,
}

#[derive(Default)]
struct ResourceTable {
    /// Resource uids in creation order.
    order: Vec<ResourceUid>,
    slots: HashMap<ResourceUid, Arc<ResourceSlot>>,
}

struct ResourceSlot {
    resource: Resource,
    log: RwLock<EntryLog>,
}

#[derive(Default)]
struct EntryLog {
    /// Entries in log order, with their stored status.
    records: Vec<Entry>,

    /// Position index: entry uid -> index into `records`.
    positions: HashMap<EntryUid, usize>,

    /// Supersession index: target uid -> stored status of the record that
    /// replaced it.
    successors: HashMap<EntryUid, EntryStatus>,

    /// Identification -> position of its latest record.
    secrets: SecretIndex,
}

impl EntryLog {
    fn read_at(&self, pos: usize) -> Entry {
        let mut entry = self.records[pos].clone();
        entry.status =
            EntryStatus::effective(entry.status, self.successors.get(&entry.uid).copied());
        entry
    }

    fn append(&mut self, resource_uid: ResourceUid, draft: &EntryDraft) -> AppendResult {
        if self.positions.contains_key(&draft.uid) {
            return AppendResult::DuplicateUid;
        }

        let identification = match draft.target() {
            None => draft.identification.clone(),
            Some(target) => {
                let Some(&pos) = self.positions.get(&target) else {
                    return AppendResult::TargetNotFound(target);
                };
                let current = self.read_at(pos);
                if !current.is_active() {
                    return AppendResult::TargetNotActive {
                        target,
                        status: current.status,
                    };
                }
                current.identification
            }
        };

        let pos = self.records.len();
        let entry = draft
            .clone()
            .into_entry(resource_uid, pos as u64 + 1, identification);

        self.positions.insert(entry.uid, pos);
        if let Some(target) = entry.supersedes {
            self.successors.insert(target, entry.status);
        }
        self.secrets.record(&entry.identification, pos);
        self.records.push(entry.clone());

        AppendResult::Appended(entry)
    }
}

fn read_lock<'a, T>(lock: &'a RwLock<T>, what: &str) -> Result<RwLockReadGuard<'a, T>> {
    lock.read()
        .map_err(|e| StoreError::LockPoisoned(format!("{what}: {e}")))
}

fn write_lock<'a, T>(lock: &'a RwLock<T>, what: &str) -> Result<RwLockWriteGuard<'a, T>> {
    lock.write()
        .map_err(|e| StoreError::LockPoisoned(format!("{what}: {e}")))
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(ResourceTable::default()),
        }
    }

    /// Look up a resource slot, releasing the table lock before returning.
    fn slot(&self, uid: &ResourceUid) -> Result<Option<Arc<ResourceSlot>>> {
        let table = read_lock(&self.table, "resource table")?;
        Ok(table.slots.get(uid).cloned())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_resource(&self, resource: &Resource) -> Result<InsertResult> {
        let mut table = write_lock(&self.table, "resource table")?;

        if table.slots.contains_key(&resource.uid) {
            return Ok(InsertResult::AlreadyExists);
        }

        table.order.push(resource.uid);
        table.slots.insert(
            resource.uid,
            Arc::new(ResourceSlot {
                resource: resource.clone(),
                log: RwLock::new(EntryLog::default()),
            }),
        );

        Ok(InsertResult::Inserted)
    }

    async fn get_resource(&self, uid: &ResourceUid) -> Result<Option<Resource>> {
        Ok(self.slot(uid)?.map(|slot| slot.resource.clone()))
    }

    async fn has_resource(&self, uid: &ResourceUid) -> Result<bool> {
        Ok(self.slot(uid)?.is_some())
    }

    async fn list_resources(&self) -> Result<Vec<Resource>> {
        let table = read_lock(&self.table, "resource table")?;
        Ok(table
            .order
            .iter()
            .filter_map(|uid| table.slots.get(uid))
            .map(|slot| slot.resource.clone())
            .collect())
    }

    async fn append_entry(
        &self,
        resource_uid: &ResourceUid,
        draft: &EntryDraft,
    ) -> Result<AppendResult> {
        let Some(slot) = self.slot(resource_uid)? else {
            return Ok(AppendResult::ResourceNotFound);
        };
        let mut log = write_lock(&slot.log, "entry log")?;
        Ok(log.append(*resource_uid, draft))
    }

    async fn get_entry(
        &self,
        resource_uid: &ResourceUid,
        uid: &EntryUid,
    ) -> Result<Option<Entry>> {
        let Some(slot) = self.slot(resource_uid)? else {
            return Ok(None);
        };
        let log = read_lock(&slot.log, "entry log")?;
        Ok(log.positions.get(uid).map(|&pos| log.read_at(pos)))
    }

    async fn list_entries(&self, resource_uid: &ResourceUid) -> Result<Vec<Entry>> {
        let Some(slot) = self.slot(resource_uid)? else {
            return Ok(Vec::new());
        };
        let log = read_lock(&slot.log, "entry log")?;
        Ok((0..log.records.len()).map(|pos| log.read_at(pos)).collect())
    }

    async fn count_entries(&self, resource_uid: &ResourceUid) -> Result<u64> {
        let Some(slot) = self.slot(resource_uid)? else {
            return Ok(0);
        };
        let log = read_lock(&slot.log, "entry log")?;
        Ok(log.records.len() as u64)
    }

    async fn latest_by_identification(
        &self,
        resource_uid: &ResourceUid,
        identification: &str,
    ) -> Result<Option<Entry>> {
        let Some(slot) = self.slot(resource_uid)? else {
            return Ok(None);
        };
        let log = read_lock(&slot.log, "entry log")?;
        Ok(log.secrets.lookup(identification).map(|pos| log.read_at(pos)))
    }
}
