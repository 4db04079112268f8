//! Store trait: the abstract interface for resource and entry persistence.
//!
//! This trait keeps the facade storage-agnostic. Implementations include
//! SQLite (durable) and in-memory (tests and ephemeral deployments).

use async_trait::async_trait;
use olymp_core::{Entry, EntryDraft, EntryStatus, EntryUid, Resource, ResourceUid};

use crate::error::Result;

/// Result of inserting a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// Resource was inserted.
    Inserted,
    /// A resource with this uid already exists. Nothing was written.
    AlreadyExists,
}

/// Result of appending an entry to a resource's log.
///
/// Every variant except `Appended` means nothing was written.
#[derive(Debug, Clone, PartialEq)]
pub enum AppendResult {
    /// The entry was appended at the returned position.
    Appended(Entry),
    /// The draft's uid is already used in this resource.
    DuplicateUid,
    /// The resource does not exist.
    ResourceNotFound,
    /// The draft supersedes an entry that does not exist.
    TargetNotFound(EntryUid),
    /// The draft supersedes an entry that is no longer active.
    TargetNotActive {
        target: EntryUid,
        status: EntryStatus,
    },
}

/// The Store trait: async interface for resource and entry persistence.
///
/// # Design Notes
///
/// - **Insert-only**: no stored resource or entry is ever rewritten or removed.
///   A target's `superseded` or `deleted` status is derived on read from
///   the record that names it.
/// - **Atomic appends**: `append_entry` checks its target and writes in one
///   step. Two drafts can never supersede the same entry.
/// - **Per-resource ordering**: entries come back in log order, `seq` 1, 2, ...
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Resource Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a new resource with an empty log.
    async fn insert_resource(&self, resource: &Resource) -> Result<InsertResult>;

    /// Get a resource by uid.
    async fn get_resource(&self, uid: &ResourceUid) -> Result<Option<Resource>>;

    /// Check whether a resource exists.
    async fn has_resource(&self, uid: &ResourceUid) -> Result<bool>;

    /// All resources in creation order.
    async fn list_resources(&self) -> Result<Vec<Resource>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Entry Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a draft to a resource's log.
    ///
    /// For revisions and deletions the target must exist and be active at
    /// the moment of the append, and the new entry takes the target's
    /// identification.
    async fn append_entry(
        &self,
        resource_uid: &ResourceUid,
        draft: &EntryDraft,
    ) -> Result<AppendResult>;

    /// Get an entry by uid, with its effective status.
    async fn get_entry(&self, resource_uid: &ResourceUid, uid: &EntryUid)
        -> Result<Option<Entry>>;

    /// All entries of a resource in log order. Empty for unknown resources.
    async fn list_entries(&self, resource_uid: &ResourceUid) -> Result<Vec<Entry>>;

    /// Number of entries in a resource's log.
    async fn count_entries(&self, resource_uid: &ResourceUid) -> Result<u64>;

    /// The entry with the greatest position whose identification equals
    /// `identification`. `None` for an empty identification.
    async fn latest_by_identification(
        &self,
        resource_uid: &ResourceUid,
        identification: &str,
    ) -> Result<Option<Entry>>;
}
