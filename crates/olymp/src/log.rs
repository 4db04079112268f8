//! The entry log handle: writes and reads against one resource's log.

use std::sync::Arc;

use olymp_core::{
    Bodies, Entry, EntryDraft, EntryUid, Provenance, Resource, Submission, DEFAULT_LANGUAGE,
};
use olymp_store::{AppendResult, Store};

use crate::error::{OlympError, Result};
use crate::notify::Dispatcher;

/// How many fresh uids an append tries before giving up.
pub(crate) const MAX_ID_ATTEMPTS: usize = 3;

/// Routing hints for the notification fired after an append.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Announce<'a> {
    /// Replaces the origin URL as routing context.
    pub(crate) context: Option<&'a str>,
    pub(crate) language: Option<&'a str>,
}

/// Handle on one resource's append-only entry log.
///
/// Obtained from [`Olymp::entries_of`](crate::Olymp::entries_of). Cheap to
/// clone; clones share the store.
pub struct EntryLog<S: Store + ?Sized> {
    store: Arc<S>,
    dispatcher: Option<Dispatcher>,
    resource: Resource,
}

impl<S: Store + ?Sized> Clone for EntryLog<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            dispatcher: self.dispatcher.clone(),
            resource: self.resource.clone(),
        }
    }
}

impl<S: Store + ?Sized> EntryLog<S> {
    pub(crate) fn new(store: Arc<S>, dispatcher: Option<Dispatcher>, resource: Resource) -> Self {
        Self {
            store,
            dispatcher,
            resource,
        }
    }

    /// The resource owning this log.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Write Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a new active entry.
    ///
    /// Fails with `PayloadTooLarge` when the serialized submission exceeds
    /// the ceiling. On success the notifier, if any, is fired with the
    /// origin URL as context.
    pub async fn append(&self, submission: Submission, provenance: Provenance) -> Result<Entry> {
        let size = submission.check_size()?;
        self.append_measured(submission, provenance, size, Announce::default())
            .await
    }

    /// Append a submission whose caller-supplied part measured `size` bytes
    /// and already passed the ceiling.
    pub(crate) async fn append_measured(
        &self,
        submission: Submission,
        provenance: Provenance,
        size: usize,
        announce: Announce<'_>,
    ) -> Result<Entry> {
        let draft = EntryDraft::submission(
            submission.identification,
            Bodies::new(submission.public_body, submission.private_body),
            provenance,
        );

        let entry = self.commit(draft).await?;
        tracing::debug!(
            resource = %self.resource.uid,
            entry = %entry.uid,
            seq = entry.seq,
            size,
            "appended entry"
        );

        if let Some(dispatcher) = &self.dispatcher {
            // Detached: delivery runs after this call returns.
            let _ = dispatcher.dispatch(
                &entry,
                announce.context.unwrap_or(entry.origin_url.as_str()),
                announce.language.unwrap_or(DEFAULT_LANGUAGE),
            );
        }
        Ok(entry)
    }

    /// Append a new version of `target`.
    ///
    /// The new entry inherits the target's identification; the target reads
    /// as superseded from now on, its bodies untouched.
    pub async fn update(
        &self,
        target: &EntryUid,
        bodies: Bodies,
        provenance: Provenance,
    ) -> Result<Entry> {
        bodies.check_size()?;
        let entry = self
            .commit(EntryDraft::revision(*target, bodies, provenance))
            .await?;
        tracing::debug!(resource = %self.resource.uid, target = %target, entry = %entry.uid, "revised entry");
        Ok(entry)
    }

    /// Append a deletion record for `target`, with empty bodies.
    ///
    /// The target reads as deleted from now on, its bodies untouched.
    pub async fn mark_deleted(&self, target: &EntryUid, provenance: Provenance) -> Result<Entry> {
        let entry = self
            .commit(EntryDraft::deletion(*target, provenance))
            .await?;
        tracing::debug!(resource = %self.resource.uid, target = %target, entry = %entry.uid, "deleted entry");
        Ok(entry)
    }

    async fn commit(&self, mut draft: EntryDraft) -> Result<Entry> {
        for _ in 0..MAX_ID_ATTEMPTS {
            match self.store.append_entry(&self.resource.uid, &draft).await? {
                AppendResult::Appended(entry) => return Ok(entry),
                AppendResult::DuplicateUid => {
                    tracing::warn!(resource = %self.resource.uid, entry = %draft.uid, "entry uid collision, retrying");
                    draft = draft.with_uid(EntryUid::generate());
                }
                AppendResult::ResourceNotFound => {
                    return Err(OlympError::NotFound(format!(
                        "resource {}",
                        self.resource.uid
                    )))
                }
                AppendResult::TargetNotFound(target) => {
                    return Err(OlympError::InvalidState(format!(
                        "entry {target} does not exist"
                    )))
                }
                AppendResult::TargetNotActive { target, status } => {
                    return Err(OlympError::InvalidState(format!(
                        "entry {target} is {status}"
                    )))
                }
            }
        }
        Err(OlympError::IdCollision(MAX_ID_ATTEMPTS))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// All entries in creation order.
    pub async fn list(&self) -> Result<Vec<Entry>> {
        Ok(self.store.list_entries(&self.resource.uid).await?)
    }

    /// Point lookup.
    pub async fn get(&self, uid: &EntryUid) -> Result<Entry> {
        self.store
            .get_entry(&self.resource.uid, uid)
            .await?
            .ok_or_else(|| OlympError::NotFound(format!("entry {uid}")))
    }

    /// Number of records in the log. Never decreases.
    pub async fn len(&self) -> Result<u64> {
        Ok(self.store.count_entries(&self.resource.uid).await?)
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}
