//! Entry: one submitted record inside a resource's append-only log.
//!
//! Entries are never edited. An update appends a revision that supersedes
//! its target; a deletion appends a record with status `deleted` that
//! supersedes its target. The stored status is either `active` or `deleted`;
//! a target's status is derived from its successor when it is read: a
//! revision makes it `superseded`, a deletion record makes it `deleted`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::CoreError;
use crate::payload::{Bodies, Provenance};
use crate::types::{now_millis, EntryUid, ResourceUid};

/// Lifecycle status of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Current version for its identification.
    Active,
    /// Replaced by a later revision.
    Superseded,
    /// A deletion record, or the record it deleted. Terminal.
    Deleted,
}

impl EntryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Superseded => "superseded",
            Self::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "active" => Ok(Self::Active),
            "superseded" => Ok(Self::Superseded),
            "deleted" => Ok(Self::Deleted),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }

    /// Resolve the effective status of a stored record from the stored
    /// status of its successor, if one names it in `supersedes`.
    ///
    /// A stored `active` record reads as `superseded` after a revision and
    /// as `deleted` after a deletion record. A `deleted` record stays
    /// `deleted`.
    pub fn effective(stored: Self, successor: Option<Self>) -> Self {
        match (stored, successor) {
            (Self::Active, Some(Self::Deleted)) => Self::Deleted,
            (Self::Active, Some(_)) => Self::Superseded,
            (status, _) => status,
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry as read from the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub resource_uid: ResourceUid,
    pub uid: EntryUid,
    /// 1-based position in the resource's log.
    pub seq: u64,
    /// Creation time (Unix ms).
    pub created_at: i64,
    pub identification: String,
    pub public_body: Value,
    pub private_body: Value,
    pub origin_url: String,
    pub user_agent: String,
    pub status: EntryStatus,
    /// The entry this record replaced, for revisions and deletions.
    pub supersedes: Option<EntryUid>,
}

impl Entry {
    pub fn is_active(&self) -> bool {
        self.status == EntryStatus::Active
    }
}

/// What kind of record a draft appends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftKind {
    /// A fresh submission.
    Submission,
    /// A new version of `target` with new bodies.
    Revision { target: EntryUid },
    /// A deletion record for `target`.
    Deletion { target: EntryUid },
}

/// A record ready to be appended to a log.
///
/// The store assigns `seq`. For revisions and deletions it also copies the
/// identification from the target, so a draft never has to read the target
/// first.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub uid: EntryUid,
    pub created_at: i64,
    pub identification: String,
    pub bodies: Bodies,
    pub provenance: Provenance,
    pub kind: DraftKind,
}

impl EntryDraft {
    /// A fresh submission.
    pub fn submission(
        identification: impl Into<String>,
        bodies: Bodies,
        provenance: Provenance,
    ) -> Self {
        Self {
            uid: EntryUid::generate(),
            created_at: now_millis(),
            identification: identification.into(),
            bodies,
            provenance,
            kind: DraftKind::Submission,
        }
    }

    /// A new version of `target`.
    pub fn revision(target: EntryUid, bodies: Bodies, provenance: Provenance) -> Self {
        Self {
            uid: EntryUid::generate(),
            created_at: now_millis(),
            identification: String::new(),
            bodies,
            provenance,
            kind: DraftKind::Revision { target },
        }
    }

    /// A deletion record for `target`, with empty bodies.
    pub fn deletion(target: EntryUid, provenance: Provenance) -> Self {
        Self {
            uid: EntryUid::generate(),
            created_at: now_millis(),
            identification: String::new(),
            bodies: Bodies::empty(),
            provenance,
            kind: DraftKind::Deletion { target },
        }
    }

    /// Replace the uid after a collision.
    pub fn with_uid(mut self, uid: EntryUid) -> Self {
        self.uid = uid;
        self
    }

    /// The entry this draft supersedes, if any.
    pub fn target(&self) -> Option<EntryUid> {
        match self.kind {
            DraftKind::Submission => None,
            DraftKind::Revision { target } | DraftKind::Deletion { target } => Some(target),
        }
    }

    /// The status written to storage for this draft.
    pub fn stored_status(&self) -> EntryStatus {
        match self.kind {
            DraftKind::Deletion { .. } => EntryStatus::Deleted,
            _ => EntryStatus::Active,
        }
    }

    /// Materialize the stored entry once the store has fixed its position.
    pub fn into_entry(self, resource_uid: ResourceUid, seq: u64, identification: String) -> Entry {
        let status = self.stored_status();
        let supersedes = self.target();
        Entry {
            resource_uid,
            uid: self.uid,
            seq,
            created_at: self.created_at,
            identification,
            public_body: self.bodies.public_body,
            private_body: self.bodies.private_body,
            origin_url: self.provenance.origin_url,
            user_agent: self.provenance.user_agent,
            status,
            supersedes,
        }
    }
}
