//! # Olymp Core
//!
//! Pure primitives for the Olymp entry store: identifiers, resources,
//! entries, the payload ceiling and the visibility filter.
//!
//! This crate contains no I/O and no storage. It is pure computation over
//! the data model shared by the store backends and the facade.
//!
//! ## Key Types
//!
//! - [`ResourceUid`] / [`EntryUid`] - Random 256-bit identifiers, hex on the wire
//! - [`Resource`] - A bucket of entries with public and private bodies
//! - [`Entry`] - One record in a resource's append-only log
//! - [`EntryDraft`] - A record waiting to be appended
//! - [`EntryStatus`] - `active`, `superseded` or `deleted`
//!
//! ## Visibility
//!
//! Every read goes through [`project`], which blanks private fields for
//! unauthenticated callers. See the [`visibility`] module.

pub mod entry;
pub mod error;
pub mod form;
pub mod payload;
pub mod resource;
pub mod secret;
pub mod types;
pub mod visibility;

pub use entry::{DraftKind, Entry, EntryDraft, EntryStatus};
pub use error::{CoreError, Result};
pub use form::{private_message, FormSubmission, DEFAULT_LANGUAGE};
pub use payload::{
    check_size, empty_body, ensure_within_limit, Bodies, Provenance, Submission,
    MAX_PAYLOAD_BYTES,
};
pub use resource::Resource;
pub use secret::{resolve_latest, SecretIndex};
pub use types::{new_id, now_millis, EntryUid, ResourceUid};
pub use visibility::{project, project_all, EntryView, ResourceView, Visible};
