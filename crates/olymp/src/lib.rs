//! # Olymp
//!
//! An append-only, versioned entry store for form and registration
//! submissions, with a public and a private visibility tier.
//!
//! ## Key Concepts
//!
//! - **Resource**: A bucket of entries. Created once, never removed.
//! - **Entry**: One submission in a resource's log. Never edited.
//! - **Revision**: `update` appends a new version; the old one reads as superseded.
//! - **Deletion record**: `mark_deleted` appends a terminal record with empty bodies.
//! - **Secret**: A caller-held identification token; the latest match wins.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use olymp::{Olymp, Provenance, Submission};
//! use olymp::core::{project, Bodies};
//! use olymp::store::SqliteStore;
//! use serde_json::json;
//!
//! async fn example() {
//!     // Open storage
//!     let store = SqliteStore::open("olymp.db").unwrap();
//!     let olymp = Olymp::new(store);
//!
//!     // Create a resource
//!     let resource = olymp
//!         .create_resource(Bodies::new(json!({"name": "Con"}), json!({})), Provenance::default())
//!         .await
//!         .unwrap();
//!
//!     // Append to its log
//!     let log = olymp.entries_of(&resource.uid).await.unwrap();
//!     let entry = log
//!         .append(Submission::new("sec1", json!({"q": 1}), json!({"a": 2})), Provenance::default())
//!         .await
//!         .unwrap();
//!
//!     // Read it back the way an anonymous caller sees it
//!     let view = project(&log.get(&entry.uid).await.unwrap(), false);
//!     assert_eq!(view.private_body, json!({}));
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `olymp::core` - Data model, payload ceiling, visibility filter
//! - `olymp::store` - Storage abstraction, in-memory and SQLite backends

pub mod auth;
pub mod config;
pub mod error;
pub mod log;
pub mod notify;
pub mod registry;
pub mod telemetry;

// Re-export component crates
pub use olymp_core as core;
pub use olymp_store as store;

// Re-export main types for convenience
pub use auth::CredentialChecker;
pub use config::{ConfigError, OlympConfig};
pub use error::{OlympError, Result};
pub use log::EntryLog;
pub use notify::{Notification, Notifier, NotifyError, TracingNotifier};
pub use registry::{FormOutcome, Olymp, Registration};

// Re-export commonly used core types
pub use olymp_core::{
    project, project_all, Entry, EntryStatus, EntryUid, EntryView, FormSubmission, Provenance,
    Resource, ResourceUid, ResourceView, Submission,
};

/// Crate version, reported by status endpoints.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
