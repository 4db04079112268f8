//! # Olymp Store
//!
//! Storage abstraction for the Olymp entry store. Resources and their entry
//! logs live behind the [`Store`] trait, with SQLite and in-memory
//! implementations.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests and ephemeral use
//! - [`InsertResult`] - Result of inserting a resource
//! - [`AppendResult`] - Result of appending to an entry log
//!
//! ## Usage
//!
//! ```rust,no_run
//! use olymp_core::{Bodies, Provenance, Resource};
//! use olymp_store::{InsertResult, SqliteStore, Store};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("olymp.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     let resource = Resource::new(Bodies::empty(), Provenance::default());
//!     let result = store.insert_resource(&resource).await.unwrap();
//!     assert_eq!(result, InsertResult::Inserted);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Insert-only**: revisions and deletions are new records; nothing is rewritten
//! - **Derived status**: an entry reads as superseded or deleted once a later record names it
//! - **Atomic appends**: target checks and the write happen under one lock or transaction

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{AppendResult, InsertResult, Store};
