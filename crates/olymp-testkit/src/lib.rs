//! # Olymp Testkit
//!
//! Testing utilities for the Olymp entry store.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **View vectors**: Fixed records with the exact JSON each caller sees
//! - **Generators**: Proptest strategies for bodies, secrets and log steps
//! - **Fixtures**: An in-memory Olymp with a recording notifier
//!
//! ## View Vectors
//!
//! ```rust
//! use olymp_testkit::vectors::verify_all_vectors;
//!
//! assert!(verify_all_vectors().is_empty());
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use olymp_testkit::generators::log_ops;
//!
//! proptest! {
//!     #[test]
//!     fn log_never_shrinks(ops in log_ops(32)) {
//!         // replay `ops` against a log and check its length after each step
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use olymp_testkit::fixtures::{provenance, submission, TestFixture};
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     let resource = fixture.create_resource().await;
//!     let log = fixture.log(&resource).await;
//!     log.append(submission("sec1", 1), provenance()).await.unwrap();
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{FailingNotifier, RecordingNotifier, TestFixture};
pub use generators::{log_ops, LogOp};
pub use vectors::{all_vectors, verify_all_vectors, verify_vector, ViewVector};
