//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use olymp::config::NotifyConfig;
use olymp::{EntryLog, Notification, Notifier, NotifyError, Olymp};
use olymp_core::{Bodies, Provenance, Resource, Submission};
use olymp_store::{MemoryStore, SqliteStore};

/// Collects every notification it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().await.clone()
    }

    /// Wait until at least `count` notifications arrived or `timeout` passed.
    ///
    /// Delivery runs on spawned tasks, so tests poll for it.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Notification> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let seen = self.notifications().await;
            if seen.len() >= count || tokio::time::Instant::now() >= deadline {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.seen.lock().await.push(notification.clone());
        Ok(())
    }
}

/// Fails every delivery.
#[derive(Debug, Default)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _: &Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("mail relay unreachable".into()))
    }
}

/// A test fixture with an in-memory Olymp and a recording notifier.
pub struct TestFixture {
    pub olymp: Olymp<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_notify_config(NotifyConfig::default())
    }

    pub fn with_notify_config(config: NotifyConfig) -> Self {
        let notifier = Arc::new(RecordingNotifier::new());
        let olymp = Olymp::new(MemoryStore::new()).with_notifier(notifier.clone(), config);
        Self { olymp, notifier }
    }

    /// Create a resource shaped like a convention sign-up form.
    pub async fn create_resource(&self) -> Resource {
        self.olymp
            .create_resource(
                Bodies::new(json!({"name": "Con"}), json!({"email": "a@b.ch"})),
                provenance(),
            )
            .await
            .expect("create resource")
    }

    pub async fn log(&self, resource: &Resource) -> EntryLog<MemoryStore> {
        self.olymp
            .entries_of(&resource.uid)
            .await
            .expect("entry log")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// An Olymp over a SQLite file inside `dir`.
pub fn sqlite_olymp(dir: &Path) -> Olymp<SqliteStore> {
    let store = SqliteStore::open(dir.join("olymp.db")).expect("open sqlite store");
    Olymp::new(store)
}

/// Provenance of a typical browser submission.
pub fn provenance() -> Provenance {
    Provenance::new(
        "https://rollenspieltage.ch/anmeldung",
        "Mozilla/5.0 (X11; Linux x86_64)",
    )
}

/// A small submission tagged with `n`.
pub fn submission(identification: &str, n: i64) -> Submission {
    Submission::new(
        identification,
        json!({ "q": n }),
        json!({ "ans": format!("answer {n}") }),
    )
}
