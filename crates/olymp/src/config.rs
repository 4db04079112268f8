//! Service configuration, read once from a JSON file and injected into the
//! credential checker, the notifier and the store opener.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use olymp_store::{MemoryStore, SqliteStore, Store};

/// Text used in notifications when a submission carries no message.
pub const DEFAULT_EMPTY_MESSAGE: &str = "Nachricht war leer.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OlympConfig {
    pub auth: AuthConfig,
    pub store: StoreConfig,
    pub notify: NotifyConfig,
}

impl OlympConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_slice(&bytes)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), backend = ?config.store.backend, "loaded config");
        Ok(config)
    }

    /// Parse and validate config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend == Backend::Sqlite && self.store.path.is_none() {
            return Err(ConfigError::Invalid(
                "store.path is required for the sqlite backend".into(),
            ));
        }
        if let Some(rule) = self.notify.recipients.iter().find(|r| r.pattern.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "recipient rule for {} has an empty pattern",
                rule.recipient.email
            )));
        }
        Ok(())
    }
}

/// The single shared credential.
///
/// An empty password disables authentication entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: Backend,
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// Open the configured backend.
    pub fn open(&self) -> crate::Result<Arc<dyn Store>> {
        match (self.backend, &self.path) {
            (Backend::Memory, _) => Ok(Arc::new(MemoryStore::new())),
            (Backend::Sqlite, Some(path)) => Ok(Arc::new(SqliteStore::open(path)?)),
            (Backend::Sqlite, None) => Err(ConfigError::Invalid(
                "store.path is required for the sqlite backend".into(),
            )
            .into()),
        }
    }
}

/// A notification target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recipient {
    pub email: String,
    pub name: String,
    /// Mail template to render with.
    pub template: String,
}

/// Route notifications whose context contains `pattern` to `recipient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientRule {
    pub pattern: String,
    pub recipient: Recipient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotifyConfig {
    pub empty_message: String,
    pub default_recipient: Recipient,
    /// Checked in order; the first matching rule wins.
    pub recipients: Vec<RecipientRule>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
            default_recipient: Recipient::default(),
            recipients: Vec::new(),
        }
    }
}

impl NotifyConfig {
    /// Pick the recipient for a notification context.
    pub fn route(&self, context: &str) -> &Recipient {
        self.recipients
            .iter()
            .find(|rule| context.contains(&rule.pattern))
            .map(|rule| &rule.recipient)
            .unwrap_or(&self.default_recipient)
    }
}
