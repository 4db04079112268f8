//! Notification hook fired after every successful append.
//!
//! Delivery is best-effort: the hook runs on its own task after the entry is
//! stored, its failures are logged and never retried, and it can neither
//! block nor undo the write.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use olymp_core::{private_message, Entry, ResourceUid};

use crate::config::{NotifyConfig, Recipient};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("rejected by recipient: {0}")]
    Rejected(String),
}

/// Everything a delivery channel needs to report one new entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub resource_uid: ResourceUid,
    pub entry: Entry,
    /// The submission's private `message`, or the configured empty-message text.
    pub message: String,
    /// Where the submission came from: the form's redirect target or the origin URL.
    pub context: String,
    /// Language the submitter used, for picking a mail template.
    pub language: String,
    pub recipient: Recipient,
}

impl Notification {
    /// Build the notification for `entry`, routing by `context`.
    pub fn build(config: &NotifyConfig, entry: &Entry, context: &str, language: &str) -> Self {
        let message = private_message(&entry.private_body)
            .map_or_else(|| config.empty_message.clone(), |m| format!("'{m}'"));

        Self {
            resource_uid: entry.resource_uid,
            entry: entry.clone(),
            message,
            context: context.to_string(),
            language: language.to_string(),
            recipient: config.route(context).clone(),
        }
    }
}

/// A delivery channel (mail, chat webhook, ...).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, n: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            resource = %n.resource_uid,
            entry = %n.entry.uid,
            recipient = %n.recipient.email,
            context = %n.context,
            language = %n.language,
            "new entry"
        );
        Ok(())
    }
}

/// Pairs a notifier with its routing config and fires it off-task.
#[derive(Clone)]
pub(crate) struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    config: Arc<NotifyConfig>,
}

impl Dispatcher {
    pub(crate) fn new(notifier: Arc<dyn Notifier>, config: NotifyConfig) -> Self {
        Self {
            notifier,
            config: Arc::new(config),
        }
    }

    /// Spawn delivery for `entry`. Returns immediately.
    pub(crate) fn dispatch(
        &self,
        entry: &Entry,
        context: &str,
        language: &str,
    ) -> tokio::task::JoinHandle<()> {
        let notification = Notification::build(&self.config, entry, context, language);
        let notifier = Arc::clone(&self.notifier);

        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&notification).await {
                tracing::warn!(
                    resource = %notification.resource_uid,
                    entry = %notification.entry.uid,
                    error = %e,
                    "notification failed"
                );
            }
        })
    }
}
