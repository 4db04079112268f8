//! Olymp: the resource registry and the entry point for every operation.
//!
//! The registry owns the store. Each resource's log is reached through an
//! [`EntryLog`] handle; secret lookups, form submissions and registrations
//! are built on top of it.

use std::sync::Arc;

use olymp_core::{
    new_id, Bodies, Entry, FormSubmission, Provenance, Resource, ResourceUid, Submission,
};
use serde_json::Value;
use olymp_store::{InsertResult, Store};

use crate::config::{NotifyConfig, OlympConfig};
use crate::error::{OlympError, Result};
use crate::log::{Announce, EntryLog, MAX_ID_ATTEMPTS};
use crate::notify::{Dispatcher, Notifier};

/// Outcome of a form submission.
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    /// A honeypot field was filled in. Nothing was written.
    Spam,
    /// The entry was appended.
    Accepted(Entry),
}

/// Public-body field naming the language of the registration UI.
const INTERFACE_LANGUAGE: &str = "interfaceLanguage";

/// A stored registration and the secret that finds it again.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub entry: Entry,
    pub secret: String,
}

/// The main Olymp struct.
///
/// Provides:
/// - Creating, listing and reading resources
/// - Entry log handles for appends, revisions and deletions
/// - Secret lookups
/// - Form submissions and registrations
pub struct Olymp<S: Store + ?Sized> {
    store: Arc<S>,
    dispatcher: Option<Dispatcher>,
}

impl<S: Store> Olymp<S> {
    /// Create an instance over `store` with no notifier.
    pub fn new(store: S) -> Self {
        Self::from_arc(Arc::new(store))
    }
}

impl Olymp<dyn Store> {
    /// Open the configured backend and wire in `notifier` with the
    /// configured routing.
    pub fn from_config(config: &OlympConfig, notifier: Option<Arc<dyn Notifier>>) -> Result<Self> {
        config.validate()?;
        let olymp = Self::from_arc(config.store.open()?);
        Ok(match notifier {
            Some(notifier) => olymp.with_notifier(notifier, config.notify.clone()),
            None => olymp,
        })
    }
}

impl<S: Store + ?Sized> Olymp<S> {
    pub fn from_arc(store: Arc<S>) -> Self {
        Self {
            store,
            dispatcher: None,
        }
    }

    /// Fire `notifier` after every successful append.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>, config: NotifyConfig) -> Self {
        self.dispatcher = Some(Dispatcher::new(notifier, config));
        self
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resource Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a resource with an empty log.
    pub async fn create_resource(&self, bodies: Bodies, provenance: Provenance) -> Result<Resource> {
        bodies.check_size()?;
        let mut resource = Resource::new(bodies, provenance);

        for _ in 0..MAX_ID_ATTEMPTS {
            match self.store.insert_resource(&resource).await? {
                InsertResult::Inserted => {
                    tracing::debug!(resource = %resource.uid, "created resource");
                    return Ok(resource);
                }
                InsertResult::AlreadyExists => {
                    tracing::warn!(resource = %resource.uid, "resource uid collision, retrying");
                    resource = resource.with_uid(ResourceUid::generate());
                }
            }
        }
        Err(OlympError::IdCollision(MAX_ID_ATTEMPTS))
    }

    /// All resources in creation order.
    pub async fn list_resources(&self) -> Result<Vec<Resource>> {
        Ok(self.store.list_resources().await?)
    }

    pub async fn get_resource(&self, uid: &ResourceUid) -> Result<Resource> {
        self.store
            .get_resource(uid)
            .await?
            .ok_or_else(|| OlympError::NotFound(format!("resource {uid}")))
    }

    /// Handle on a resource's entry log.
    pub async fn entries_of(&self, uid: &ResourceUid) -> Result<EntryLog<S>> {
        let resource = self.get_resource(uid).await?;
        Ok(EntryLog::new(
            Arc::clone(&self.store),
            self.dispatcher.clone(),
            resource,
        ))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Secret Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// The latest entry whose identification equals `secret`.
    ///
    /// A deletion record counts: if the latest match is one, it is returned.
    /// Any failure is `Unauthorized`, including an unknown resource or an
    /// empty secret. The result is not projected; callers apply their own
    /// visibility.
    pub async fn resolve_by_secret(&self, resource_uid: &ResourceUid, secret: &str) -> Result<Entry> {
        if secret.is_empty() || !self.store.has_resource(resource_uid).await? {
            return Err(OlympError::Unauthorized);
        }

        let found = self
            .store
            .latest_by_identification(resource_uid, secret)
            .await?;
        if found.is_none() {
            tracing::debug!(resource = %resource_uid, "secret lookup found nothing");
        }
        found.ok_or(OlympError::Unauthorized)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submissions
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a parsed form submission.
    ///
    /// Spam appends nothing. The notification context is the form's redirect
    /// target when it has one, and its language is the form's.
    pub async fn submit_form(
        &self,
        resource_uid: &ResourceUid,
        form: FormSubmission,
        provenance: Provenance,
    ) -> Result<FormOutcome> {
        if form.spam {
            tracing::info!(resource = %resource_uid, "dropped spam submission");
            return Ok(FormOutcome::Spam);
        }

        let log = self.entries_of(resource_uid).await?;
        let redirect = form.redirect.clone();
        let language = form.language.clone();
        let submission = form.into_submission();
        let size = submission.check_size()?;
        let announce = Announce {
            context: redirect.as_deref(),
            language: Some(language.as_str()),
        };
        let entry = log
            .append_measured(submission, provenance, size, announce)
            .await?;
        Ok(FormOutcome::Accepted(entry))
    }

    /// Append a registration, generating a secret when none is supplied.
    ///
    /// The ceiling applies to the submission as sent; a generated secret
    /// does not count toward it. The notification language is the public
    /// body's `interfaceLanguage`, when set.
    pub async fn register(
        &self,
        resource_uid: &ResourceUid,
        mut submission: Submission,
        provenance: Provenance,
    ) -> Result<Registration> {
        let size = submission.check_size()?;
        if submission.identification.is_empty() {
            submission.identification = new_id();
        }
        let secret = submission.identification.clone();
        let language = submission
            .public_body
            .get(INTERFACE_LANGUAGE)
            .and_then(Value::as_str)
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        let log = self.entries_of(resource_uid).await?;
        let announce = Announce {
            context: None,
            language: language.as_deref(),
        };
        let entry = log
            .append_measured(submission, provenance, size, announce)
            .await?;
        Ok(Registration { entry, secret })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use olymp_core::{EntryStatus, MAX_PAYLOAD_BYTES};
    use olymp_store::MemoryStore;
    use serde_json::json;

    fn olymp() -> Olymp<MemoryStore> {
        Olymp::new(MemoryStore::new())
    }

    fn origin() -> Provenance {
        Provenance::new("https://rollenspieltage.ch/anmeldung", "Mozilla/5.0")
    }

    #[tokio::test]
    async fn test_create_and_get_resource() {
        let olymp = olymp();
        let resource = olymp
            .create_resource(Bodies::new(json!({"name": "Con"}), json!({})), origin())
            .await
            .unwrap();

        assert_eq!(olymp.get_resource(&resource.uid).await.unwrap(), resource);
        assert_eq!(olymp.list_resources().await.unwrap(), vec![resource]);
    }

    #[tokio::test]
    async fn test_unknown_resource_is_not_found() {
        let olymp = olymp();
        let uid = ResourceUid::generate();
        assert!(matches!(
            olymp.get_resource(&uid).await,
            Err(OlympError::NotFound(_))
        ));
        assert!(matches!(
            olymp.entries_of(&uid).await,
            Err(OlympError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_oversize_resource_is_rejected() {
        let olymp = olymp();
        let bodies = Bodies::new(json!({ "pad": "x".repeat(MAX_PAYLOAD_BYTES) }), json!({}));
        assert!(matches!(
            olymp.create_resource(bodies, origin()).await,
            Err(OlympError::PayloadTooLarge { .. })
        ));
        assert!(olymp.list_resources().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_secret_is_unauthorized() {
        let olymp = olymp();
        let resource = olymp.create_resource(Bodies::empty(), origin()).await.unwrap();
        let log = olymp.entries_of(&resource.uid).await.unwrap();
        log.append(Submission::new("", json!({}), json!({})), origin())
            .await
            .unwrap();

        assert!(matches!(
            olymp.resolve_by_secret(&resource.uid, "").await,
            Err(OlympError::Unauthorized)
        ));
        assert!(matches!(
            olymp
                .resolve_by_secret(&ResourceUid::generate(), "sec1")
                .await,
            Err(OlympError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_secret_resolves_to_deletion_record() {
        let olymp = olymp();
        let resource = olymp.create_resource(Bodies::empty(), origin()).await.unwrap();
        let log = olymp.entries_of(&resource.uid).await.unwrap();

        let entry = log
            .append(Submission::new("sec1", json!({"a": 1}), json!({})), origin())
            .await
            .unwrap();
        let tombstone = log.mark_deleted(&entry.uid, origin()).await.unwrap();

        let found = olymp.resolve_by_secret(&resource.uid, "sec1").await.unwrap();
        assert_eq!(found.uid, tombstone.uid);
        assert_eq!(found.status, EntryStatus::Deleted);
    }

    #[tokio::test]
    async fn test_spam_form_appends_nothing() {
        let olymp = olymp();
        let resource = olymp.create_resource(Bodies::empty(), origin()).await.unwrap();

        let form = FormSubmission::parse([("public-name", "Bot"), ("captcha", "gotcha")]);
        let outcome = olymp
            .submit_form(&resource.uid, form, origin())
            .await
            .unwrap();

        assert_eq!(outcome, FormOutcome::Spam);
        let log = olymp.entries_of(&resource.uid).await.unwrap();
        assert!(log.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_form_fields_land_in_bodies() {
        let olymp = olymp();
        let resource = olymp.create_resource(Bodies::empty(), origin()).await.unwrap();

        let form = FormSubmission::parse([
            ("public-name", "Ada"),
            ("private-email", "ada@example.ch"),
            ("captcha", ""),
        ]);
        let FormOutcome::Accepted(entry) = olymp
            .submit_form(&resource.uid, form, origin())
            .await
            .unwrap()
        else {
            panic!("expected an accepted submission");
        };

        assert_eq!(entry.public_body, json!({"name": "Ada"}));
        assert_eq!(entry.private_body, json!({"email": "ada@example.ch"}));
        assert_eq!(entry.status, EntryStatus::Active);
    }

    #[tokio::test]
    async fn test_register_generates_secret() {
        let olymp = olymp();
        let resource = olymp.create_resource(Bodies::empty(), origin()).await.unwrap();

        let generated = olymp
            .register(
                &resource.uid,
                Submission::new("", json!({"intro": {"name": "Ada"}}), json!({})),
                origin(),
            )
            .await
            .unwrap();
        assert_eq!(generated.secret.len(), 64);
        assert_eq!(generated.entry.identification, generated.secret);

        let supplied = olymp
            .register(
                &resource.uid,
                Submission::new("my-secret", json!({}), json!({})),
                origin(),
            )
            .await
            .unwrap();
        assert_eq!(supplied.secret, "my-secret");

        let found = olymp
            .resolve_by_secret(&resource.uid, &generated.secret)
            .await
            .unwrap();
        assert_eq!(found.uid, generated.entry.uid);
    }

    /// A submission padded so its serialized form is exactly `len` bytes.
    fn padded_submission(len: usize) -> Submission {
        let base = Submission::new("", json!({ "pad": "" }), json!({}));
        let base_len = serde_json::to_vec(&base).unwrap().len();
        Submission::new("", json!({ "pad": "x".repeat(len - base_len) }), json!({}))
    }

    #[tokio::test]
    async fn test_generated_secret_does_not_count_toward_ceiling() {
        let olymp = olymp();
        let resource = olymp.create_resource(Bodies::empty(), origin()).await.unwrap();

        let at_limit = padded_submission(MAX_PAYLOAD_BYTES);
        assert_eq!(serde_json::to_vec(&at_limit).unwrap().len(), MAX_PAYLOAD_BYTES);
        let registration = olymp
            .register(&resource.uid, at_limit, origin())
            .await
            .unwrap();
        assert_eq!(registration.entry.identification, registration.secret);

        assert!(matches!(
            olymp
                .register(&resource.uid, padded_submission(MAX_PAYLOAD_BYTES + 1), origin())
                .await,
            Err(OlympError::PayloadTooLarge { size, .. }) if size == MAX_PAYLOAD_BYTES + 1
        ));
        let log = olymp.entries_of(&resource.uid).await.unwrap();
        assert_eq!(log.len().await.unwrap(), 1);
    }
}
