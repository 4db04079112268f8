//! End-to-end behavior of the registry, entry logs and secret lookup,
//! run against both backends.

use olymp::core::{project, project_all, Bodies, MAX_PAYLOAD_BYTES};
use olymp::store::{MemoryStore, SqliteStore, Store};
use olymp::{EntryStatus, EntryUid, Olymp, OlympError, ResourceUid, Submission};
use olymp_testkit::fixtures::{provenance, sqlite_olymp, submission};
use serde_json::json;

async fn resource_listing_is_redacted<S: Store + ?Sized>(olymp: &Olymp<S>) {
    let resource = olymp
        .create_resource(
            Bodies::new(json!({"name": "Con"}), json!({"email": "a@b.ch"})),
            provenance(),
        )
        .await
        .unwrap();

    let listed = olymp.list_resources().await.unwrap();
    let views = project_all(&listed, false);
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].resource_uid, resource.uid);
    assert_eq!(views[0].public_body, json!({"name": "Con"}));
    assert_eq!(views[0].private_body, json!({}));
    assert_eq!(views[0].url, "");
    assert_eq!(views[0].user_agent, "");

    let full = project(&listed[0], true);
    assert_eq!(full.private_body, json!({"email": "a@b.ch"}));
}

async fn latest_secret_wins<S: Store + ?Sized>(olymp: &Olymp<S>) {
    let resource = olymp.create_resource(Bodies::empty(), provenance()).await.unwrap();
    let log = olymp.entries_of(&resource.uid).await.unwrap();

    log.append(
        Submission::new("sec1", json!({"q": 1}), json!({"ans": "x"})),
        provenance(),
    )
    .await
    .unwrap();
    let second = log
        .append(
            Submission::new("sec1", json!({"q": 2}), json!({"ans": "y"})),
            provenance(),
        )
        .await
        .unwrap();

    let found = olymp.resolve_by_secret(&resource.uid, "sec1").await.unwrap();
    assert_eq!(found.uid, second.uid);
    assert_eq!(found.public_body, json!({"q": 2}));

    assert!(matches!(
        olymp.resolve_by_secret(&resource.uid, "sec2").await,
        Err(OlympError::Unauthorized)
    ));
}

async fn update_supersedes_target<S: Store + ?Sized>(olymp: &Olymp<S>) {
    let resource = olymp.create_resource(Bodies::empty(), provenance()).await.unwrap();
    let log = olymp.entries_of(&resource.uid).await.unwrap();

    let original = log.append(submission("sec1", 1), provenance()).await.unwrap();
    let revised = log
        .update(
            &original.uid,
            Bodies::new(json!({"q": 2}), json!({"ans": "y"})),
            provenance(),
        )
        .await
        .unwrap();

    let old = log.get(&original.uid).await.unwrap();
    assert_eq!(old.status, EntryStatus::Superseded);
    assert_eq!(old.public_body, original.public_body);
    assert_eq!(old.private_body, original.private_body);

    assert_eq!(revised.status, EntryStatus::Active);
    assert_eq!(revised.identification, "sec1");
    assert_eq!(revised.supersedes, Some(original.uid));

    let listed = log.list().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().any(|e| e.uid == revised.uid && e.is_active()));

    // Superseded records cannot be revised again.
    assert!(matches!(
        log.update(&original.uid, Bodies::empty(), provenance()).await,
        Err(OlympError::InvalidState(_))
    ));
}

async fn deletion_is_terminal<S: Store + ?Sized>(olymp: &Olymp<S>) {
    let resource = olymp.create_resource(Bodies::empty(), provenance()).await.unwrap();
    let log = olymp.entries_of(&resource.uid).await.unwrap();

    let entry = log.append(submission("sec1", 1), provenance()).await.unwrap();
    let before = log.len().await.unwrap();

    let tombstone = log.mark_deleted(&entry.uid, provenance()).await.unwrap();
    assert_eq!(tombstone.status, EntryStatus::Deleted);
    assert_eq!(tombstone.identification, "sec1");
    assert_eq!(tombstone.public_body, json!({}));
    assert_eq!(tombstone.private_body, json!({}));
    assert_eq!(log.len().await.unwrap(), before + 1);

    let target = log.get(&entry.uid).await.unwrap();
    assert_eq!(target.status, EntryStatus::Deleted);
    assert_eq!(target.public_body, entry.public_body);
    assert_eq!(target.private_body, entry.private_body);

    assert!(matches!(
        log.update(&tombstone.uid, Bodies::empty(), provenance()).await,
        Err(OlympError::InvalidState(_))
    ));
    assert!(matches!(
        log.mark_deleted(&tombstone.uid, provenance()).await,
        Err(OlympError::InvalidState(_))
    ));
    assert!(matches!(
        log.mark_deleted(&entry.uid, provenance()).await,
        Err(OlympError::InvalidState(_))
    ));
    assert_eq!(log.len().await.unwrap(), before + 1);
}

async fn oversize_writes_leave_no_trace<S: Store + ?Sized>(olymp: &Olymp<S>) {
    let resource = olymp.create_resource(Bodies::empty(), provenance()).await.unwrap();
    let log = olymp.entries_of(&resource.uid).await.unwrap();

    // Pad the public body so the serialized submission is exactly one byte over.
    let base = Submission::new("", json!({ "pad": "" }), json!({}));
    let base_len = serde_json::to_vec(&base).unwrap().len();
    let pad = "x".repeat(MAX_PAYLOAD_BYTES + 1 - base_len);
    let oversize = Submission::new("", json!({ "pad": pad }), json!({}));
    assert_eq!(
        serde_json::to_vec(&oversize).unwrap().len(),
        MAX_PAYLOAD_BYTES + 1
    );

    assert!(matches!(
        log.append(oversize, provenance()).await,
        Err(OlympError::PayloadTooLarge { size, .. }) if size == MAX_PAYLOAD_BYTES + 1
    ));
    assert!(log.is_empty().await.unwrap());

    let resources_before = olymp.list_resources().await.unwrap().len();
    assert!(matches!(
        olymp
            .create_resource(
                Bodies::new(json!({ "pad": "x".repeat(MAX_PAYLOAD_BYTES) }), json!({})),
                provenance(),
            )
            .await,
        Err(OlympError::PayloadTooLarge { .. })
    ));
    assert_eq!(olymp.list_resources().await.unwrap().len(), resources_before);
}

async fn missing_records<S: Store + ?Sized>(olymp: &Olymp<S>) {
    let resource = olymp.create_resource(Bodies::empty(), provenance()).await.unwrap();
    let log = olymp.entries_of(&resource.uid).await.unwrap();
    let ghost = EntryUid::generate();

    assert!(matches!(log.get(&ghost).await, Err(OlympError::NotFound(_))));
    assert!(matches!(
        log.update(&ghost, Bodies::empty(), provenance()).await,
        Err(OlympError::InvalidState(_))
    ));
    assert!(matches!(
        olymp.get_resource(&ResourceUid::generate()).await,
        Err(OlympError::NotFound(_))
    ));
}

macro_rules! scenario_tests {
    ($($name:ident),* $(,)?) => {
        mod memory {
            use super::*;
            $(
                #[tokio::test]
                async fn $name() {
                    let olymp = Olymp::new(MemoryStore::new());
                    super::$name(&olymp).await;
                }
            )*
        }

        mod sqlite {
            use super::*;
            $(
                #[tokio::test]
                async fn $name() {
                    let dir = tempfile::tempdir().unwrap();
                    let olymp: Olymp<SqliteStore> = sqlite_olymp(dir.path());
                    super::$name(&olymp).await;
                }
            )*
        }
    };
}

scenario_tests!(
    resource_listing_is_redacted,
    latest_secret_wins,
    update_supersedes_target,
    deletion_is_terminal,
    oversize_writes_leave_no_trace,
    missing_records,
);
