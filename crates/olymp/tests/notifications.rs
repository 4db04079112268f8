//! The notification hook: fired after appends, routed by context, never
//! able to affect the write.

use std::sync::Arc;
use std::time::Duration;

use olymp::config::{NotifyConfig, Recipient, RecipientRule};
use olymp::core::Bodies;
use olymp::store::MemoryStore;
use olymp::{FormOutcome, FormSubmission, Olymp, Submission};
use olymp_testkit::fixtures::{provenance, submission};
use olymp_testkit::{FailingNotifier, TestFixture};
use serde_json::json;

const WAIT: Duration = Duration::from_secs(2);

fn routed_config() -> NotifyConfig {
    NotifyConfig {
        empty_message: "Nachricht war leer.".into(),
        default_recipient: Recipient {
            email: "mail@gildedernacht.ch".into(),
            name: "Gilde der Nacht".into(),
            template: "gilde".into(),
        },
        recipients: vec![
            RecipientRule {
                pattern: "rollenspieltage.ch".into(),
                recipient: Recipient {
                    email: "mail@rollenspieltage.ch".into(),
                    name: "Luzerner Rollenspieltage".into(),
                    template: "rollenspieltage".into(),
                },
            },
            RecipientRule {
                pattern: "spieltage.ch".into(),
                recipient: Recipient {
                    email: "mail@spieltage.ch".into(),
                    name: "Luzerner Spieltage".into(),
                    template: "spieltage".into(),
                },
            },
        ],
    }
}

#[tokio::test]
async fn append_notifies_with_origin_context() {
    let fixture = TestFixture::with_notify_config(routed_config());
    let resource = fixture.create_resource().await;
    let log = fixture.log(&resource).await;

    let entry = log
        .append(
            Submission::new("", json!({}), json!({"message": "Hallo zusammen"})),
            provenance(),
        )
        .await
        .unwrap();

    let seen = fixture.notifier.wait_for(1, WAIT).await;
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].resource_uid, resource.uid);
    assert_eq!(seen[0].entry, entry);
    assert_eq!(seen[0].message, "'Hallo zusammen'");
    assert_eq!(seen[0].context, provenance().origin_url);
    assert_eq!(seen[0].language, "de");
    assert_eq!(seen[0].recipient.template, "rollenspieltage");
}

#[tokio::test]
async fn form_redirect_is_the_context() {
    let fixture = TestFixture::with_notify_config(routed_config());
    let resource = fixture.create_resource().await;

    let form = FormSubmission::parse([
        ("public-name", "Ada"),
        ("private-email", "ada@example.ch"),
        ("redirect", "https://spieltage.ch/danke"),
        ("language", "en"),
        ("captcha", ""),
    ]);
    let outcome = fixture
        .olymp
        .submit_form(&resource.uid, form, provenance())
        .await
        .unwrap();
    assert!(matches!(outcome, FormOutcome::Accepted(_)));

    let seen = fixture.notifier.wait_for(1, WAIT).await;
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].context, "https://spieltage.ch/danke");
    assert_eq!(seen[0].recipient.template, "spieltage");
    assert_eq!(seen[0].language, "en");
    assert_eq!(seen[0].message, "Nachricht war leer.");
}

#[tokio::test]
async fn registration_carries_interface_language() {
    let fixture = TestFixture::new();
    let resource = fixture.create_resource().await;

    let registration = fixture
        .olymp
        .register(
            &resource.uid,
            Submission::new("", json!({"interfaceLanguage": "en"}), json!({})),
            provenance(),
        )
        .await
        .unwrap();
    fixture
        .olymp
        .register(&resource.uid, Submission::new("", json!({}), json!({})), provenance())
        .await
        .unwrap();

    let seen = fixture.notifier.wait_for(2, WAIT).await;
    assert_eq!(seen.len(), 2);
    let first = seen
        .iter()
        .find(|n| n.entry.uid == registration.entry.uid)
        .unwrap();
    assert_eq!(first.language, "en");
    assert!(seen.iter().any(|n| n.entry.uid != registration.entry.uid && n.language == "de"));
}

#[tokio::test]
async fn revisions_and_deletions_do_not_notify() {
    let fixture = TestFixture::new();
    let resource = fixture.create_resource().await;
    let log = fixture.log(&resource).await;

    let entry = log.append(submission("sec1", 1), provenance()).await.unwrap();
    let revised = log
        .update(&entry.uid, Bodies::new(json!({"q": 2}), json!({})), provenance())
        .await
        .unwrap();
    log.mark_deleted(&revised.uid, provenance()).await.unwrap();

    // Give any stray delivery time to land before counting.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(fixture.notifier.notifications().await.len(), 1);
}

#[tokio::test]
async fn spam_does_not_notify() {
    let fixture = TestFixture::new();
    let resource = fixture.create_resource().await;

    let form = FormSubmission::parse([("public-name", "Bot"), ("email-captcha", "filled")]);
    let outcome = fixture
        .olymp
        .submit_form(&resource.uid, form, provenance())
        .await
        .unwrap();
    assert_eq!(outcome, FormOutcome::Spam);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(fixture.notifier.notifications().await.is_empty());
}

#[tokio::test]
async fn failing_notifier_does_not_affect_writes() {
    let olymp = Olymp::new(MemoryStore::new())
        .with_notifier(Arc::new(FailingNotifier), NotifyConfig::default());
    let resource = olymp.create_resource(Bodies::empty(), provenance()).await.unwrap();
    let log = olymp.entries_of(&resource.uid).await.unwrap();

    let entry = log.append(submission("sec1", 1), provenance()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(log.list().await.unwrap(), vec![entry]);
}
