//! Integration tests for the triage pipeline.
//!
//! These tests drive the full pipeline over the in-memory fixture
//! transport: fetch, annotate, draft, edit, send, and retrain. The
//! transport and triage modules carry their own unit tests for detailed
//! logic.

use std::sync::Arc;

use chrono::{Duration, Utc};
use mailtriage::config::{NetworkSettings, Settings};
use mailtriage::domain::{Address, Category, DraftState, Message, MessageId, Priority};
use mailtriage::transport::{Credentials, FixtureTransport, TransportError};
use mailtriage::TriagePipeline;

fn credentials() -> Credentials {
    Credentials::new("user@example.com", "app-password")
}

fn fast_settings() -> Settings {
    Settings {
        network: NetworkSettings {
            timeout_secs: 5,
            retry_backoff_ms: 1,
        },
        ..Settings::default()
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// A pipeline over a fixture mailbox, plus a handle into the fixture for
/// scripting failures and inspecting the outbox.
async fn connected_pipeline() -> (TriagePipeline, Arc<FixtureTransport>) {
    init_tracing();
    let fixture = Arc::new(FixtureTransport::with_sample_messages());
    let mut pipeline =
        TriagePipeline::with_settings(Box::new(Arc::clone(&fixture)), fast_settings());
    pipeline.connect(credentials()).await.unwrap();
    (pipeline, fixture)
}

fn spam_message() -> Message {
    Message {
        id: MessageId::from("spam-1"),
        subject: "You Are a Winner!".to_string(),
        sender: Address::new("promo@lottery.biz"),
        body: "Click here to claim your free prize now.".to_string(),
        received_at: Utc::now() - Duration::hours(1),
        category: None,
        priority: None,
        is_read: false,
    }
}

// ============================================================================
// Fetch and Annotate
// ============================================================================

#[tokio::test]
async fn fetch_annotates_every_message() {
    let (mut pipeline, _fixture) = connected_pipeline().await;

    let messages = pipeline.fetch_and_annotate(10).await.unwrap();
    assert_eq!(messages.len(), 2);
    for message in messages {
        assert!(message.category.is_some());
        assert!(message.priority.is_some());
    }
}

#[tokio::test]
async fn sample_mailbox_triage_outcomes() {
    let (mut pipeline, fixture) = connected_pipeline().await;
    fixture.push_message(spam_message());

    pipeline.fetch_and_annotate(10).await.unwrap();
    let messages = pipeline.messages();
    assert_eq!(messages.len(), 3);

    // Most-recent-first: deadline, spam, coffee.
    assert_eq!(messages[0].id, MessageId::from("sample-1"));
    assert_eq!(messages[0].category, Some(Category::Work));
    assert_eq!(messages[0].priority, Some(Priority::High));

    assert_eq!(messages[1].id, MessageId::from("spam-1"));
    assert_eq!(messages[1].category, Some(Category::Spam));
    assert_eq!(messages[1].priority, Some(Priority::Low));

    assert_eq!(messages[2].id, MessageId::from("sample-2"));
    assert_eq!(messages[2].category, Some(Category::Personal));
    assert_eq!(messages[2].priority, Some(Priority::Low));
}

#[tokio::test]
async fn fetch_limit_caps_the_collection() {
    let (mut pipeline, _fixture) = connected_pipeline().await;

    let messages = pipeline.fetch_and_annotate(1).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].id, MessageId::from("sample-1"));
}

#[tokio::test]
async fn default_fetch_limit_comes_from_settings() {
    init_tracing();
    let fixture = Arc::new(FixtureTransport::with_sample_messages());
    let settings = Settings {
        fetch: mailtriage::config::FetchSettings { default_limit: 1 },
        ..fast_settings()
    };
    let mut pipeline = TriagePipeline::with_settings(Box::new(Arc::clone(&fixture)), settings);
    pipeline.connect(credentials()).await.unwrap();

    let messages = pipeline.fetch_and_annotate_default().await.unwrap();
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn transient_fetch_failure_recovers_on_the_retry() {
    let (mut pipeline, fixture) = connected_pipeline().await;
    fixture.fail_next_fetch(TransportError::Connection("flaky network".to_string()));

    let messages = pipeline.fetch_and_annotate(10).await.unwrap();
    assert_eq!(messages.len(), 2);
}

#[tokio::test]
async fn transient_protocol_failure_recovers_on_the_retry() {
    let (mut pipeline, fixture) = connected_pipeline().await;
    fixture.fail_next_fetch(TransportError::Protocol("truncated response".to_string()));

    let messages = pipeline.fetch_and_annotate(10).await.unwrap();
    assert_eq!(messages.len(), 2);
}

#[tokio::test]
async fn failed_fetch_keeps_the_previous_collection() {
    let (mut pipeline, fixture) = connected_pipeline().await;
    pipeline.fetch_and_annotate(10).await.unwrap();
    assert_eq!(pipeline.messages().len(), 2);

    // Both the call and its retry fail.
    fixture.fail_next_fetch(TransportError::Connection("down".to_string()));
    fixture.fail_next_fetch(TransportError::Connection("still down".to_string()));

    let result = pipeline.fetch_and_annotate(10).await;
    assert!(matches!(result, Err(TransportError::Connection(_))));
    assert_eq!(pipeline.messages().len(), 2);
}

#[tokio::test]
async fn authentication_failure_during_fetch_is_not_retried() {
    let (mut pipeline, fixture) = connected_pipeline().await;
    fixture.fail_next_fetch(TransportError::Authentication("expired".to_string()));
    // The second queued failure must remain unconsumed.
    fixture.fail_next_fetch(TransportError::Connection("unreachable".to_string()));

    let result = pipeline.fetch_and_annotate(10).await;
    assert!(matches!(result, Err(TransportError::Authentication(_))));

    // The connection error is still queued: the next fetch pops it (and
    // retries through to success), proving the auth failure used one
    // attempt only.
    let messages = pipeline.fetch_and_annotate(10).await.unwrap();
    assert_eq!(messages.len(), 2);
}

#[tokio::test]
async fn rejected_credentials_surface_from_connect() {
    let fixture = Arc::new(FixtureTransport::with_sample_messages());
    fixture.reject_credentials();

    let mut pipeline =
        TriagePipeline::with_settings(Box::new(Arc::clone(&fixture)), fast_settings());
    let result = pipeline.connect(credentials()).await;
    assert!(matches!(result, Err(TransportError::Authentication(_))));
    assert!(!fixture.is_connected());
}

// ============================================================================
// Draft Lifecycle
// ============================================================================

#[tokio::test]
async fn draft_edit_send_lifecycle() -> anyhow::Result<()> {
    let (mut pipeline, fixture) = connected_pipeline().await;
    pipeline.fetch_and_annotate(10).await?;

    let id = MessageId::from("sample-2");
    let draft = pipeline.draft_reply(&id)?;
    assert_eq!(draft.state, DraftState::Generated);
    assert_eq!(
        draft.body,
        "Sounds great! I'm up for coffee this weekend. When and where?"
    );

    pipeline.edit_draft(&id, "Sunday at ten works for me!")?;
    assert_eq!(pipeline.draft(&id).unwrap().state, DraftState::Edited);

    let sent = pipeline.send(&id, None).await?;
    assert!(sent);
    assert_eq!(pipeline.draft(&id).unwrap().state, DraftState::Sent);

    let outbox = fixture.sent();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].to, "friend@email.com");
    assert_eq!(outbox[0].subject, "Re: Coffee This Weekend?");
    assert_eq!(outbox[0].body, "Sunday at ten works for me!");
    Ok(())
}

#[tokio::test]
async fn work_deadline_draft_uses_the_deadline_template() {
    let (mut pipeline, _fixture) = connected_pipeline().await;
    pipeline.fetch_and_annotate(10).await.unwrap();

    let draft = pipeline.draft_reply(&MessageId::from("sample-1")).unwrap();
    assert_eq!(
        draft.body,
        "Thanks for the update. I’ll make sure everything is on track and share progress shortly."
    );
}

#[tokio::test]
async fn spam_draft_is_the_no_reply_sentinel() {
    let (mut pipeline, fixture) = connected_pipeline().await;
    fixture.push_message(spam_message());
    pipeline.fetch_and_annotate(10).await.unwrap();

    let draft = pipeline.draft_reply(&MessageId::from("spam-1")).unwrap();
    assert_eq!(draft.body, "No reply required.");
}

#[tokio::test]
async fn send_without_a_draft_is_rejected() {
    let (mut pipeline, fixture) = connected_pipeline().await;
    pipeline.fetch_and_annotate(10).await.unwrap();

    let result = pipeline.send(&MessageId::from("sample-1"), None).await;
    assert!(matches!(result, Err(TransportError::InvalidRequest(_))));
    assert!(fixture.sent().is_empty());
}

#[tokio::test]
async fn rejected_recipient_is_a_soft_failure() {
    let (mut pipeline, fixture) = connected_pipeline().await;
    fixture.reject_domain("company.com");
    pipeline.fetch_and_annotate(10).await.unwrap();

    let id = MessageId::from("sample-1");
    pipeline.draft_reply(&id).unwrap();

    let sent = pipeline.send(&id, None).await.unwrap();
    assert!(!sent);
    assert_eq!(pipeline.draft(&id).unwrap().state, DraftState::Failed);
    assert!(fixture.sent().is_empty());
}

#[tokio::test]
async fn failed_send_can_be_retried_without_regenerating() {
    let (mut pipeline, fixture) = connected_pipeline().await;
    pipeline.fetch_and_annotate(10).await.unwrap();

    let id = MessageId::from("sample-2");
    pipeline.draft_reply(&id).unwrap();
    pipeline.edit_draft(&id, "Saturday instead?").unwrap();

    // Both the call and its retry fail.
    fixture.fail_next_send(TransportError::Connection("relay down".to_string()));
    fixture.fail_next_send(TransportError::Connection("relay still down".to_string()));

    let result = pipeline.send(&id, None).await;
    assert!(matches!(result, Err(TransportError::Connection(_))));
    assert_eq!(pipeline.draft(&id).unwrap().state, DraftState::Failed);

    // Same draft, second attempt: the edit survives.
    let sent = pipeline.send(&id, None).await.unwrap();
    assert!(sent);
    assert_eq!(pipeline.draft(&id).unwrap().state, DraftState::Sent);
    assert_eq!(fixture.sent()[0].body, "Saturday instead?");
}

#[tokio::test]
async fn final_edit_at_send_time_is_what_goes_out() {
    let (mut pipeline, fixture) = connected_pipeline().await;
    pipeline.fetch_and_annotate(10).await.unwrap();

    let id = MessageId::from("sample-1");
    pipeline.draft_reply(&id).unwrap();

    let sent = pipeline.send(&id, Some("Report lands tomorrow morning.")).await.unwrap();
    assert!(sent);
    assert_eq!(fixture.sent()[0].body, "Report lands tomorrow morning.");
    assert_eq!(pipeline.draft(&id).unwrap().state, DraftState::Sent);
}

// ============================================================================
// Retraining and Session State
// ============================================================================

#[tokio::test]
async fn retrained_models_still_triage_the_samples_correctly() {
    let (mut pipeline, _fixture) = connected_pipeline().await;
    pipeline.retrain();
    assert!(pipeline.is_trained());

    pipeline.fetch_and_annotate(10).await.unwrap();
    let messages = pipeline.messages();

    assert_eq!(messages[0].category, Some(Category::Work));
    assert_eq!(messages[0].priority, Some(Priority::High));
    assert_eq!(messages[1].category, Some(Category::Personal));
    assert_eq!(messages[1].priority, Some(Priority::Low));
}

#[tokio::test]
async fn mark_read_persists_across_lookups() {
    let (mut pipeline, _fixture) = connected_pipeline().await;
    pipeline.fetch_and_annotate(10).await.unwrap();

    let id = MessageId::from("sample-1");
    assert!(pipeline.mark_read(&id, true));
    assert!(pipeline.messages()[0].is_read);

    assert!(pipeline.mark_read(&id, false));
    assert!(!pipeline.messages()[0].is_read);
}

#[tokio::test]
async fn disconnect_releases_the_fixture_session() {
    let (mut pipeline, fixture) = connected_pipeline().await;
    assert!(fixture.is_connected());

    pipeline.disconnect().await.unwrap();
    assert!(!fixture.is_connected());
}
