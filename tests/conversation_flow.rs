mod common;

use common::{normalizer_with, MockEventStore};
use kalenteribotti::conversation::{reply, Action, SessionKey, SessionState, SessionStore, Trigger};
use std::sync::Arc;
use std::time::Duration;

fn store() -> SessionStore {
    SessionStore::new(Duration::from_secs(900))
}

#[tokio::test]
async fn test_add_event_then_payload() {
    let sessions = store();
    let calendar = Arc::new(MockEventStore::new());
    let normalizer = normalizer_with(&calendar);
    let key = SessionKey::new(10, 42);

    assert_eq!(sessions.apply(key, Trigger::Start).await, Action::ShowMenu);
    assert_eq!(
        sessions.apply(key, Trigger::AddEvent).await,
        Action::PromptForPayload
    );
    assert_eq!(sessions.state(key).await, SessionState::AwaitingPayload);

    let payload = r#"[
        {"summary": "Standup", "start": "2025-03-05T09:00:00+01:00"},
        {"summary": "Broken", "start": "tomorrow"}
    ]"#;
    let Action::ProcessPayload(text) = sessions.apply(key, Trigger::Text(payload.into())).await
    else {
        panic!("payload was not taken");
    };
    assert_eq!(sessions.state(key).await, SessionState::Idle);

    let result = normalizer.normalize(&text).await.unwrap();
    let report = reply::batch_report(&result);

    assert!(report.starts_with("✅ Events created: 1"));
    assert!(report.contains("#2: "));
    assert_eq!(calendar.created().await.len(), 1);
}

#[tokio::test]
async fn test_text_while_idle_is_ignored() {
    let sessions = store();
    let key = SessionKey::new(10, 42);

    assert_eq!(
        sessions.apply(key, Trigger::Text("{}".into())).await,
        Action::Ignore
    );
    assert!(sessions.is_empty().await);
}

#[tokio::test]
async fn test_cancel_abandons_pending_payload() {
    let sessions = store();
    let key = SessionKey::new(10, 42);

    sessions.apply(key, Trigger::AddEvent).await;
    assert_eq!(sessions.apply(key, Trigger::Cancel).await, Action::Cancelled);
    assert_eq!(
        sessions.apply(key, Trigger::Text("{}".into())).await,
        Action::Ignore
    );
}

#[tokio::test]
async fn test_sessions_are_per_user_and_channel() {
    let sessions = store();
    let alice = SessionKey::new(10, 1);
    let bob = SessionKey::new(10, 2);
    let alice_elsewhere = SessionKey::new(11, 1);

    sessions.apply(alice, Trigger::AddEvent).await;

    assert_eq!(sessions.state(alice).await, SessionState::AwaitingPayload);
    assert_eq!(sessions.state(bob).await, SessionState::Idle);
    assert_eq!(sessions.state(alice_elsewhere).await, SessionState::Idle);
    assert_eq!(
        sessions.apply(bob, Trigger::Text("{}".into())).await,
        Action::Ignore
    );
}

#[tokio::test]
async fn test_malformed_payload_still_ends_the_wait() {
    let sessions = store();
    let calendar = Arc::new(MockEventStore::new());
    let normalizer = normalizer_with(&calendar);
    let key = SessionKey::new(10, 42);

    sessions.apply(key, Trigger::AddEvent).await;
    let Action::ProcessPayload(text) = sessions.apply(key, Trigger::Text("{oops".into())).await
    else {
        panic!("payload was not taken");
    };

    let err = normalizer.normalize(&text).await.unwrap_err();
    assert_eq!(
        reply::payload_error_text(&err),
        "Invalid JSON. Send an object or an array of objects."
    );
    assert_eq!(sessions.state(key).await, SessionState::Idle);
    assert!(calendar.created().await.is_empty());
}
