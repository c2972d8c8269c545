//! End-to-end exchanges against a mock backend

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{MockBackend, DEAD_BASE_URL};
use nexa_core::{
    check_health, AssistantClient, ChatMessage, ChatRole, Dispatcher, HealthPath, HealthStatus,
    Rejection, SessionStore, SubmitOutcome, NO_RESPONSE_TEXT, SUGGESTED_PROMPTS,
    UNREACHABLE_TEXT,
};

fn dispatcher(base_url: &str) -> Dispatcher {
    Dispatcher::new(Arc::new(SessionStore::new()), AssistantClient::new(base_url))
}

#[tokio::test]
async fn test_suggested_prompt_exchange() {
    let mock = MockBackend::new().prompt(StatusCode::OK, r#"{"response":"UCB requires CS 61B."}"#);
    let base = mock.spawn().await;
    let dispatcher = dispatcher(&base);

    assert_eq!(dispatcher.store().len(), 1);
    assert_eq!(dispatcher.activate_suggestion(1).await, SubmitOutcome::Answered);

    let transcript = dispatcher.store().snapshot();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[1], ChatMessage::user(SUGGESTED_PROMPTS[1]));
    assert_eq!(transcript[2], ChatMessage::assistant("UCB requires CS 61B."));
    assert!(!dispatcher.store().is_pending());
    assert_eq!(mock.prompts_seen(), vec![SUGGESTED_PROMPTS[1].to_string()]);
}

#[tokio::test]
async fn test_server_error_falls_back() {
    let mock = MockBackend::new().prompt(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"ok":false,"error":{"code":"LLM_ERROR","message":"Failed to generate response."}}"#,
    );
    let base = mock.spawn().await;
    let dispatcher = dispatcher(&base);

    assert_eq!(dispatcher.submit("hello").await, SubmitOutcome::Unreachable);

    let transcript = dispatcher.store().snapshot();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[1], ChatMessage::user("hello"));
    assert_eq!(transcript[2], ChatMessage::assistant(UNREACHABLE_TEXT));
    assert!(!dispatcher.store().is_pending());
}

#[tokio::test]
async fn test_transport_failure_falls_back() {
    let dispatcher = dispatcher(DEAD_BASE_URL);

    assert_eq!(dispatcher.submit("hello").await, SubmitOutcome::Unreachable);

    let transcript = dispatcher.store().snapshot();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[2].content, UNREACHABLE_TEXT);
    assert!(!dispatcher.store().is_pending());
}

#[tokio::test]
async fn test_malformed_body_falls_back() {
    let mock = MockBackend::new().prompt(StatusCode::OK, "definitely not json");
    let base = mock.spawn().await;
    let dispatcher = dispatcher(&base);

    assert_eq!(dispatcher.submit("hello").await, SubmitOutcome::Unreachable);
    assert_eq!(dispatcher.store().snapshot()[2].content, UNREACHABLE_TEXT);
    assert!(!dispatcher.store().is_pending());
}

#[tokio::test]
async fn test_missing_response_is_no_answer() {
    let mock = MockBackend::new().prompt(StatusCode::OK, r#"{"ok":true}"#);
    let base = mock.spawn().await;
    let dispatcher = dispatcher(&base);

    assert_eq!(dispatcher.submit("hello").await, SubmitOutcome::NoAnswer);
    assert_eq!(dispatcher.store().snapshot()[2].content, NO_RESPONSE_TEXT);
    assert!(!dispatcher.store().is_pending());
}

#[tokio::test]
async fn test_empty_response_is_no_answer() {
    let mock = MockBackend::new().prompt(StatusCode::OK, r#"{"ok":true,"response":""}"#);
    let base = mock.spawn().await;
    let dispatcher = dispatcher(&base);

    assert_eq!(dispatcher.submit("hello").await, SubmitOutcome::NoAnswer);
    assert_eq!(dispatcher.store().snapshot()[2].content, NO_RESPONSE_TEXT);
}

#[tokio::test]
async fn test_data_text_used_when_response_missing() {
    let mock = MockBackend::new().prompt(StatusCode::OK, r#"{"ok":true,"data":{"text":"From data."}}"#);
    let base = mock.spawn().await;
    let dispatcher = dispatcher(&base);

    assert_eq!(dispatcher.submit("hello").await, SubmitOutcome::Answered);
    assert_eq!(dispatcher.store().snapshot()[2].content, "From data.");
}

#[tokio::test]
async fn test_blank_input_is_silent_noop() {
    let mock = MockBackend::new();
    let base = mock.spawn().await;
    let dispatcher = dispatcher(&base);

    for input in ["", "   ", "\n\t "] {
        assert_eq!(
            dispatcher.submit(input).await,
            SubmitOutcome::Rejected(Rejection::Empty)
        );
    }

    assert_eq!(dispatcher.store().len(), 1);
    assert_eq!(mock.prompt_calls(), 0);
    assert!(!dispatcher.store().is_pending());
}

#[tokio::test]
async fn test_input_is_trimmed_before_sending() {
    let mock = MockBackend::new();
    let base = mock.spawn().await;
    let dispatcher = dispatcher(&base);

    dispatcher.submit("   What about UCSD?  ").await;

    assert_eq!(mock.prompts_seen(), vec!["What about UCSD?".to_string()]);
    assert_eq!(dispatcher.store().snapshot()[1].content, "What about UCSD?");
}

#[tokio::test]
async fn test_second_submit_while_pending_is_dropped() {
    let (mock, gate) = MockBackend::new()
        .prompt(StatusCode::OK, r#"{"response":"first answer"}"#)
        .gated();
    let base = mock.spawn().await;
    let dispatcher = dispatcher(&base);

    let first = tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move { dispatcher.submit("first").await }
    });
    gate.arrived.notified().await;

    // The user message lands before the request goes out
    let store = dispatcher.store();
    assert!(store.is_pending());
    assert_eq!(store.len(), 2);
    assert_eq!(store.snapshot()[1], ChatMessage::user("first"));

    assert_eq!(
        dispatcher.submit("second").await,
        SubmitOutcome::Rejected(Rejection::Pending)
    );
    assert_eq!(
        dispatcher.activate_suggestion(0).await,
        SubmitOutcome::Rejected(Rejection::Pending)
    );
    assert_eq!(store.len(), 2);
    assert_eq!(mock.prompt_calls(), 1);

    gate.release.notify_one();
    assert_eq!(first.await.unwrap(), SubmitOutcome::Answered);

    let transcript = store.snapshot();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[2], ChatMessage::assistant("first answer"));
    assert!(!store.is_pending());
    assert_eq!(mock.prompt_calls(), 1);
}

#[tokio::test]
async fn test_health_probe_runs_while_exchange_pending() {
    let (mock, gate) = MockBackend::new().gated();
    let base = mock.spawn().await;
    let dispatcher = dispatcher(&base);

    let exchange = tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move { dispatcher.submit("hello").await }
    });
    gate.arrived.notified().await;

    let status = check_health(dispatcher.client(), HealthPath::Health).await;
    assert_eq!(status, HealthStatus::Ready { campuses: None });
    assert!(dispatcher.store().is_pending());
    assert_eq!(dispatcher.store().len(), 2);

    gate.release.notify_one();
    exchange.await.unwrap();
    assert_eq!(dispatcher.store().len(), 3);
}

#[tokio::test]
async fn test_each_exchange_adds_two_messages() {
    let mock = MockBackend::new();
    let base = mock.spawn().await;
    let dispatcher = dispatcher(&base);

    for (i, text) in ["one", "two", "three"].into_iter().enumerate() {
        dispatcher.submit(text).await;
        assert_eq!(dispatcher.store().len(), 1 + 2 * (i + 1));
    }

    let roles: Vec<ChatRole> = dispatcher.store().snapshot().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            ChatRole::Assistant,
            ChatRole::User,
            ChatRole::Assistant,
            ChatRole::User,
            ChatRole::Assistant,
            ChatRole::User,
            ChatRole::Assistant,
        ]
    );
    assert_eq!(mock.prompt_calls(), 3);
}

#[tokio::test]
async fn test_session_usable_after_failure() {
    let dead = dispatcher(DEAD_BASE_URL);
    assert_eq!(dead.submit("first").await, SubmitOutcome::Unreachable);
    assert!(!dead.store().is_pending());
    assert_eq!(dead.submit("second").await, SubmitOutcome::Unreachable);
    assert_eq!(dead.store().len(), 5);
}

#[tokio::test]
async fn test_suggestion_matches_typed_text() {
    let mock = MockBackend::new().prompt(StatusCode::OK, r#"{"response":"Same answer."}"#);
    let base = mock.spawn().await;

    let clicked = dispatcher(&base);
    clicked.activate_suggestion(3).await;

    let typed = dispatcher(&base);
    typed.store().set_draft(SUGGESTED_PROMPTS[3]);
    typed.submit_draft().await;

    assert_eq!(clicked.store().snapshot(), typed.store().snapshot());
}

#[tokio::test]
async fn test_out_of_range_suggestion_is_noop() {
    let mock = MockBackend::new();
    let base = mock.spawn().await;
    let dispatcher = dispatcher(&base);

    assert_eq!(
        dispatcher.activate_suggestion(SUGGESTED_PROMPTS.len()).await,
        SubmitOutcome::Rejected(Rejection::Empty)
    );
    assert_eq!(dispatcher.store().len(), 1);
    assert_eq!(mock.prompt_calls(), 0);
}

#[tokio::test]
async fn test_submit_draft_clears_input() {
    let mock = MockBackend::new();
    let base = mock.spawn().await;
    let dispatcher = dispatcher(&base);

    dispatcher.store().set_draft("  how many units transfer?  ");
    assert!(dispatcher.submit_draft().await.was_accepted());

    assert_eq!(dispatcher.store().draft(), "");
    assert_eq!(mock.prompts_seen(), vec!["how many units transfer?".to_string()]);
}

#[tokio::test]
async fn test_suggestions_only_on_seed_message() {
    let mock = MockBackend::new();
    let base = mock.spawn().await;
    let dispatcher = dispatcher(&base);

    dispatcher.activate_suggestion(0).await;
    dispatcher.submit("follow up").await;

    let transcript = dispatcher.store().snapshot();
    assert!(transcript[0].suggested_prompts.is_some());
    assert!(transcript[1..].iter().all(|m| m.suggested_prompts.is_none()));
}

#[tokio::test]
async fn test_subscribers_see_every_exchange() {
    let mock = MockBackend::new();
    let base = mock.spawn().await;
    let dispatcher = dispatcher(&base);
    let mut rx = dispatcher.store().subscribe();

    dispatcher.submit("hello").await;

    assert!(rx.has_changed().unwrap());
    assert!(*rx.borrow_and_update() >= 4);
}
