use crate::common::{unique_session, Script, ScriptedBackend, TestApp};
use edgemind::models::conversation::Turn;
use edgemind::services::storage::ConversationStore;

#[tokio::test]
async fn test_chat_replies_and_persists() {
    let app = TestApp::with_backend(ScriptedBackend::with_script([Script::Reply("hello".into())])).await;
    let session = unique_session("test_chat_replies_and_persists");

    let response = app.post_message(&session, "hi").await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "response": "hello" }));
    assert_eq!(
        app.store.load(&session).await.unwrap(),
        vec![Turn::user("hi"), Turn::assistant("hello")]
    );
}

#[tokio::test]
async fn test_completion_failure_returns_ok_with_error() {
    let app = TestApp::with_backend(ScriptedBackend::with_script([Script::Fail(
        "upstream unavailable".into(),
    )]))
    .await;
    let session = unique_session("test_completion_failure_returns_ok_with_error");

    let response = app.post_message(&session, "hi").await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["response"], "Error");
    assert_eq!(body["error"], "upstream unavailable");
    assert!(app.store.load(&session).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_session_id_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .client
        .post(app.url("/"))
        .json(&serde_json::json!({ "message": "hi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "MISSING_IDENTIFIER");

    // no actor, no completion call, no write
    assert!(app.sessions.is_empty());
    assert_eq!(app.backend.call_count(), 0);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_empty_session_id_is_rejected() {
    let app = TestApp::new().await;

    let response = app.post_message("", "hi").await;

    assert_eq!(response.status(), 400);
    assert!(app.sessions.is_empty());
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_conversation_carries_context() {
    let app = TestApp::new().await;
    let session = unique_session("test_conversation_carries_context");

    for message in ["my name is Sam", "what is my name?"] {
        let response = app.post_message(&session, message).await;
        assert_eq!(response.status(), 200);
    }

    let second_call = &app.backend.calls()[1];
    assert!(second_call.contains(&Turn::user("my name is Sam")));
    assert_eq!(app.store.load(&session).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_sessions_do_not_share_history() {
    let app = TestApp::new().await;
    let alice = unique_session("test_sessions_do_not_share_history_alice");
    let bob = unique_session("test_sessions_do_not_share_history_bob");

    app.post_message(&alice, "secret from alice").await;
    app.post_message(&bob, "hello from bob").await;

    let bob_call = &app.backend.calls()[1];
    assert!(!bob_call.contains(&Turn::user("secret from alice")));
    assert_eq!(app.sessions.len(), 2);
}

#[tokio::test]
async fn test_history_returns_persisted_turns() {
    let app = TestApp::new().await;
    let session = unique_session("test_history_returns_persisted_turns");
    app.post_message(&session, "hi").await;

    let response = app
        .client
        .get(app.url(&format!("/api/v1/history?sessionId={}", session)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["session_id"], session.as_str());
    assert_eq!(
        body["turns"],
        serde_json::json!([
            { "role": "user", "content": "hi" },
            { "role": "assistant", "content": "reply to: hi" }
        ])
    );
}

#[tokio::test]
async fn test_history_requires_session_id() {
    let app = TestApp::new().await;

    let response = app.client.get(app.url("/api/v1/history")).send().await.unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_index_serves_html() {
    let app = TestApp::new().await;

    let response = app.client.get(app.url("/")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    assert!(response.text().await.unwrap().contains("<html"));
}

#[tokio::test]
async fn test_other_methods_and_paths_are_not_found() {
    let app = TestApp::new().await;

    let put = app.client.put(app.url("/")).send().await.unwrap();
    assert_eq!(put.status(), 404);
    assert_eq!(put.text().await.unwrap(), "Not Found");

    let unknown = app.client.get(app.url("/does-not-exist")).send().await.unwrap();
    assert_eq!(unknown.status(), 404);
}

#[tokio::test]
async fn test_backend_panic_returns_ok_with_error() {
    let app = TestApp::with_backend(ScriptedBackend::with_script([Script::Panic(
        "provider client blew up".into(),
    )]))
    .await;
    let session = unique_session("test_backend_panic_returns_ok_with_error");

    let response = app.post_message(&session, "hi").await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["response"], "Error");
    assert!(body["error"].as_str().unwrap().contains("provider client blew up"));

    // the session keeps working afterwards
    for _ in 0..2 {
        let response = app.post_message(&session, "again").await;
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["response"], "reply to: again");
    }
}

#[tokio::test]
async fn test_missing_session_id_is_checked_before_body() {
    let app = TestApp::new().await;

    let response = app.client.post(app.url("/")).body("hi").send().await.unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "MISSING_IDENTIFIER");
    assert!(app.sessions.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = TestApp::new().await;
    let session = unique_session("test_malformed_body_is_rejected");

    let response = app
        .client
        .post(app.url(&format!("/?sessionId={}", session)))
        .body("hi")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(app.backend.call_count(), 0);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_history_of_unknown_session_is_empty() {
    let app = TestApp::new().await;
    let session = unique_session("test_history_of_unknown_session_is_empty");

    let response = app
        .client
        .get(app.url(&format!("/api/v1/history?sessionId={}", session)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["turns"], serde_json::json!([]));
    assert!(app.sessions.is_empty());
}
