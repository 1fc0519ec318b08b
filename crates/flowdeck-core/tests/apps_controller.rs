//! List/create controller behaviour against a mock backend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use flowdeck_core::links::PlatformLinks;
use flowdeck_core::models::{AppMode, CreateMode};
use flowdeck_core::workflow::{
    AppsController, ControllerEvent, FormError, FormState, LoadState, NotificationLevel,
};

use common::{api, bearer, credentials, signed_in_store, RecordingLauncher, PLATFORM_URL};

fn controller(server: &MockServer, launcher: Arc<RecordingLauncher>) -> AppsController {
    let store = signed_in_store();
    AppsController::new(
        api(&server.uri()),
        credentials(&store),
        PlatformLinks::new(PLATFORM_URL),
        launcher,
    )
    .with_open_delay(Duration::ZERO)
}

/// Process events until `done` holds, failing after a few seconds.
async fn run_until(ctrl: &mut AppsController, mut done: impl FnMut(&[ControllerEvent]) -> bool) -> Vec<ControllerEvent> {
    let mut seen = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done(&seen) {
            match ctrl.process_next().await {
                Some(event) => seen.push(event),
                None => break,
            }
        }
    })
    .await
    .expect("controller events timed out");
    seen
}

async fn mock_apps(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/dify/apps"))
        .and(header("authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_mount_loads_collection() {
    let server = MockServer::start().await;
    mock_apps(
        &server,
        json!({"apps": [
            {"id": "a1", "name": "Intake", "mode": "workflow", "created_at": "2024-03-01T10:00:00Z"},
            {"id": "a2", "name": "Support Bot", "mode": "chatbot", "description": "Answers FAQs"},
            {"id": "a3", "name": "Concierge", "mode": "advanced-chat"}
        ]}),
    )
    .await;

    let mut ctrl = controller(&server, Arc::new(RecordingLauncher::default()));
    ctrl.mount();
    assert_eq!(ctrl.load_state(), LoadState::Loading);

    assert_eq!(ctrl.process_next().await, Some(ControllerEvent::AppsLoaded));
    assert_eq!(ctrl.load_state(), LoadState::Ready);
    assert_eq!(ctrl.apps().len(), 3);
    assert_eq!(ctrl.apps()[1].mode, AppMode::Chatbot);
    assert_eq!(ctrl.apps()[2].mode.label(), "Advanced Chat");
    assert_eq!(ctrl.apps()[0].created_display(), "2024-03-01");
}

#[tokio::test]
async fn test_missing_apps_field_is_empty() {
    let server = MockServer::start().await;
    mock_apps(&server, json!({"apps": null})).await;

    let mut ctrl = controller(&server, Arc::new(RecordingLauncher::default()));
    ctrl.refresh();

    assert_eq!(ctrl.process_next().await, Some(ControllerEvent::AppsLoaded));
    assert!(ctrl.apps().is_empty());
    assert_eq!(ctrl.load_state(), LoadState::Ready);
}

#[tokio::test]
async fn test_failed_refresh_empties_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dify/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"apps": [{"id": "a1", "name": "Intake", "mode": "workflow"}]})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dify/apps"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let mut ctrl = controller(&server, Arc::new(RecordingLauncher::default()));
    ctrl.mount();
    assert_eq!(ctrl.process_next().await, Some(ControllerEvent::AppsLoaded));
    assert_eq!(ctrl.apps().len(), 1);

    ctrl.refresh();
    assert_eq!(ctrl.process_next().await, Some(ControllerEvent::AppsFailed));
    assert!(ctrl.apps().is_empty());
    assert_eq!(ctrl.load_state(), LoadState::Errored);

    let notes = ctrl.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
}

#[tokio::test]
async fn test_blank_name_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dify/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "x"})))
        .expect(0)
        .mount(&server)
        .await;

    let mut ctrl = controller(&server, Arc::new(RecordingLauncher::default()));
    ctrl.open_form();
    ctrl.form_mut().name = "   ".to_string();

    assert_eq!(ctrl.submit(), Err(FormError::EmptyName));
    assert_eq!(ctrl.form_state(), FormState::Open);
    assert_eq!(ctrl.take_notifications()[0].message, "Please enter an app name");
}

#[tokio::test]
async fn test_create_success_refreshes_resets_and_opens_editor() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dify/apps"))
        .and(header("authorization", bearer().as_str()))
        .and(body_json(json!({
            "name": "Test App",
            "description": "",
            "mode": "chatbot",
            "icon": "🤖",
            "icon_background": "#3B82F6"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "abc123", "name": "Test App"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dify/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"apps": [{"id": "abc123", "name": "Test App", "mode": "chatbot"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let launcher = Arc::new(RecordingLauncher::default());
    let mut ctrl = controller(&server, launcher.clone());

    ctrl.open_form();
    ctrl.form_mut().name = "Test App".to_string();
    ctrl.form_mut().mode = CreateMode::Chatbot;
    ctrl.submit().expect("valid form");
    assert!(ctrl.is_submitting());

    assert_eq!(ctrl.process_next().await, Some(ControllerEvent::AppCreated));
    assert_eq!(ctrl.form_state(), FormState::Closed);
    assert_eq!(ctrl.form().name, "");
    assert_eq!(ctrl.form().mode, CreateMode::Workflow);
    assert_eq!(ctrl.load_state(), LoadState::Loading);

    let events = run_until(&mut ctrl, |seen| {
        seen.contains(&ControllerEvent::AppsLoaded) && seen.contains(&ControllerEvent::EditorOpened)
    })
    .await;
    assert_eq!(events.len(), 2);

    assert_eq!(ctrl.apps().len(), 1);
    assert_eq!(launcher.opened(), vec![format!("{}/app/abc123/workflow", PLATFORM_URL)]);

    let notes = ctrl.take_notifications();
    assert_eq!(notes[0].level, NotificationLevel::Success);
}

#[tokio::test]
async fn test_create_failure_shows_server_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dify/apps"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "duplicate name"})))
        .mount(&server)
        .await;

    let launcher = Arc::new(RecordingLauncher::default());
    let mut ctrl = controller(&server, launcher.clone());

    ctrl.open_form();
    ctrl.form_mut().name = "Test App".to_string();
    ctrl.submit().expect("valid form");

    assert_eq!(ctrl.process_next().await, Some(ControllerEvent::CreateFailed));
    assert_eq!(ctrl.form_state(), FormState::Open);
    assert!(!ctrl.is_submitting());
    assert_eq!(ctrl.form().name, "Test App");

    let notes = ctrl.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert_eq!(notes[0].message, "duplicate name");
    assert!(launcher.opened().is_empty());
}

async fn create_with_failure(response: ResponseTemplate) -> String {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dify/apps"))
        .respond_with(response)
        .mount(&server)
        .await;

    let mut ctrl = controller(&server, Arc::new(RecordingLauncher::default()));
    ctrl.open_form();
    ctrl.form_mut().name = "Test App".to_string();
    ctrl.submit().expect("valid form");

    assert_eq!(ctrl.process_next().await, Some(ControllerEvent::CreateFailed));
    assert_eq!(ctrl.form_state(), FormState::Open);
    ctrl.take_notifications().remove(0).message
}

#[tokio::test]
async fn test_create_failure_json_without_detail_is_generic() {
    let message = create_with_failure(
        ResponseTemplate::new(500).set_body_json(json!({"error": "upstream timeout"})),
    )
    .await;
    assert_eq!(message, "Failed to create app");
}

#[tokio::test]
async fn test_create_failure_with_unreadable_body() {
    let message = create_with_failure(
        ResponseTemplate::new(502).set_body_string("<html><body>Bad Gateway</body></html>"),
    )
    .await;
    assert_eq!(message, "An error occurred while creating the app");

    // A success status whose body is not JSON is just as unreadable
    let message = create_with_failure(ResponseTemplate::new(200).set_body_string("created")).await;
    assert_eq!(message, "An error occurred while creating the app");
}

#[tokio::test]
async fn test_dropped_controller_discards_late_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dify/apps"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"apps": []}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut ctrl = controller(&server, Arc::new(RecordingLauncher::default()));
    ctrl.mount();
    drop(ctrl);

    // The request still completes; its result has nowhere to go.
    tokio::time::sleep(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn test_fetch_single_app() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dify/apps/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "a1",
            "name": "Intake",
            "mode": "agent-chat",
            "status": "normal"
        })))
        .mount(&server)
        .await;

    let app = api(&server.uri())
        .with_token(common::TOKEN)
        .fetch_app("a1")
        .await
        .expect("fetch app");
    assert_eq!(app.mode, AppMode::Other("agent-chat".to_string()));
    assert_eq!(app.mode.label(), "agent-chat");
    assert_eq!(app.description_display(), "No description");
}

#[tokio::test]
async fn test_run_app_posts_inputs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dify/apps/a1/run"))
        .and(header("authorization", bearer().as_str()))
        .and(body_json(json!({"query": "hello", "lang": "en"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "t-1",
            "data": {"status": "succeeded", "outputs": {"answer": "hi"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = api(&server.uri())
        .with_token(common::TOKEN)
        .run_app("a1", &json!({"query": "hello", "lang": "en"}))
        .await
        .expect("run app");
    assert_eq!(result["data"]["outputs"]["answer"], "hi");
}

#[tokio::test]
async fn test_run_app_failure_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dify/apps/a1/run"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "Dify API error: quota exceeded"})))
        .mount(&server)
        .await;

    let err = api(&server.uri())
        .with_token(common::TOKEN)
        .run_app("a1", &json!({}))
        .await
        .expect_err("run should fail");
    assert_eq!(err.detail(), Some("Dify API error: quota exceeded"));
}
