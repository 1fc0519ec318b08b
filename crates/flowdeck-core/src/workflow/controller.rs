//! List/create controller for workflow platform applications.
//!
//! Network calls run on spawned tasks and report back through an MPSC
//! channel; the host drains it from its event loop (`drain_events`) or
//! awaits it (`process_next`). Dropping the controller does not cancel
//! in-flight requests: their results are discarded when the send fails.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::Credentials;
use crate::links::{Launcher, PlatformLinks};
use crate::models::{CreatedApp, RemoteApplication};

use super::form::{CreateForm, FormError};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 16;

/// Default delay between a successful create and opening its editor.
pub const DEFAULT_OPEN_DELAY: Duration = Duration::from_millis(500);

/// Shown when the server rejects a create with a JSON body but no message.
const CREATE_FAILED_MESSAGE: &str = "Failed to create app";

/// Shown when a create request got no response or an unreadable one.
const CREATE_ERROR_MESSAGE: &str = "An error occurred while creating the app";

const LOAD_FAILED_MESSAGE: &str = "Failed to load apps";

const CREATED_MESSAGE: &str = "App created";

// ============================================================================
// State Types
// ============================================================================

/// Collection load state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Errored,
}

/// Creation form state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Closed,
    Open,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// Non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// What a processed background result turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    AppsLoaded,
    AppsFailed,
    AppCreated,
    CreateFailed,
    EditorOpened,
}

/// Results sent from spawned tasks back to the controller.
enum TaskResult {
    Apps(Result<Vec<RemoteApplication>, ApiError>),
    Created(Result<CreatedApp, ApiError>),
    OpenEditor(String),
}

// ============================================================================
// Controller
// ============================================================================

pub struct AppsController {
    api: ApiClient,
    credentials: Credentials,
    links: PlatformLinks,
    launcher: Arc<dyn Launcher>,
    open_delay: Duration,

    apps: Vec<RemoteApplication>,
    load_state: LoadState,
    form: CreateForm,
    form_state: FormState,
    notifications: Vec<Notification>,

    tx: mpsc::Sender<TaskResult>,
    rx: mpsc::Receiver<TaskResult>,
}

impl AppsController {
    pub fn new(
        api: ApiClient,
        credentials: Credentials,
        links: PlatformLinks,
        launcher: Arc<dyn Launcher>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            api,
            credentials,
            links,
            launcher,
            open_delay: DEFAULT_OPEN_DELAY,
            apps: Vec::new(),
            load_state: LoadState::Idle,
            form: CreateForm::default(),
            form_state: FormState::Closed,
            notifications: Vec::new(),
            tx,
            rx,
        }
    }

    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = delay;
        self
    }

    /// Called when the view first appears.
    pub fn mount(&mut self) {
        self.refresh();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn apps(&self) -> &[RemoteApplication] {
        &self.apps
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    pub fn form(&self) -> &CreateForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CreateForm {
        &mut self.form
    }

    pub fn form_state(&self) -> FormState {
        self.form_state
    }

    pub fn is_submitting(&self) -> bool {
        self.form_state == FormState::Submitting
    }

    pub fn links(&self) -> &PlatformLinks {
        &self.links
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Hand queued notifications to the view.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
    }

    // =========================================================================
    // Form
    // =========================================================================

    pub fn open_form(&mut self) {
        if self.form_state == FormState::Closed {
            self.form_state = FormState::Open;
        }
    }

    pub fn close_form(&mut self) {
        self.form_state = FormState::Closed;
    }

    // =========================================================================
    // List
    // =========================================================================

    /// Re-fetch the whole collection with the currently stored token.
    pub fn refresh(&mut self) {
        self.load_state = LoadState::Loading;

        let api = self.api.with_optional_token(self.credentials.token());
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let result = api.fetch_apps().await;
            Self::send_result(&tx, TaskResult::Apps(result)).await;
        });
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Validate the form and submit it.
    ///
    /// Nothing stops a second submit while one is in flight; the view is
    /// expected to ignore input while `is_submitting()`.
    pub fn submit(&mut self) -> Result<(), FormError> {
        let request = match self.form.to_request() {
            Ok(request) => request,
            Err(e) => {
                self.notify(NotificationLevel::Error, e.to_string());
                return Err(e);
            }
        };

        self.form_state = FormState::Submitting;
        info!(name = %request.name, mode = ?request.mode, "Creating app");

        let api = self.api.with_optional_token(self.credentials.token());
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let result = api.create_app(&request).await;
            Self::send_result(&tx, TaskResult::Created(result)).await;
        });

        Ok(())
    }

    // =========================================================================
    // Deep links
    // =========================================================================

    pub fn open_editor(&mut self, app_id: &str) {
        let url = self.links.editor(app_id);
        self.launch(&url);
    }

    pub fn open_overview(&mut self, app_id: &str) {
        let url = self.links.overview(app_id);
        self.launch(&url);
    }

    pub fn open_platform_home(&mut self) {
        let url = self.links.home();
        self.launch(&url);
    }

    fn launch(&mut self, url: &str) {
        debug!(url = url, "Opening external link");
        if let Err(e) = self.launcher.open(url) {
            warn!(error = %e, "Failed to open link");
            self.notify(NotificationLevel::Error, format!("Could not open {}", url));
        }
    }

    // =========================================================================
    // Background results
    // =========================================================================

    /// Helper to send task results, logging when the controller is gone
    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if tx.send(result).await.is_err() {
            debug!("Controller dropped before task finished; discarding result");
        }
    }

    /// Apply every result that has already arrived.
    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        let mut results = Vec::new();
        while let Ok(result) = self.rx.try_recv() {
            results.push(result);
        }
        results.into_iter().map(|r| self.apply(r)).collect()
    }

    /// Wait for the next background result and apply it.
    pub async fn process_next(&mut self) -> Option<ControllerEvent> {
        let result = self.rx.recv().await?;
        Some(self.apply(result))
    }

    fn apply(&mut self, result: TaskResult) -> ControllerEvent {
        match result {
            TaskResult::Apps(Ok(apps)) => {
                debug!(count = apps.len(), "Apps loaded");
                self.apps = apps;
                self.load_state = LoadState::Ready;
                ControllerEvent::AppsLoaded
            }
            TaskResult::Apps(Err(e)) => {
                error!(error = %e, "Failed to fetch apps");
                self.apps.clear();
                self.load_state = LoadState::Errored;
                self.notify(NotificationLevel::Error, LOAD_FAILED_MESSAGE);
                ControllerEvent::AppsFailed
            }
            TaskResult::Created(Ok(created)) => {
                info!(app_id = %created.id, "App created");
                self.notify(NotificationLevel::Success, CREATED_MESSAGE);
                self.refresh();
                self.form_state = FormState::Closed;
                self.form.reset();
                self.schedule_open_editor(created.id);
                ControllerEvent::AppCreated
            }
            TaskResult::Created(Err(e)) => {
                error!(error = %e, "Failed to create app");
                let message = match e.detail() {
                    Some(detail) => detail.to_string(),
                    None if e.has_json_body() => CREATE_FAILED_MESSAGE.to_string(),
                    // No response, or one that could not be read as JSON
                    None => CREATE_ERROR_MESSAGE.to_string(),
                };
                self.notify(NotificationLevel::Error, message);
                if self.form_state == FormState::Submitting {
                    self.form_state = FormState::Open;
                }
                ControllerEvent::CreateFailed
            }
            TaskResult::OpenEditor(app_id) => {
                self.open_editor(&app_id);
                ControllerEvent::EditorOpened
            }
        }
    }

    fn schedule_open_editor(&self, app_id: String) {
        let tx = self.tx.clone();
        let delay = self.open_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            Self::send_result(&tx, TaskResult::OpenEditor(app_id)).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::auth::MemoryCredentialStore;

    #[derive(Default)]
    struct RecordingLauncher {
        opened: Mutex<Vec<String>>,
    }

    impl Launcher for RecordingLauncher {
        fn open(&self, url: &str) -> anyhow::Result<()> {
            self.opened.lock().expect("launcher lock").push(url.to_string());
            Ok(())
        }
    }

    struct FailingLauncher;

    impl Launcher for FailingLauncher {
        fn open(&self, _url: &str) -> anyhow::Result<()> {
            anyhow::bail!("no browser")
        }
    }

    fn controller(launcher: Arc<dyn Launcher>) -> AppsController {
        let api = ApiClient::new("http://127.0.0.1:9", None).expect("build client");
        let credentials = Credentials::new(Arc::new(MemoryCredentialStore::new()));
        AppsController::new(api, credentials, PlatformLinks::new("http://localhost:3000"), launcher)
    }

    #[tokio::test]
    async fn test_initial_state() {
        let ctrl = controller(Arc::new(RecordingLauncher::default()));
        assert_eq!(ctrl.load_state(), LoadState::Idle);
        assert_eq!(ctrl.form_state(), FormState::Closed);
        assert!(ctrl.apps().is_empty());
        assert!(ctrl.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_blank_name_rejected_without_request() {
        let mut ctrl = controller(Arc::new(RecordingLauncher::default()));
        ctrl.open_form();
        ctrl.form_mut().name = "   ".to_string();

        assert_eq!(ctrl.submit(), Err(FormError::EmptyName));
        assert_eq!(ctrl.form_state(), FormState::Open);

        let notes = ctrl.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Error);
        assert_eq!(notes[0].message, "Please enter an app name");
        assert!(ctrl.drain_events().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_on_create() {
        let mut ctrl = controller(Arc::new(RecordingLauncher::default()));
        ctrl.open_form();
        ctrl.form_mut().name = "Test App".to_string();
        ctrl.submit().expect("valid form");
        assert!(ctrl.is_submitting());

        assert_eq!(ctrl.process_next().await, Some(ControllerEvent::CreateFailed));
        assert_eq!(ctrl.form_state(), FormState::Open);
        assert_eq!(ctrl.form().name, "Test App");
        assert_eq!(
            ctrl.take_notifications().last().map(|n| n.message.as_str()),
            Some(CREATE_ERROR_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_deep_links_use_launcher() {
        let launcher = Arc::new(RecordingLauncher::default());
        let mut ctrl = controller(launcher.clone());

        ctrl.open_editor("abc");
        ctrl.open_overview("abc");
        ctrl.open_platform_home();

        let opened = launcher.opened.lock().expect("launcher lock").clone();
        assert_eq!(
            opened,
            vec![
                "http://localhost:3000/app/abc/workflow".to_string(),
                "http://localhost:3000/app/abc/overview".to_string(),
                "http://localhost:3000".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_launcher_failure_notifies() {
        let mut ctrl = controller(Arc::new(FailingLauncher));
        ctrl.open_editor("abc");
        let notes = ctrl.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn test_close_form() {
        let mut ctrl = controller(Arc::new(RecordingLauncher::default()));
        ctrl.open_form();
        assert_eq!(ctrl.form_state(), FormState::Open);
        ctrl.close_form();
        assert_eq!(ctrl.form_state(), FormState::Closed);
    }
}
