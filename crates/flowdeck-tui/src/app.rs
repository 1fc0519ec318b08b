//! Application state management for flowdeck.
//!
//! This module contains the `App` struct that owns UI state, the session
//! guard and the applications controller, and routes background results
//! from both into the view.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use flowdeck_core::auth::{self, Credentials, GuardEvent, GuardMount, Route, SessionGuard};
use flowdeck_core::links::{Launcher, PlatformLinks};
use flowdeck_core::models::{RemoteApplication, UserRecord};
use flowdeck_core::workflow::{AppsController, FormState, LoadState, Notification, NotificationLevel};
use flowdeck_core::{ApiClient, Settings};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the session guard and login channels.
const CHANNEL_BUFFER_SIZE: usize = 4;

/// Maximum length for token input.
const MAX_TOKEN_LENGTH: usize = 512;

/// Number of items to move on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    LoggingIn,
    CreatingApp,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Create form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Name,
    Description,
    Mode,
    Submit,
}

impl FormFocus {
    pub fn next(&self) -> Self {
        match self {
            FormFocus::Name => FormFocus::Description,
            FormFocus::Description => FormFocus::Mode,
            FormFocus::Mode => FormFocus::Submit,
            FormFocus::Submit => FormFocus::Name,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormFocus::Name => FormFocus::Submit,
            FormFocus::Description => FormFocus::Name,
            FormFocus::Mode => FormFocus::Description,
            FormFocus::Submit => FormFocus::Mode,
        }
    }
}

/// Outcome of a login attempt, reported by its background task.
type LoginResult = Result<UserRecord, String>;

/// Check if a character should be accepted in the token field
pub fn can_add_token_char(current_len: usize, c: char) -> bool {
    current_len < MAX_TOKEN_LENGTH && !c.is_control() && !c.is_whitespace()
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub settings: Settings,
    pub credentials: Credentials,
    pub api: ApiClient,
    links: PlatformLinks,
    launcher: Arc<dyn Launcher>,
    guard: SessionGuard,
    guard_rx: mpsc::Receiver<GuardEvent>,
    login_tx: mpsc::Sender<LoginResult>,
    login_rx: mpsc::Receiver<LoginResult>,

    /// Present only while the dashboard is mounted.
    pub controller: Option<AppsController>,

    // UI State
    pub state: AppState,
    pub route: Route,
    pub selection: usize,
    pub form_focus: FormFocus,
    pub status_message: Option<Notification>,
    pub user: Option<UserRecord>,

    // Login form state
    pub login_token: String,
    pub login_error: Option<String>,
    pub login_pending: bool,
}

impl App {
    pub fn new(settings: Settings, credentials: Credentials, launcher: Arc<dyn Launcher>) -> Result<Self> {
        let api = ApiClient::new(&settings.api_base_url, settings.request_timeout)?;
        let links = PlatformLinks::new(&settings.platform_url);
        let (tx, guard_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let guard = SessionGuard::new(credentials.clone(), api.clone(), tx);
        let (login_tx, login_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            settings,
            credentials,
            api,
            links,
            launcher,
            guard,
            guard_rx,
            login_tx,
            login_rx,
            controller: None,
            state: AppState::Normal,
            route: Route::Login,
            selection: 0,
            form_focus: FormFocus::Name,
            status_message: None,
            user: None,
            login_token: String::new(),
            login_error: None,
            login_pending: false,
        })
    }

    // =========================================================================
    // Routing
    // =========================================================================

    /// Mount the protected dashboard behind the session guard.
    ///
    /// With no stored token this lands on the login view without any
    /// request. Otherwise the dashboard renders immediately while the
    /// token is verified in the background.
    pub fn mount_dashboard(&mut self) {
        match self.guard.mount() {
            GuardMount::Redirect(_) => self.start_login(None),
            GuardMount::Verifying(_) => {
                let mut controller = AppsController::new(
                    self.api.clone(),
                    self.credentials.clone(),
                    self.links.clone(),
                    Arc::clone(&self.launcher),
                )
                .with_open_delay(self.settings.open_delay);
                controller.mount();

                self.controller = Some(controller);
                self.user = self.credentials.user();
                self.route = Route::Dashboard;
                self.state = AppState::Normal;
                self.selection = 0;
            }
        }
    }

    /// Unmount the dashboard and show the login view.
    pub fn start_login(&mut self, error: Option<String>) {
        self.controller = None;
        self.user = None;
        self.route = Route::Login;
        self.state = AppState::LoggingIn;
        self.login_error = error;
    }

    /// Verify the entered token in the background.
    ///
    /// The result arrives through `check_background_tasks`; a second attempt
    /// is ignored while one is pending.
    pub fn attempt_login(&mut self) {
        if self.login_pending {
            return;
        }
        self.login_pending = true;
        self.login_error = None;

        let api = self.api.clone();
        let credentials = self.credentials.clone();
        let token = self.login_token.clone();
        let tx = self.login_tx.clone();

        tokio::spawn(async move {
            let result = auth::login(&api, &credentials, &token)
                .await
                .map_err(|e| e.to_string());
            if tx.send(result).await.is_err() {
                debug!("App closed before login finished");
            }
        });
    }

    fn finish_login(&mut self, result: LoginResult) {
        self.login_pending = false;
        match result {
            Ok(user) => {
                info!(user = %user.display_name(), "Logged in");
                self.login_token.clear();
                self.login_error = None;
                self.mount_dashboard();
            }
            Err(e) => self.login_error = Some(e),
        }
    }

    pub fn logout(&mut self) {
        if let Err(e) = auth::logout(&self.credentials) {
            warn!(error = %e, "Failed to clear stored credentials");
        }
        self.status_message = None;
        self.start_login(None);
    }

    // =========================================================================
    // Background results
    // =========================================================================

    /// Apply results from the session guard and the controller.
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.login_rx.try_recv() {
            self.finish_login(result);
        }

        while let Ok(event) = self.guard_rx.try_recv() {
            match event {
                GuardEvent::Redirect { route: Route::Login, reason } => {
                    warn!(reason = %reason, "Session rejected");
                    self.start_login(Some("Session expired. Please log in again.".to_string()));
                }
                GuardEvent::Redirect { route: Route::Dashboard, .. } => self.mount_dashboard(),
            }
        }

        let Some(controller) = self.controller.as_mut() else {
            return;
        };

        controller.drain_events();
        if let Some(latest) = controller.take_notifications().pop() {
            self.status_message = Some(latest);
        }

        // Form closed by a successful create
        if self.state == AppState::CreatingApp && controller.form_state() == FormState::Closed {
            self.state = AppState::Normal;
        }

        let count = controller.apps().len();
        if self.selection >= count {
            self.selection = count.saturating_sub(1);
        }
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    pub fn apps(&self) -> &[RemoteApplication] {
        self.controller.as_ref().map(|c| c.apps()).unwrap_or_default()
    }

    pub fn selected_app(&self) -> Option<&RemoteApplication> {
        self.apps().get(self.selection)
    }

    pub fn is_loading(&self) -> bool {
        self.controller
            .as_ref()
            .is_some_and(|c| c.load_state() == LoadState::Loading)
    }

    pub fn is_submitting(&self) -> bool {
        self.controller.as_ref().is_some_and(|c| c.is_submitting())
    }

    pub fn links(&self) -> &PlatformLinks {
        &self.links
    }

    pub fn select_next(&mut self, step: usize) {
        let last = self.apps().len().saturating_sub(1);
        self.selection = (self.selection + step).min(last);
    }

    pub fn select_prev(&mut self, step: usize) {
        self.selection = self.selection.saturating_sub(step);
    }

    pub fn select_last(&mut self) {
        self.selection = self.apps().len().saturating_sub(1);
    }

    pub fn refresh(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.refresh();
            self.status_message = Some(Notification {
                level: NotificationLevel::Info,
                message: "Refreshing...".to_string(),
            });
        }
    }

    pub fn open_selected_editor(&mut self) {
        let Some(id) = self.selected_app().map(|a| a.id.clone()) else {
            return;
        };
        if let Some(controller) = self.controller.as_mut() {
            controller.open_editor(&id);
        }
        self.collect_notifications();
    }

    pub fn open_selected_overview(&mut self) {
        let Some(id) = self.selected_app().map(|a| a.id.clone()) else {
            return;
        };
        if let Some(controller) = self.controller.as_mut() {
            controller.open_overview(&id);
        }
        self.collect_notifications();
    }

    pub fn open_platform_home(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.open_platform_home();
        }
        self.collect_notifications();
    }

    // =========================================================================
    // Create form
    // =========================================================================

    pub fn start_create(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.open_form();
            self.form_focus = FormFocus::Name;
            self.state = AppState::CreatingApp;
        }
    }

    pub fn cancel_create(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.close_form();
        }
        self.state = AppState::Normal;
    }

    pub fn submit_create(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            if controller.submit().is_err() {
                self.form_focus = FormFocus::Name;
            }
        }
        self.collect_notifications();
    }

    fn collect_notifications(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            if let Some(latest) = controller.take_notifications().pop() {
                self.status_message = Some(latest);
            }
        }
    }
}
