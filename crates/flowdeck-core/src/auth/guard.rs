//! Session guard for protected views.
//!
//! Mounting the guard never blocks rendering. A missing token redirects
//! immediately; a present token is verified by a background task which, on
//! failure, purges the store and asks the host to redirect. That redirect can
//! arrive after the protected view has already been drawn. A check that
//! finishes after the stored token was replaced leaves the newer session
//! alone.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::api::ApiClient;

use super::session::Credentials;

/// Views the host can navigate between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Unauthenticated entry point
    Login,
    /// Protected dashboard
    Dashboard,
}

/// Message sent from the background identity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardEvent {
    /// The stored session was rejected and has been purged
    Redirect { route: Route, reason: String },
}

/// Result of mounting the guard.
#[derive(Debug)]
pub enum GuardMount {
    /// No token stored; navigate now. No request was made.
    Redirect(Route),
    /// Children may render; the identity check runs on this task.
    Verifying(JoinHandle<()>),
}

impl GuardMount {
    pub fn is_redirect(&self) -> bool {
        matches!(self, GuardMount::Redirect(_))
    }
}

pub struct SessionGuard {
    credentials: Credentials,
    api: ApiClient,
    tx: mpsc::Sender<GuardEvent>,
}

impl SessionGuard {
    pub fn new(credentials: Credentials, api: ApiClient, tx: mpsc::Sender<GuardEvent>) -> Self {
        Self { credentials, api, tx }
    }

    /// Check the stored session once for this mount of the protected subtree.
    pub fn mount(&self) -> GuardMount {
        let Some(token) = self.credentials.token() else {
            debug!("No stored token, redirecting to login");
            return GuardMount::Redirect(Route::Login);
        };

        let api = self.api.with_token(token.clone());
        let credentials = self.credentials.clone();
        let tx = self.tx.clone();

        GuardMount::Verifying(tokio::spawn(async move {
            Self::verify(api, token, credentials, tx).await;
        }))
    }

    async fn verify(api: ApiClient, token: String, credentials: Credentials, tx: mpsc::Sender<GuardEvent>) {
        let reason = match api.fetch_me().await {
            Ok(_) => {
                debug!("Session verified");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Session check failed");
                e.to_string()
            }
        };

        if credentials.token().as_deref() != Some(token.as_str()) {
            debug!("Stored token changed during session check, ignoring result");
            return;
        }

        if let Err(e) = credentials.purge() {
            error!(error = %e, "Failed to purge stored credentials");
        }

        let event = GuardEvent::Redirect {
            route: Route::Login,
            reason,
        };
        if tx.send(event).await.is_err() {
            debug!("Guard host dropped before session check finished");
        }
    }
}
