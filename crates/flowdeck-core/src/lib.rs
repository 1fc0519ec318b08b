//! Core library for flowdeck.
//!
//! A dashboard client for a backend that fronts an external workflow
//! platform: it validates the stored session, lists and creates platform
//! applications, and deep-links into the platform's own editor.

pub mod api;
pub mod auth;
pub mod config;
pub mod links;
pub mod models;
pub mod utils;
pub mod workflow;

pub use api::{ApiClient, ApiError};
pub use auth::{Credentials, GuardEvent, GuardMount, Route, SessionGuard};
pub use config::{Config, Settings};
pub use links::{Launcher, LinkTarget, PlatformLinks, SystemLauncher};
pub use workflow::AppsController;
