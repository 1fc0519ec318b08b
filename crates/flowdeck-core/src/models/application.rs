//! Workflow platform application models.
//!
//! These mirror the resources owned by the backend. The client only ever
//! holds a read-only snapshot that is replaced on every list refresh.

use serde::{Deserialize, Serialize};

use crate::utils::format::{format_date, short_id};

/// Emoji icon sent with every create request.
pub const DEFAULT_ICON: &str = "🤖";

/// Icon background colour sent with every create request.
pub const DEFAULT_ICON_BACKGROUND: &str = "#3B82F6";

/// Application mode tag as reported by the platform.
///
/// Unrecognized tags are preserved verbatim so they can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppMode {
    Workflow,
    Chatbot,
    AdvancedChat,
    Other(String),
}

/// Visual category used when rendering a mode tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeBadge {
    Blue,
    Green,
    Purple,
    Generic,
}

impl AppMode {
    pub fn as_str(&self) -> &str {
        match self {
            AppMode::Workflow => "workflow",
            AppMode::Chatbot => "chatbot",
            AppMode::AdvancedChat => "advanced-chat",
            AppMode::Other(raw) => raw,
        }
    }

    /// Human readable label; unknown modes show the raw tag.
    pub fn label(&self) -> &str {
        match self {
            AppMode::Workflow => "Workflow",
            AppMode::Chatbot => "Chatbot",
            AppMode::AdvancedChat => "Advanced Chat",
            AppMode::Other(raw) => raw,
        }
    }

    pub fn badge(&self) -> ModeBadge {
        match self {
            AppMode::Workflow => ModeBadge::Blue,
            AppMode::Chatbot => ModeBadge::Green,
            AppMode::AdvancedChat => ModeBadge::Purple,
            AppMode::Other(_) => ModeBadge::Generic,
        }
    }
}

impl From<String> for AppMode {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "workflow" => AppMode::Workflow,
            "chatbot" => AppMode::Chatbot,
            "advanced-chat" => AppMode::AdvancedChat,
            _ => AppMode::Other(raw),
        }
    }
}

impl From<AppMode> for String {
    fn from(mode: AppMode) -> Self {
        match mode {
            AppMode::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl Default for AppMode {
    fn default() -> Self {
        AppMode::Other(String::new())
    }
}

/// An application hosted on the external workflow platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteApplication {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub mode: AppMode,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl RemoteApplication {
    /// Description for display, with a placeholder when empty.
    pub fn description_display(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => "No description",
        }
    }

    pub fn short_id(&self) -> String {
        short_id(&self.id)
    }

    pub fn created_display(&self) -> String {
        self.created_at.as_deref().map(format_date).unwrap_or_else(|| "-".to_string())
    }

    pub fn updated_display(&self) -> String {
        self.updated_at.as_deref().map(format_date).unwrap_or_else(|| "-".to_string())
    }
}

/// Response body of the application collection endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppsResponse {
    #[serde(default)]
    pub apps: Option<Vec<RemoteApplication>>,
}

impl AppsResponse {
    /// A missing or null `apps` field is an empty collection.
    pub fn into_apps(self) -> Vec<RemoteApplication> {
        self.apps.unwrap_or_default()
    }
}

/// Modes that can be chosen when creating an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreateMode {
    #[default]
    Workflow,
    Chatbot,
}

impl CreateMode {
    pub fn label(&self) -> &'static str {
        match self {
            CreateMode::Workflow => "Workflow",
            CreateMode::Chatbot => "Chatbot",
        }
    }

    /// Cycle to the other mode (used by the form selector).
    pub fn toggle(&self) -> Self {
        match self {
            CreateMode::Workflow => CreateMode::Chatbot,
            CreateMode::Chatbot => CreateMode::Workflow,
        }
    }
}

/// Body of the application create request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateAppRequest {
    pub name: String,
    pub description: String,
    pub mode: CreateMode,
    pub icon: String,
    pub icon_background: String,
}

impl CreateAppRequest {
    pub fn new(name: impl Into<String>, description: impl Into<String>, mode: CreateMode) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            mode,
            icon: DEFAULT_ICON.to_string(),
            icon_background: DEFAULT_ICON_BACKGROUND.to_string(),
        }
    }
}

/// Response body of a successful create request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedApp {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}
