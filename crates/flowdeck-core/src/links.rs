//! Deep links into the external workflow platform.
//!
//! URLs are built by plain concatenation; identifiers are not validated or
//! escaped. Opening a link hands it to the operating system, which shows it
//! in a new browser tab or window.

use std::process::Command;

use anyhow::{Context, Result};

/// Page of an application on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    /// Workflow editor
    Editor,
    /// Overview / configuration page
    Overview,
}

impl LinkTarget {
    fn path_segment(&self) -> &'static str {
        match self {
            LinkTarget::Editor => "workflow",
            LinkTarget::Overview => "overview",
        }
    }
}

/// URL builder for the platform's web UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformLinks {
    base_url: String,
}

impl PlatformLinks {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.strip_suffix('/').unwrap_or(base_url).to_string(),
        }
    }

    /// Platform home page.
    pub fn home(&self) -> String {
        self.base_url.clone()
    }

    pub fn app(&self, app_id: &str, target: LinkTarget) -> String {
        format!("{}/app/{}/{}", self.base_url, app_id, target.path_segment())
    }

    pub fn editor(&self, app_id: &str) -> String {
        self.app(app_id, LinkTarget::Editor)
    }

    pub fn overview(&self, app_id: &str) -> String {
        self.app(app_id, LinkTarget::Overview)
    }
}

/// Opens URLs outside this process.
pub trait Launcher: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// Launcher using the operating system's default URL handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn open(&self, url: &str) -> Result<()> {
        #[cfg(target_os = "macos")]
        let mut command = {
            let mut c = Command::new("open");
            c.arg(url);
            c
        };

        #[cfg(target_os = "windows")]
        let mut command = {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", "", url]);
            c
        };

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let mut command = {
            let mut c = Command::new("xdg-open");
            c.arg(url);
            c
        };

        command
            .spawn()
            .with_context(|| format!("Failed to open {}", url))?;
        Ok(())
    }
}
