//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use flowdeck_core::auth::{CredentialStore, Credentials, MemoryCredentialStore};
use flowdeck_core::links::Launcher;
use flowdeck_core::ApiClient;

pub const TOKEN: &str = "test-token";
pub const PLATFORM_URL: &str = "http://dify.test";

/// Launcher that records every URL instead of opening it.
#[derive(Default)]
pub struct RecordingLauncher {
    opened: Mutex<Vec<String>>,
}

impl RecordingLauncher {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().expect("launcher lock").clone()
    }
}

impl Launcher for RecordingLauncher {
    fn open(&self, url: &str) -> anyhow::Result<()> {
        self.opened.lock().expect("launcher lock").push(url.to_string());
        Ok(())
    }
}

pub fn api(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, None).expect("build client")
}

/// Store holding a token and a cached user record.
pub fn signed_in_store() -> Arc<MemoryCredentialStore> {
    let store = Arc::new(MemoryCredentialStore::new());
    store.set("token", TOKEN).expect("set token");
    store.set("user", r#"{"username":"admin"}"#).expect("set user");
    store
}

pub fn credentials(store: &Arc<MemoryCredentialStore>) -> Credentials {
    Credentials::new(store.clone())
}

pub fn bearer() -> String {
    format!("Bearer {}", TOKEN)
}
