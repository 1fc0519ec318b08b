use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::UserRecord;

use super::store::CredentialStore;

/// Store key holding the bearer token
pub const TOKEN_KEY: &str = "token";

/// Store key holding the serialized identity record
pub const USER_KEY: &str = "user";

/// Typed view over the shared credential store.
///
/// Clone is cheap; every clone reads and writes the same store.
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn CredentialStore>,
}

impl Credentials {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// The stored bearer token. Unreadable storage counts as no token.
    pub fn token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read stored token");
                None
            }
        }
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    /// The cached identity record, if present and readable.
    pub fn user(&self) -> Option<UserRecord> {
        let raw = match self.store.get(USER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read stored user record");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Stored user record is malformed");
                None
            }
        }
    }

    /// Persist a freshly accepted token and its identity record.
    pub fn save(&self, token: &str, user: &UserRecord) -> Result<()> {
        let user_json = serde_json::to_string(user).context("Failed to serialize user record")?;
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(USER_KEY, &user_json)?;
        Ok(())
    }

    /// Remove the token and the identity record.
    pub fn purge(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        Ok(())
    }
}

/// Verify `token` against the identity endpoint and store it on success.
///
/// Nothing is written when the backend rejects the token.
pub async fn login(api: &ApiClient, credentials: &Credentials, token: &str) -> Result<UserRecord> {
    let token = token.trim();
    if token.is_empty() {
        anyhow::bail!("Token required");
    }

    let user = api
        .with_token(token)
        .fetch_me()
        .await
        .map_err(login_error)?;

    credentials.save(token, &user)?;
    info!(user = %user.display_name(), "Login successful");
    Ok(user)
}

/// Forget the stored session.
pub fn logout(credentials: &Credentials) -> Result<()> {
    credentials.purge()?;
    info!("Logged out");
    Ok(())
}

fn login_error(e: ApiError) -> anyhow::Error {
    if e.is_unauthorized() {
        anyhow::anyhow!("Token rejected by the server")
    } else if e.is_transport() {
        anyhow::Error::new(e).context("Unable to reach the server")
    } else {
        anyhow::Error::new(e).context("Login failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryCredentialStore;

    fn credentials() -> (Arc<MemoryCredentialStore>, Credentials) {
        let store = Arc::new(MemoryCredentialStore::new());
        let creds = Credentials::new(store.clone());
        (store, creds)
    }

    #[test]
    fn test_save_and_purge() {
        let (store, creds) = credentials();
        assert!(!creds.has_token());

        let user = UserRecord {
            username: Some("ops".to_string()),
            ..Default::default()
        };
        creds.save("abc", &user).expect("save");
        assert_eq!(creds.token().as_deref(), Some("abc"));
        assert_eq!(creds.user(), Some(user));

        creds.purge().expect("purge");
        assert!(store.is_empty());
        assert_eq!(creds.user(), None);
    }

    #[test]
    fn test_empty_token_counts_as_absent() {
        let (store, creds) = credentials();
        store.set(TOKEN_KEY, "").expect("set");
        assert!(!creds.has_token());
    }

    #[test]
    fn test_malformed_user_record_ignored() {
        let (store, creds) = credentials();
        store.set(USER_KEY, "{not json").expect("set");
        assert_eq!(creds.user(), None);
    }

    #[tokio::test]
    async fn test_login_rejects_blank_token() {
        let (store, creds) = credentials();
        let api = ApiClient::new("http://127.0.0.1:9", None).expect("build client");
        assert!(login(&api, &creds, "   ").await.is_err());
        assert!(store.is_empty());
    }
}
