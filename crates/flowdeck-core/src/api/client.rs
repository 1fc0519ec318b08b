//! API client for the dashboard backend.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests against the backend that fronts the workflow platform.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::models::{AppsResponse, CreateAppRequest, CreatedApp, RemoteApplication, UserRecord};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Identity check endpoint
const ME_PATH: &str = "/api/auth/me";

/// Application collection endpoint (GET lists, POST creates)
const APPS_PATH: &str = "/api/dify/apps";

/// API client for the dashboard backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    token: Option<Arc<str>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// `timeout` of `None` leaves requests without a deadline; failures are
    /// then only detected through transport errors or status codes.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            token: None,
        })
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: impl Into<Arc<str>>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: Arc::clone(&self.base_url),
            token: Some(token.into()),
        }
    }

    /// Copy of this client carrying `token` if one is available, none otherwise.
    pub fn with_optional_token(&self, token: Option<String>) -> Self {
        match token {
            Some(token) => self.with_token(token),
            None => Self {
                client: self.client.clone(),
                base_url: Arc::clone(&self.base_url),
                token: None,
            },
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Read the body and decode it, reporting malformed JSON as `InvalidResponse`.
    async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{} from {}", e, url)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::decode(response, &url).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::decode(response, &url).await
    }

    // ===== Identity =====

    /// Validate the bearer token and return the identity behind it.
    pub async fn fetch_me(&self) -> Result<UserRecord, ApiError> {
        self.get(ME_PATH).await
    }

    // ===== Applications =====

    /// Fetch every application visible to the current user.
    pub async fn fetch_apps(&self) -> Result<Vec<RemoteApplication>, ApiError> {
        let response: AppsResponse = self.get(APPS_PATH).await?;
        let apps = response.into_apps();
        debug!(count = apps.len(), "Fetched applications");
        Ok(apps)
    }

    /// Fetch a single application by identifier.
    pub async fn fetch_app(&self, app_id: &str) -> Result<RemoteApplication, ApiError> {
        self.get(&format!("{}/{}", APPS_PATH, app_id)).await
    }

    /// Run an application with the given inputs.
    ///
    /// `inputs` is the request body itself; the backend wraps it for the
    /// platform and returns the platform's run result unchanged.
    pub async fn run_app(&self, app_id: &str, inputs: &serde_json::Value) -> Result<serde_json::Value, ApiError> {
        let result = self.post(&format!("{}/{}/run", APPS_PATH, app_id), inputs).await?;
        debug!(app_id = app_id, "Ran application");
        Ok(result)
    }

    /// Create an application on the platform.
    pub async fn create_app(&self, request: &CreateAppRequest) -> Result<CreatedApp, ApiError> {
        let created: CreatedApp = self.post(APPS_PATH, request).await?;
        debug!(app_id = %created.id, "Created application");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8000/", None).expect("build client");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url(APPS_PATH), "http://localhost:8000/api/dify/apps");
    }

    #[test]
    fn test_auth_headers() {
        let client = ApiClient::new("http://localhost:8000", None).expect("build client");
        assert!(client.auth_headers().expect("headers").is_empty());

        let authed = client.with_token("secret-token");
        let headers = authed.auth_headers().expect("headers");
        assert_eq!(
            headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer secret-token")
        );

        assert!(client.with_token("bad\ntoken").auth_headers().is_err());
        assert!(client.with_optional_token(None).auth_headers().expect("headers").is_empty());
    }
}
