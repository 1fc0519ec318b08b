use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed with status {status}: {}", .detail.as_deref().unwrap_or(.body))]
    Status {
        status: StatusCode,
        detail: Option<String>,
        body: String,
        /// Whether the body parsed as JSON at all
        json_body: bool,
    },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid bearer token: {0}")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shape returned by the backend (`{"detail": "..."}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    /// Only string `detail` values are surfaced; structured ones (validation
    /// error lists) fall back to the caller's generic message.
    fn parse_detail(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        match parsed.detail? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        ApiError::Status {
            status,
            detail: Self::parse_detail(body),
            body: Self::truncate_body(body),
            json_body: serde_json::from_str::<serde_json::Value>(body).is_ok(),
        }
    }

    /// Server-provided `detail` message, if the failure carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::NetworkError(_))
    }

    /// True when the server answered with a JSON body, whatever its status.
    ///
    /// Transport failures, undecodable success bodies and non-JSON error
    /// pages (proxy HTML, plain text) are all false.
    pub fn has_json_body(&self) -> bool {
        matches!(self, ApiError::Status { json_body: true, .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN))
    }
}
