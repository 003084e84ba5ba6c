use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Unauthorized - access token rejected")]
    Unauthorized,

    #[error("Session expired - please sign in again")]
    SessionExpired,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Credential storage error: {0}")]
    Storage(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Shape of the backend's JSON error envelope, when it sends one
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "error")]
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data.
    /// The cut lands on a char boundary so multi-byte bodies cannot panic.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..cut],
            body.len()
        )
    }

    /// Build an error from a non-success HTTP response.
    ///
    /// Prefers the backend's own `message`/`error` field when the body is the
    /// usual JSON envelope, falling back to the raw (truncated) body.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        if status.as_u16() == 401 {
            return ApiError::Unauthorized;
        }

        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    "request failed".to_string()
                } else {
                    Self::truncate_body(body)
                }
            });

        ApiError::Backend {
            status: status.as_u16(),
            message,
        }
    }

    /// True when the error means the session is gone and the UI must
    /// return to the unauthenticated flow.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }
}
