use serde::{Deserialize, Serialize};

/// Error code and description used when the upstream rejection carries none.
pub const DEFAULT_UPSTREAM_ERROR: &str = "token_exchange_failed";
pub const DEFAULT_UPSTREAM_ERROR_DESCRIPTION: &str = "Failed to exchange token";

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Subject token is required")]
    MissingSubjectToken,

    #[error("Server configuration is incomplete (missing: {})", .missing.join(", "))]
    Configuration { missing: Vec<&'static str> },

    #[error("Authorization server rejected the exchange with HTTP {status}: {error}")]
    UpstreamRejection { status: u16, error: String, error_description: String },

    #[error("Failed to reach the authorization server: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, RelayError>;

/// JSON error payload returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, error_description: impl Into<String>) -> Self {
        Self { error: error.into(), error_description: Some(error_description.into()) }
    }
}

impl RelayError {
    /// HTTP status the adapters answer with.
    ///
    /// Upstream rejections keep the upstream status; anything outside the
    /// valid HTTP range falls back to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::InvalidRequest(_) | RelayError::MissingSubjectToken => 400,
            RelayError::Configuration { .. } | RelayError::Transport(_) => 500,
            RelayError::UpstreamRejection { status, .. } => {
                if (100..=599).contains(status) {
                    *status
                } else {
                    500
                }
            }
        }
    }

    /// Caller-facing payload. Local details (missing variable names, transport
    /// errors) stay in the logs.
    pub fn body(&self) -> ErrorBody {
        match self {
            RelayError::InvalidRequest(detail) => ErrorBody::new("invalid_request", detail.clone()),
            RelayError::MissingSubjectToken => {
                ErrorBody::new("invalid_request", "Subject token is required")
            }
            RelayError::Configuration { .. } => {
                ErrorBody::new("server_configuration_error", "Server configuration is incomplete")
            }
            RelayError::UpstreamRejection { error, error_description, .. } => {
                ErrorBody::new(error.clone(), error_description.clone())
            }
            RelayError::Transport(_) => {
                ErrorBody::new("internal_error", "Failed to reach the authorization server")
            }
        }
    }
}
