use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The main error type for ledgerdesk operations
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A user-facing validation failure. The message is shown verbatim.
    #[error("{0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Export error: {0}")]
    Export(#[from] csv::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Error body returned by the HTTP layer.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
    error_id: String,
}

impl DeskError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) | Self::Export(_) | Self::Anyhow(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Check if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Message suitable for clients.
    ///
    /// Server errors are replaced by a generic message; details stay in the logs.
    fn safe_message(&self) -> String {
        match self {
            Self::NotFound(_)
            | Self::BadRequest(_)
            | Self::Validation(_)
            | Self::Conflict(_)
            | Self::Unavailable(_) => self.to_string(),
            Self::Internal(_) | Self::Export(_) | Self::Anyhow(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for DeskError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "Request failed"
            );
        } else {
            tracing::debug!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "Request rejected"
            );
        }

        let body = Json(ErrorResponse {
            error: self.safe_message(),
            error_id,
        });
        (status, body).into_response()
    }
}

/// Result type alias for ledgerdesk operations
pub type Result<T> = std::result::Result<T, DeskError>;

impl From<serde_json::Error> for DeskError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            DeskError::BadRequest(format!("JSON error: {}", err))
        } else {
            DeskError::Internal(format!("JSON serialization error: {}", err))
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for DeskError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        DeskError::Internal("lock poisoned".to_string())
    }
}
