use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use huddle_common::MessageId;
use serde::Serialize;
use utoipa::ToSchema;

/// Failures raised by the chat components.
///
/// None of these are fatal: the gateway absorbs each one as a no-op, and only
/// `InvalidIdentity` is reported back to the offending connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("display name must not be empty")]
    InvalidIdentity,

    #[error("message body must be between 1 and {max} characters")]
    InvalidBody { max: usize },

    #[error("message {message_id} not found")]
    NotFound { message_id: MessageId },

    #[error("connection has not joined")]
    UnauthenticatedEvent,
}

impl ChatError {
    /// Stable machine-readable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentity => "INVALID_IDENTITY",
            Self::InvalidBody { .. } => "INVALID_BODY",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::UnauthenticatedEvent => "UNAUTHENTICATED",
        }
    }
}

/// Structured API error returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

/// HTTP-level error type that converts into a response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND".to_string(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: ApiErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::NotFound { .. } => Self::not_found(err.to_string()),
            ChatError::InvalidIdentity
            | ChatError::InvalidBody { .. }
            | ChatError::UnauthenticatedEvent => Self {
                status: StatusCode::BAD_REQUEST,
                code: err.code().to_string(),
                message: err.to_string(),
            },
        }
    }
}
