use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use palaver_types::api::ErrorBody;
use palaver_types::error::ChatError;

/// HTTP face of `ChatError`.
#[derive(Debug)]
pub struct ApiError(pub ChatError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ChatError::InvalidInput(_) | ChatError::Unauthorized(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ChatError::Conflict(_) => StatusCode::CONFLICT,
            ChatError::Forbidden => StatusCode::UNAUTHORIZED,
            ChatError::NotFound(_) => StatusCode::NOT_FOUND,
            ChatError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        Self(err)
    }
}

/// Malformed JSON, a wrong field type or an unknown field.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ChatError::invalid(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.0 {
            ChatError::Store(e) => {
                // Backend detail stays in the logs
                error!("Store failure: {:#}", e);
                ErrorBody {
                    error: "internal server error".into(),
                    details: vec![],
                }
            }
            ChatError::InvalidInput(errors) => ErrorBody {
                error: "invalid input".into(),
                details: errors.0,
            },
            other => ErrorBody {
                error: other.to_string(),
                details: vec![],
            },
        };

        (status, Json(body)).into_response()
    }
}
