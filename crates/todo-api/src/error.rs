use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use domain::TodoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Todo(#[from] TodoError),

    #[error("Could not validate credentials")]
    Unauthorized,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Todo(TodoError::validation(message))
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Todo(TodoError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "ToDo not found".to_string())
            }
            ApiError::Todo(TodoError::Forbidden) => {
                (StatusCode::FORBIDDEN, "Not enough permissions".to_string())
            }
            ApiError::Todo(TodoError::Validation(message)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, message.clone())
            }
            ApiError::Todo(TodoError::Store(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }

        let body = Json(serde_json::json!({ "error": message }));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
