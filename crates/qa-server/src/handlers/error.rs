//! Error responses: one plain-text line plus a status code

use crate::router::RouteError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use qa_core::QaError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<QaError> for ApiError {
    fn from(err: QaError) -> Self {
        match err {
            QaError::NotFound(_) => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
            QaError::ValidationFailed(message) => ApiError::new(StatusCode::BAD_REQUEST, message),
            QaError::MethodNotAllowed => {
                ApiError::new(StatusCode::METHOD_NOT_ALLOWED, err.to_string())
            }
            // Details were logged where they happened
            QaError::StorageFailure(_) => ApiError::internal(),
        }
    }
}

impl From<RouteError> for ApiError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::InvalidIdentifier(_) => QaError::validation(err.to_string()).into(),
            RouteError::MethodNotAllowed => QaError::MethodNotAllowed.into(),
            RouteError::NoRoute => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
        }
    }
}
