use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::{
    response::{ApiResponse, Payload},
    users::repo::RepoError,
};

/// Failures a handler can answer with. The store's own error text is logged,
/// never sent to the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("user not found")]
    NotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("resource not found")]
    NoRoute,
    #[error(transparent)]
    Storage(RepoError),
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound => ApiError::NotFound,
            other => ApiError::Storage(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::NoRoute => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(msg) => *msg,
            ApiError::NotFound => "user not found",
            ApiError::MethodNotAllowed => "method not allowed",
            ApiError::NoRoute => "resource not found",
            ApiError::Storage(RepoError::DuplicateEmail(_)) => "email already exists",
            ApiError::Storage(_) => "internal storage error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage(inner) = &self {
            error!(error = ?inner, "storage failure");
        }
        ApiResponse::new(self.status(), self.public_message(), Payload::None).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_errors_map_structurally() {
        assert!(matches!(ApiError::from(RepoError::NotFound), ApiError::NotFound));
        let storage = ApiError::from(RepoError::Storage(sqlx::Error::PoolTimedOut));
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(storage.public_message(), "internal storage error");
    }

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(ApiError::InvalidInput("bad").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn storage_message_hides_driver_text() {
        let resp = ApiError::from(RepoError::Storage(sqlx::Error::Protocol(
            "secret driver detail".into(),
        )));
        assert!(!resp.public_message().contains("secret"));
    }
}
