use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Сущности нет, либо она намеренно скрыта (черновик по slug)
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("forbidden")]
    Forbidden,

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Forbidden => StatusCode::FORBIDDEN,
            CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CoreError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CoreError::Conflict(_) => StatusCode::CONFLICT,
            CoreError::Internal(_) | CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::Forbidden => "FORBIDDEN",
            CoreError::InvalidInput(_) => "INVALID_INPUT",
            CoreError::InvalidState(_) => "INVALID_STATE",
            CoreError::Conflict(_) => "CONFLICT",
            CoreError::Internal(_) | CoreError::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// Сообщение для клиента. Внутренние подробности наружу не уходят.
    pub fn public_message(&self) -> String {
        match self {
            CoreError::Internal(_) | CoreError::Store(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::InvalidInput(errors.to_string())
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            CoreError::Internal(_) | CoreError::Store(_) => error!(error = ?self, "request failed"),
            _ => warn!(error = %self, "request rejected"),
        }

        let body = json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": self.public_message(),
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_distinct_statuses() {
        assert_eq!(CoreError::NotFound("event").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(CoreError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            CoreError::InvalidInput("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CoreError::InvalidState("draft".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(CoreError::Conflict("dup".into()).status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn store_failures_are_not_echoed() {
        let err = CoreError::from(StoreError::Unavailable("pg at 10.0.0.3 refused".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "internal server error");
        assert!(!err.public_message().contains("10.0.0.3"));
    }
}
