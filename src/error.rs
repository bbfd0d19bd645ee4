use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::catalog::LookupError;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Nothing in the pricing dataset answers the query
    #[error("Not found: {0}")]
    NotFound(String),
    /// Request parameters violate the endpoint contract
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::NotFound(_) => "not_found",
        AppError::BadRequest(_) => "bad_request",
    }
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        Self::NotFound(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AppError::NotFound("n2-standard-4".to_string());
        assert_eq!(error.to_string(), "Not found: n2-standard-4");
    }

    #[test]
    fn test_error_type_name() {
        assert_eq!(error_type_name(&AppError::NotFound("test".to_string())), "not_found");
        assert_eq!(error_type_name(&AppError::BadRequest("test".to_string())), "bad_request");
    }

    #[test]
    fn test_lookup_error_maps_to_not_found() {
        let error: AppError = LookupError::TypeNotFound.into();
        match error {
            AppError::NotFound(msg) => assert_eq!(msg, "Table with specified CPU type not found"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_response() {
        let error = AppError::NotFound("Price not found".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
