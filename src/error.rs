use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::jikan::UpstreamError;

/// Errors surfaced to API callers as `{"error": {"code", "message"}}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// Maps an upstream failure. `not_found` is the message used when the
    /// upstream answered 404.
    pub fn from_upstream(error: UpstreamError, not_found: &str) -> Self {
        match error {
            UpstreamError::Status { status: 404, .. } => Self::NotFound(not_found.to_string()),
            UpstreamError::Status { status, body } => Self::Upstream {
                status,
                message: body,
            },
            UpstreamError::Transport(e) => Self::Network(e.to_string()),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Upstream { .. } => "UPSTREAM_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Network(_) => StatusCode::BAD_GATEWAY,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use serde_json::Value;

    use super::*;

    #[test]
    fn test_upstream_404_becomes_not_found() {
        let error = ApiError::from_upstream(
            UpstreamError::Status {
                status: 404,
                body: r#"{"status":404,"message":"Resource does not exist"}"#.into(),
            },
            "Manga not found",
        );

        assert_eq!(error.code(), "NOT_FOUND");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.to_string(), "Manga not found");
    }

    #[test]
    fn test_other_statuses_are_propagated_with_body() {
        let error = ApiError::from_upstream(
            UpstreamError::Status {
                status: 429,
                body: "Too Many Requests".into(),
            },
            "Anime not found",
        );

        assert_eq!(error.code(), "UPSTREAM_ERROR");
        assert_eq!(error.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(error.to_string(), "Too Many Requests");
    }

    #[test]
    fn test_network_and_validation_statuses() {
        assert_eq!(
            ApiError::Network("connection refused".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Validation("limit must be between 1 and 25".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[actix_web::test]
    async fn test_error_body_shape() {
        let response = ApiError::Upstream {
            status: 500,
            message: "server error".into(),
        }
        .error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body()).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"error": {"code": "UPSTREAM_ERROR", "message": "server error"}})
        );
    }
}
