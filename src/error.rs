//! Error Handling Module
//!
//! Provides type-safe error handling with proper HTTP status code mapping.
//! Uses thiserror for domain errors and integrates with tracing for structured logging.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::types::FieldErrors;

/// API 에러 타입
///
/// 각 에러 variant는 HTTP 상태 코드에 매핑됨.
/// 내부 오류(5xx)의 상세 내용은 로그에만 남기고 클라이언트에는 노출하지 않음
#[derive(Debug, Error)]
pub enum ApiError {
    // ============ 400 Bad Request ============
    #[error("Invalid request: {0}")]
    BadRequest(String),

    // ============ 401 Unauthorized ============
    /// `next`는 로그인 후 돌아갈 경로
    #[error("Authentication required")]
    Unauthorized { next: String },

    // ============ 404 Not Found ============
    #[error("Resource not found: {0}")]
    NotFound(String),

    // ============ 422 Unprocessable Entity ============
    #[error("Validation failed")]
    Form(FieldErrors),

    // ============ 500 Internal Server Error ============
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    InternalError,
}

/// API 에러 응답 구조
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    /// 폼 필드별 에러 메시지
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_url: Option<String>,
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        ApiError::NotFound(resource.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::Unauthorized { .. } => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            ApiError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{} not found", resource),
            ),
            ApiError::Form(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                "Validation failed".to_string(),
            ),
            ApiError::DatabaseError(_) => {
                tracing::error!("Database error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error occurred".to_string(),
                )
            }
            ApiError::InternalError => {
                tracing::error!("Internal error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let (fields, login_url) = match self {
            ApiError::Form(errors) => (Some(errors), None),
            ApiError::Unauthorized { next } => (None, Some(format!("/login/?next={}", next))),
            _ => (None, None),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            fields,
            login_url,
        };

        (status, Json(body)).into_response()
    }
}

const JSON_DATA_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// JSON 본문 거부 → 폼 에러 또는 400
///
/// 타입이 맞지 않는 필드는 `<field>: <serde message>` 형태로 들어온다.
/// 필드 경로가 없으면 `__all__`.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                let text = err.body_text();
                let detail = text.strip_prefix(JSON_DATA_PREFIX).unwrap_or(&text);
                let field = match detail.split_once(": ") {
                    Some((path, _)) if !path.is_empty() && path != "." && !path.contains(' ') => path,
                    _ => FieldErrors::NON_FIELD,
                };

                let mut errors = FieldErrors::default();
                errors.add(field, "Enter a valid value.");
                ApiError::Form(errors)
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

/// SQLx 에러를 ApiError로 변환
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("SQLx error: {:?}", err);
        ApiError::DatabaseError(err.to_string())
    }
}

/// anyhow 에러를 ApiError로 변환
///
/// Repository 계층은 anyhow::Result를 반환하므로 DB 오류도 이 경로로 들어온다.
/// 원인이 sqlx 에러면 `DatabaseError`로 분류
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<sqlx::Error>() {
            Ok(db_err) => db_err.into(),
            Err(err) => {
                tracing::error!("Anyhow error: {:?}", err);
                ApiError::InternalError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_form_error_is_422_with_fields() {
        let mut errors = FieldErrors::default();
        errors.add("quantity_in_grams", "Quantity in grams must be greater than 0.");

        let response = ApiError::Form(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["fields"]["quantity_in_grams"][0],
            "Quantity in grams must be greater than 0."
        );
    }

    #[tokio::test]
    async fn test_unauthorized_carries_login_url() {
        let response = ApiError::Unauthorized { next: "/log_food/".to_string() }.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["login_url"], "/login/?next=/log_food/");
    }

    #[test]
    fn test_sqlx_errors_behind_anyhow_are_database_errors() {
        let err = ApiError::from(anyhow::Error::from(sqlx::Error::RowNotFound));
        assert!(matches!(err, ApiError::DatabaseError(_)));

        let err = ApiError::from(anyhow::anyhow!("task panicked"));
        assert!(matches!(err, ApiError::InternalError));
    }

    #[tokio::test]
    async fn test_database_error_code() {
        let response = ApiError::from(anyhow::Error::from(sqlx::Error::PoolTimedOut)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "DATABASE_ERROR");
        assert_eq!(body["error"], "Database error occurred");
    }

    #[test]
    fn test_internal_details_hidden() {
        let response = ApiError::DatabaseError("connection refused at 10.0.0.3".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
