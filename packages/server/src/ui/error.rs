//! HTTP error responses.

use axum::{
    Json,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{infrastructure::dto::http::ErrorResponse, usecase::UseCaseError};

/// Error returned by every REST handler, rendered as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError(pub UseCaseError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            UseCaseError::Validation(_) | UseCaseError::Conflict(_) => StatusCode::BAD_REQUEST,
            UseCaseError::Auth(_) => StatusCode::UNAUTHORIZED,
            UseCaseError::NotFound(_) => StatusCode::NOT_FOUND,
            UseCaseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UseCaseError> for ApiError {
    fn from(error: UseCaseError) -> Self {
        Self(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(UseCaseError::validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(UseCaseError::validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(UseCaseError::validation(rejection.body_text()))
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        Self(UseCaseError::validation(error.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self(UseCaseError::validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self.0 {
            UseCaseError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_status_mapping() {
        // テスト項目: ユースケースのエラーが HTTP ステータスに対応付けられる
        let cases = [
            (UseCaseError::validation("bad"), StatusCode::BAD_REQUEST),
            (UseCaseError::Conflict("Username already exists".into()), StatusCode::BAD_REQUEST),
            (UseCaseError::Auth("Invalid user".into()), StatusCode::UNAUTHORIZED),
            (UseCaseError::not_found("Chat not found"), StatusCode::NOT_FOUND),
            (UseCaseError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError(error).status(), expected);
        }
    }

    #[tokio::test]
    async fn test_error_body() {
        // テスト項目: エラーメッセージが error フィールドに入る
        let response = ApiError(UseCaseError::not_found("Chat not found")).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(response).await, serde_json::json!({"error": "Chat not found"}));
    }

    #[tokio::test]
    async fn test_internal_error_is_not_leaked() {
        // テスト項目: 内部エラーの詳細はレスポンスに含めない
        let response = ApiError(UseCaseError::Internal("disk I/O error".into())).into_response();

        assert_eq!(
            body_of(response).await,
            serde_json::json!({"error": "Internal server error"})
        );
    }
}
