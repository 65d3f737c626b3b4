//! API error type and its HTTP mapping.
//!
//! Every handler returns `Result<_, ApiError>`. The body is always
//! `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::auth::AuthError;
use crate::exchange::ExchangeError;
use crate::providers::ProviderError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            StoreError::Invalid(_) => ApiError::BadRequest(e.to_string()),
            StoreError::Status { status: 401 | 403, .. } => ApiError::Unauthorized(e.to_string()),
            StoreError::Status { status: 404, .. } => ApiError::NotFound(e.to_string()),
            StoreError::Status { status, .. } if status < 500 => ApiError::BadRequest(e.to_string()),
            StoreError::Status { .. } | StoreError::Backend(_) => ApiError::Upstream(e.to_string()),
            StoreError::Io(_) | StoreError::Serde(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials | AuthError::InvalidToken => ApiError::Unauthorized(e.to_string()),
            AuthError::InvalidEmail(_)
            | AuthError::WeakPassword(_)
            | AuthError::AlreadyRegistered(_)
            | AuthError::ConfirmationRequired(_)
            | AuthError::Rejected(_) => ApiError::BadRequest(e.to_string()),
            AuthError::Backend(_) | AuthError::Status { .. } => ApiError::Upstream(e.to_string()),
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::InvalidSetting { .. } => ApiError::BadRequest(e.to_string()),
            _ => ApiError::Upstream(e.to_string()),
        }
    }
}

impl From<ExchangeError> for ApiError {
    fn from(e: ExchangeError) -> Self {
        match e {
            ExchangeError::Csv(_) | ExchangeError::MissingColumn(_) => ApiError::BadRequest(e.to_string()),
            ExchangeError::Write(_) => ApiError::Internal(e.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let not_found: ApiError = StoreError::NotFound {
            entity: "product",
            id: Uuid::nil(),
        }
        .into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let forbidden: ApiError = StoreError::Status {
            status: 403,
            body: "rls".into(),
        }
        .into();
        assert_eq!(forbidden.status(), StatusCode::UNAUTHORIZED);

        let auth: ApiError = AuthError::WeakPassword(6).into();
        assert_eq!(auth.status(), StatusCode::BAD_REQUEST);

        let provider: ApiError = ProviderError::Timeout.into();
        assert_eq!(provider.status(), StatusCode::BAD_GATEWAY);

        let setting: ApiError = ProviderError::InvalidSetting {
            field: "llm_base_url",
            value: "nope".into(),
            reason: "relative URL without a base".into(),
        }
        .into();
        assert_eq!(setting.status(), StatusCode::BAD_REQUEST);

        let csv: ApiError = ExchangeError::MissingColumn("title").into();
        assert_eq!(csv.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_error_body_is_json() {
        let response = ApiError::BadRequest("phrase is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "phrase is required");
    }
}
