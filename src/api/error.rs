//! Mapping from wallet errors to HTTP responses

use crate::api::response::ApiResponse;
use crate::types::WalletError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

/// Handler result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned by HTTP handlers
#[derive(Debug)]
pub struct ApiError(pub WalletError);

impl ApiError {
    /// HTTP status for the wrapped error
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            WalletError::WalletNotFound { .. } => StatusCode::NOT_FOUND,
            WalletError::WalletAlreadyExists { .. }
            | WalletError::ConcurrentModification { .. } => StatusCode::CONFLICT,
            WalletError::InsufficientBalance { .. }
            | WalletError::InvalidCurrency { .. }
            | WalletError::InvalidAmount { .. }
            | WalletError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            WalletError::RegistryUnavailable { .. } => StatusCode::BAD_GATEWAY,
            WalletError::StoreError { .. } | WalletError::InternalError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<WalletError> for ApiError {
    fn from(err: WalletError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(WalletError::validation_failed("body", &rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let err = self.0;

        if err.is_internal() {
            error!(code = err.code(), error = %err, "request failed");
        }

        let body = ApiResponse::failure(err.message(), err.code(), err.details());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case::not_found(WalletError::wallet_not_found("u1"), StatusCode::NOT_FOUND)]
    #[case::exists(WalletError::wallet_already_exists("u1"), StatusCode::CONFLICT)]
    #[case::insufficient(
        WalletError::insufficient_balance("coins", Decimal::ZERO, Decimal::ONE),
        StatusCode::BAD_REQUEST
    )]
    #[case::currency(WalletError::invalid_currency("gems"), StatusCode::BAD_REQUEST)]
    #[case::amount(WalletError::invalid_amount("x", "not a number"), StatusCode::BAD_REQUEST)]
    #[case::validation(WalletError::validation_failed("user_id", "bad"), StatusCode::BAD_REQUEST)]
    #[case::concurrent(WalletError::concurrent_modification("u1", 5), StatusCode::CONFLICT)]
    #[case::registry(WalletError::registry_unavailable("timeout"), StatusCode::BAD_GATEWAY)]
    #[case::store(WalletError::store_error("get", "boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case::internal(WalletError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status_mapping(#[case] error: WalletError, #[case] expected: StatusCode) {
        assert_eq!(ApiError(error).status_code(), expected);
    }

    #[tokio::test]
    async fn test_store_error_body_hides_raw_text() {
        let response =
            ApiError(WalletError::store_error("create", "password authentication failed"))
                .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("DATABASE_ERROR"));
        assert!(text.contains("An error occurred while processing your request"));
        assert!(!text.contains("password"));
    }
}
