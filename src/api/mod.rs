//! HTTP API
//!
//! `axum` router exposing the wallet engine:
//!
//! | Method | Path                            | Operation            |
//! |--------|---------------------------------|----------------------|
//! | GET    | `/health`                       | liveness             |
//! | GET    | `/api/v1/balance-types`         | list balance types   |
//! | POST   | `/api/v1/wallets`               | create wallet        |
//! | GET    | `/api/v1/wallets/:id`           | get wallet           |
//! | DELETE | `/api/v1/wallets/:id`           | soft-delete wallet   |
//! | POST   | `/api/v1/wallets/:id/add`       | add balance          |
//! | POST   | `/api/v1/wallets/:id/deduct`    | deduct balance       |

pub mod error;
pub mod handlers;
pub mod response;

use crate::core::WalletEngine;
use crate::types::WalletError;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use response::{ApiResponse, ErrorBody};

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: WalletEngine,
}

impl AppState {
    pub fn new(engine: WalletEngine) -> Self {
        Self { engine }
    }
}

fn wallet_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_wallet))
        .route(
            "/:id",
            get(handlers::get_wallet).delete(handlers::delete_wallet),
        )
        .route("/:id/add", post(handlers::add_balance))
        .route("/:id/deduct", post(handlers::deduct_balance))
}

/// Build the service router with panic recovery, tracing and permissive CORS
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/balance-types", get(handlers::list_balance_types))
        .nest("/api/v1/wallets", wallet_routes())
        .with_state(state);

    with_middleware(router)
}

fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            },
        ))
        .layer(CorsLayer::permissive())
}

/// Turn a handler panic into a 500 envelope instead of a dropped connection
fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError(WalletError::internal(format!("handler panicked: {}", detail))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn explode() -> &'static str {
        panic!("ledger invariant broken")
    }

    #[tokio::test]
    async fn test_handler_panic_returns_internal_error_envelope() {
        let router = with_middleware(Router::new().route("/explode", get(explode)));

        let response = router
            .oneshot(Request::builder().uri("/explode").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
        assert!(!json.to_string().contains("ledger invariant"));
    }
}
