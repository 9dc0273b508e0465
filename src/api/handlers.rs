//! HTTP handlers
//!
//! Handlers translate requests into [`WalletEngine`](crate::core::WalletEngine)
//! calls. Request amounts are parsed into `Decimal` here, before the engine
//! sees them.

use crate::api::error::{ApiError, ApiResult};
use crate::api::response::ApiResponse;
use crate::api::AppState;
use crate::types::{parse_amount_value, Wallet, WalletError};
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Optional body of `POST /api/v1/wallets`
#[derive(Debug, Default, Deserialize)]
pub struct CreateWalletRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Body of the add/deduct endpoints
///
/// `amount` may be a JSON string or number.
#[derive(Debug, Deserialize)]
pub struct UpdateBalanceRequest {
    #[serde(rename = "type", alias = "balance_type", default)]
    pub currency: String,
    #[serde(default)]
    pub amount: Value,
}

#[derive(Debug, Serialize)]
pub struct BalanceTypes {
    pub balance_types: Vec<String>,
}

type Envelope<T> = Json<ApiResponse<T>>;

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /api/v1/balance-types`
pub async fn list_balance_types(
    State(state): State<AppState>,
) -> ApiResult<Envelope<BalanceTypes>> {
    let balance_types = state.engine.balance_types().await?;

    Ok(Json(ApiResponse::success(
        "Balance types retrieved successfully",
        BalanceTypes {
            balance_types: balance_types.into_iter().collect(),
        },
    )))
}

/// `POST /api/v1/wallets`
///
/// Uses the body's `user_id` when given, otherwise generates a UUID v4.
pub async fn create_wallet(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Envelope<Wallet>)> {
    let request = parse_create_body(&body)?;
    let user_id = request
        .user_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let wallet = state.engine.create_wallet(&user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Wallet created successfully", wallet)),
    ))
}

/// `GET /api/v1/wallets/:id`
pub async fn get_wallet(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Envelope<Wallet>> {
    let wallet = state.engine.get_wallet(&user_id).await?;

    Ok(Json(ApiResponse::success(
        "Wallet retrieved successfully",
        wallet,
    )))
}

/// `POST /api/v1/wallets/:id/add`
pub async fn add_balance(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<Json<UpdateBalanceRequest>, JsonRejection>,
) -> ApiResult<Envelope<Wallet>> {
    let Json(request) = body?;
    let amount = parse_amount_value(&request.amount)?;

    let wallet = state
        .engine
        .add_balance(&user_id, &request.currency, amount)
        .await?;

    Ok(Json(ApiResponse::success("Balance added successfully", wallet)))
}

/// `POST /api/v1/wallets/:id/deduct`
pub async fn deduct_balance(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<Json<UpdateBalanceRequest>, JsonRejection>,
) -> ApiResult<Envelope<Wallet>> {
    let Json(request) = body?;
    let amount = parse_amount_value(&request.amount)?;

    let wallet = state
        .engine
        .deduct_balance(&user_id, &request.currency, amount)
        .await?;

    Ok(Json(ApiResponse::success(
        "Balance deducted successfully",
        wallet,
    )))
}

/// `DELETE /api/v1/wallets/:id`
pub async fn delete_wallet(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Envelope<Value>> {
    state.engine.delete_wallet(&user_id).await?;

    Ok(Json(ApiResponse::success(
        "Wallet deleted successfully",
        json!({ "user_id": user_id }),
    )))
}

fn parse_create_body(body: &[u8]) -> Result<CreateWalletRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateWalletRequest::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| ApiError(WalletError::validation_failed("body", &e.to_string())))
}
