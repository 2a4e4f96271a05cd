//! JSON API adapter for the settlement ledger.
//!
//! Run with: `cargo run --example server`
//!
//! ## Endpoints
//!
//! - `POST /accounts` - Open an account (`{"role": "vendor"}`)
//! - `GET /accounts` - List all accounts
//! - `GET /wallets/{id}` - Balance and transaction history
//! - `POST /wallets/{id}/transactions` - Manual credit or debit
//! - `POST /orders` - Place an order
//! - `GET /orders/{id}` - Get an order
//! - `POST /orders/{id}/settle` - Settle a pending order
//! - `POST /orders/{id}/deliver` - Confirm delivery of a paid order
//! - `GET /notifications` - Take queued notifications
//!
//! ## Example Usage
//!
//! ```bash
//! curl -X POST http://localhost:3000/accounts \
//!   -H "Content-Type: application/json" -d '{"role": "vendor"}'
//!
//! curl -X POST http://localhost:3000/wallets/1/transactions \
//!   -H "Content-Type: application/json" -d '{"kind": "credit", "amount": "100.00"}'
//!
//! curl -X POST http://localhost:3000/orders \
//!   -H "Content-Type: application/json" \
//!   -d '{"customer_id": 1, "vendor_id": 2, "rider_id": 3, "product_amount": "1000", "delivery_fee": "200"}'
//!
//! curl -X POST http://localhost:3000/orders/1/settle
//! ```

use arewa_ledger::{
    AccountId, Ledger, LedgerError, Notification, Order, OrderId, Role, SettlementSplit,
    TransactionKind, Wallet,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// === Request/Response DTOs ===

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAccountRequest {
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAccountResponse {
    pub account_id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WalletTransactionRequest {
    pub kind: TransactionKind,
    pub amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: u64,
    pub vendor_id: u64,
    pub rider_id: u64,
    pub product_amount: Decimal,
    pub delivery_fee: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub account: u64,
    pub role: Role,
    pub balance: Decimal,
}

/// Response body for errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state containing the ledger.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
}

// === Error Handling ===

/// Wrapper for converting `LedgerError` into HTTP responses.
pub struct AppError(LedgerError);

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            LedgerError::AccountNotFound(_) => (StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND"),
            LedgerError::OrderNotFound(_) => (StatusCode::NOT_FOUND, "ORDER_NOT_FOUND"),
            LedgerError::InvalidAmount => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
            LedgerError::AmountOverflow => (StatusCode::BAD_REQUEST, "AMOUNT_OVERFLOW"),
            LedgerError::InsufficientFunds(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_FUNDS")
            }
            LedgerError::OrderNotSettleable(..) => (StatusCode::CONFLICT, "ORDER_NOT_SETTLEABLE"),
            LedgerError::InvalidStatusTransition { .. } => {
                (StatusCode::CONFLICT, "INVALID_STATUS_TRANSITION")
            }
            LedgerError::DuplicateAccount(_) => (StatusCode::CONFLICT, "DUPLICATE_ACCOUNT"),
            LedgerError::InvalidRole => (StatusCode::BAD_REQUEST, "INVALID_ROLE"),
            LedgerError::RoleMismatch { .. } => (StatusCode::BAD_REQUEST, "ROLE_MISMATCH"),
        };

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

/// POST /accounts - Open an account.
async fn open_account(
    State(state): State<AppState>,
    Json(request): Json<OpenAccountRequest>,
) -> Result<(StatusCode, Json<OpenAccountResponse>), AppError> {
    let id = state.ledger.open_account(request.role)?;
    Ok((
        StatusCode::CREATED,
        Json(OpenAccountResponse { account_id: id.0 }),
    ))
}

/// GET /accounts - List all accounts.
async fn list_accounts(State(state): State<AppState>) -> Json<Vec<AccountResponse>> {
    let accounts = state
        .ledger
        .accounts()
        .iter()
        .map(|account| AccountResponse {
            account: account.id().0,
            role: account.role(),
            balance: account.balance(),
        })
        .collect();

    Json(accounts)
}

/// GET /wallets/{id} - Balance and history.
async fn get_wallet(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Wallet>, AppError> {
    Ok(Json(state.ledger.get_wallet(AccountId(id))?))
}

/// POST /wallets/{id}/transactions - Manual credit or debit.
async fn wallet_transaction(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<WalletTransactionRequest>,
) -> Result<Json<Wallet>, AppError> {
    let wallet =
        state
            .ledger
            .apply_wallet_transaction(AccountId(id), request.amount, request.kind)?;
    Ok(Json(wallet))
}

/// POST /orders - Place an order.
async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), AppError> {
    let id = state.ledger.create_order(
        AccountId(request.customer_id),
        AccountId(request.vendor_id),
        AccountId(request.rider_id),
        request.product_amount,
        request.delivery_fee,
    )?;
    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse { order_id: id.0 }),
    ))
}

/// GET /orders/{id} - Get an order.
async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.ledger.get_order(OrderId(id))?))
}

/// POST /orders/{id}/settle - Settle a pending order.
async fn settle_order(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<SettlementSplit>, AppError> {
    Ok(Json(state.ledger.settle_order(OrderId(id))?))
}

/// POST /orders/{id}/deliver - Confirm delivery.
async fn confirm_delivery(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    state.ledger.confirm_delivery(OrderId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /notifications - Take queued notifications.
async fn drain_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.ledger.drain_notifications())
}

// === Router ===

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/accounts", get(list_accounts).post(open_account))
        .route("/wallets/{id}", get(get_wallet))
        .route("/wallets/{id}/transactions", post(wallet_transaction))
        .route("/orders", post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/settle", post(settle_order))
        .route("/orders/{id}/deliver", post(confirm_delivery))
        .route("/notifications", get(drain_notifications))
        .with_state(state)
}

// === Main ===

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("AREWA_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState {
        ledger: Arc::new(Ledger::new()),
    };

    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    info!("ledger API listening on http://127.0.0.1:3000");

    axum::serve(listener, app).await
}
