//! Payment API endpoints
//!
//! Four endpoints: signed payment-URL creation, the gateway return callback,
//! transaction status query and refund. Payment-URL failures collapse to a
//! generic code at this boundary so internal detail never reaches the caller.

use std::sync::Arc;

use axum::{
    extract::{Query, RawQuery, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::api::models::{ErrorDetail, ErrorResponse, QueryParams};
use crate::error::AppError;
use crate::gateway::canonical::ParameterSet;
use crate::services::callback::{CallbackResponse, CallbackService};
use crate::services::payment_url::{PaymentUrlRequest, PaymentUrlService};
use crate::services::refund::{RefundCommand, RefundService};
use crate::services::transaction_query::TransactionQueryService;

/// Generic failure code for payment-URL creation, mirrored from the gateway's
/// own convention ("00" success, "99" unspecified failure)
const GENERIC_FAILURE_CODE: &str = "99";
const GENERIC_FAILURE_MESSAGE: &str = "Lỗi tạo URL thanh toán";

/// Service dependencies shared by all payment handlers
#[derive(Clone)]
pub struct AppState {
    pub payment_url: Arc<PaymentUrlService>,
    pub callback: Arc<CallbackService>,
    pub query: Arc<TransactionQueryService>,
    pub refund: Arc<RefundService>,
}

/// Build the payment router under `/api/v1/payments`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/payments", post(create_payment))
        .route("/api/v1/payments/callback", get(payment_callback))
        .route("/api/v1/payments/query", post(query_transaction))
        .route("/api/v1/payments/refund", post(refund_transaction))
        .with_state(state)
}

/// Resolve the caller's network-origin IP.
///
/// First hop of `x-forwarded-for` when present (the service runs behind a
/// proxy in every deployed environment), else `x-real-ip`, else loopback.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        })
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

fn error_response(err: &AppError) -> (StatusCode, Json<ErrorResponse>) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse {
        error: ErrorDetail {
            code: err.error_code(),
            message: err.user_message(),
            retry_after: if err.is_retryable() { Some(10) } else { None },
        },
    };
    (status, Json(body))
}

/// POST /api/v1/payments handler
async fn create_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PaymentUrlRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let ip = client_ip(&headers);

    match state.payment_url.create_payment_url(&request, &ip) {
        Ok(response) => Ok(Json(json!(response))),
        Err(err) => {
            // Detail stays in the log; the caller sees only the generic code
            error!(error = %err, "Payment URL creation failed");
            let status = StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            Err((
                status,
                Json(json!({
                    "code": GENERIC_FAILURE_CODE,
                    "message": GENERIC_FAILURE_MESSAGE,
                })),
            ))
        }
    }
}

/// GET /api/v1/payments/callback handler
async fn payment_callback(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<CallbackResponse>, (StatusCode, Json<CallbackResponse>)> {
    let params = ParameterSet::from_query(query.as_deref().unwrap_or(""));
    info!(
        txn_ref = params.get("vnp_TxnRef").unwrap_or("<missing>"),
        response_code = params.get("vnp_ResponseCode").unwrap_or("<missing>"),
        "Gateway return callback received"
    );

    match state.callback.evaluate(&params) {
        Ok(outcome) => Ok(Json(outcome.into())),
        Err(err) => Err((
            StatusCode::BAD_REQUEST,
            Json(CallbackResponse {
                code: "fail".to_string(),
                message: err.user_message(),
            }),
        )),
    }
}

/// POST /api/v1/payments/query handler
async fn query_transaction(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
    headers: HeaderMap,
) -> Result<String, (StatusCode, Json<ErrorResponse>)> {
    let ip = client_ip(&headers);

    state
        .query
        .query_transaction(&params.order_id, &params.trans_date, &ip)
        .await
        .map_err(|err| {
            error!(order_id = %params.order_id, error = %err, "Transaction query failed");
            error_response(&err)
        })
}

/// POST /api/v1/payments/refund handler
async fn refund_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(command): Json<RefundCommand>,
) -> Result<String, (StatusCode, Json<ErrorResponse>)> {
    let ip = client_ip(&headers);

    state
        .refund
        .refund_transaction(&command, &ip)
        .await
        .map_err(|err| {
            error!(order_id = %command.order_id, error = %err, "Refund failed");
            error_response(&err)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ip_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.2".parse().unwrap());
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        assert_eq!(client_ip(&headers), "203.0.113.9");
    }

    #[test]
    fn client_ip_falls_back_to_real_ip_then_loopback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.4".parse().unwrap());
        assert_eq!(client_ip(&headers), "198.51.100.4");
        assert_eq!(client_ip(&HeaderMap::new()), "127.0.0.1");
    }
}
