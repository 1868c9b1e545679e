use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

/// Query-string parameters for the transaction status endpoint
#[derive(Debug, Deserialize)]
pub struct QueryParams {
    pub order_id: String,
    pub trans_date: String,
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}
