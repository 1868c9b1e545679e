//! Error types for the VNPay gateway service
//!
//! Distinguishes validation, signature, network, remote-rejection and internal
//! failures so handlers can map each class to the right HTTP response without
//! leaking internal detail to callers.

use thiserror::Error;

/// Stable error codes surfaced in API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidAmount,
    InvalidField,
    SignatureMismatch,
    GatewayUnreachable,
    GatewayRejected,
    Internal,
}

/// Application error taxonomy
#[derive(Debug, Error)]
pub enum AppError {
    /// Input failed validation before any request was signed
    #[error("validation failed for {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A secure hash did not verify against the shared secret
    #[error("signature verification failed: {0}")]
    Signature(String),

    /// The outbound call to the gateway failed at the transport level
    #[error("gateway request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The gateway answered with a non-success protocol response
    #[error("gateway rejected request with status {status}")]
    RemoteRejected { status: u16, body: String },

    /// Anything unexpected; detail is logged, never surfaced
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        Self::Validation {
            field: "amount",
            reason: reason.into(),
        }
    }

    /// HTTP status the handler should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::Signature(_) => 400,
            Self::Network(_) => 502,
            Self::RemoteRejected { .. } => 502,
            Self::Internal(_) => 500,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Validation { field, .. } if *field == "amount" => ErrorCode::InvalidAmount,
            Self::Validation { .. } => ErrorCode::InvalidField,
            Self::Signature(_) => ErrorCode::SignatureMismatch,
            Self::Network(_) => ErrorCode::GatewayUnreachable,
            Self::RemoteRejected { .. } => ErrorCode::GatewayRejected,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Message safe to return to the caller
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { field, reason } => format!("Invalid {}: {}", field, reason),
            Self::Signature(_) => "Signature verification failed".to_string(),
            Self::Network(e) => format!("Gateway unreachable: {}", e),
            Self::RemoteRejected { status, .. } => {
                format!("Gateway rejected the request (status {})", status)
            }
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
