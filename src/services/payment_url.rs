//! Payment URL Service
//!
//! Builds the signed browser-redirect URL that starts a payment. Handles
//! validation, reference generation, parameter assembly, canonicalization
//! and signing.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::gateway::canonical::{ParameterSet, SignedRequest};
use crate::logging::mask_secure_hash;
use crate::gateway::config::GatewayConfig;
use crate::gateway::reference::random_reference;
use crate::gateway::signer;
use crate::gateway::time::TimeWindow;

/// Bank code used when the caller supplies none
const DEFAULT_BANK_CODE: &str = "ncb";

/// Customer-facing locale sent with every payment
const LOCALE: &str = "vn";

/// Request body: amount in major currency units plus an optional bank hint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUrlRequest {
    pub amount: i64,
    #[serde(default)]
    pub bank_code: Option<String>,
}

/// Response format
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUrlResponse {
    pub payment_url: String,
    pub code: String,
    pub message: String,
}

pub struct PaymentUrlService {
    config: Arc<GatewayConfig>,
}

impl PaymentUrlService {
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self { config }
    }

    /// Create a signed payment redirect URL
    pub fn create_payment_url(
        &self,
        request: &PaymentUrlRequest,
        client_ip: &str,
    ) -> Result<PaymentUrlResponse, AppError> {
        let txn_ref = random_reference();
        let window = TimeWindow::starting_at(Utc::now());

        let signed = self.build_signed_request(request, client_ip, &txn_ref, &window)?;
        let payment_url = format!("{}?{}", self.config.pay_url, signed.to_query_string());

        // Audit trail: no payment outcome is known yet, only that the URL was issued
        info!(
            txn_ref = %txn_ref,
            create_date = %window.create_date,
            amount = request.amount,
            secure_hash = %mask_secure_hash(&signed.secure_hash),
            "Payment URL created"
        );

        Ok(PaymentUrlResponse {
            payment_url,
            code: "00".to_string(),
            message: "success".to_string(),
        })
    }

    /// Assemble and sign the parameter set for a given reference and window.
    ///
    /// Split out from [`create_payment_url`] so the deterministic part can be
    /// exercised without randomness or wall-clock time.
    pub fn build_signed_request(
        &self,
        request: &PaymentUrlRequest,
        client_ip: &str,
        txn_ref: &str,
        window: &TimeWindow,
    ) -> Result<SignedRequest, AppError> {
        if request.amount <= 0 {
            return Err(AppError::invalid_amount("amount must be positive"));
        }
        let amount_minor = request
            .amount
            .checked_mul(100)
            .ok_or_else(|| AppError::invalid_amount("amount too large"))?;
        if client_ip.is_empty() {
            return Err(AppError::Validation {
                field: "client_ip",
                reason: "client IP must not be empty".to_string(),
            });
        }

        let bank_code = match request.bank_code.as_deref() {
            Some(code) if !code.is_empty() => code,
            _ => DEFAULT_BANK_CODE,
        };

        let mut params = ParameterSet::new();
        params.insert("vnp_Version", self.config.version.as_str());
        params.insert("vnp_Command", self.config.command.pay.as_str());
        params.insert("vnp_TmnCode", self.config.tmn_code.as_str());
        params.insert("vnp_Amount", amount_minor.to_string());
        params.insert("vnp_CurrCode", self.config.curr_code.as_str());
        params.insert("vnp_BankCode", bank_code);
        params.insert("vnp_TxnRef", txn_ref);
        params.insert("vnp_OrderInfo", format!("Payment for order: {}", txn_ref));
        params.insert("vnp_OrderType", self.config.order_type.as_str());
        params.insert("vnp_Locale", LOCALE);
        params.insert("vnp_ReturnUrl", self.config.return_url.as_str());
        params.insert("vnp_IpAddr", client_ip);
        params.insert("vnp_CreateDate", window.create_date.as_str());
        params.insert("vnp_ExpireDate", window.expire_date.as_str());

        let digest = signer::sign(&self.config.secret_key, &params.hash_data());
        Ok(SignedRequest::new(params, digest))
    }
}
