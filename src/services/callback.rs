//! Return Callback Service
//!
//! Evaluates the gateway's return redirect. The response code alone is not
//! authoritative: when the redirect carries a secure hash it is re-verified
//! against the shared secret before the status is trusted.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::error::AppError;
use crate::gateway::canonical::{ParameterSet, SECURE_HASH_FIELD};
use crate::gateway::config::GatewayConfig;
use crate::gateway::signer;

/// Companion field some gateway versions send alongside the hash; excluded
/// from the hash input like the hash itself
const SECURE_HASH_TYPE_FIELD: &str = "vnp_SecureHashType";

const RESPONSE_CODE_FIELD: &str = "vnp_ResponseCode";
const SUCCESS_RESPONSE_CODE: &str = "00";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    Success,
    Failure,
}

/// Response returned to the redirected customer
#[derive(Debug, Clone, Serialize)]
pub struct CallbackResponse {
    pub code: String,
    pub message: String,
}

impl From<CallbackOutcome> for CallbackResponse {
    fn from(outcome: CallbackOutcome) -> Self {
        match outcome {
            CallbackOutcome::Success => Self {
                code: "ok".to_string(),
                message: "success".to_string(),
            },
            CallbackOutcome::Failure => Self {
                code: "fail".to_string(),
                message: "fail".to_string(),
            },
        }
    }
}

pub struct CallbackService {
    config: Arc<GatewayConfig>,
}

impl CallbackService {
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self { config }
    }

    /// Evaluate a return callback's parameters.
    ///
    /// A present-but-invalid secure hash is a hard signature error. A missing
    /// hash still yields an outcome from the response code, which covers the
    /// documented redirect path. A missing or non-"00" response code is a
    /// failure outcome, never a panic.
    pub fn evaluate(&self, params: &ParameterSet) -> Result<CallbackOutcome, AppError> {
        let mut verifiable = params.clone();
        let claimed_hash = verifiable.remove(SECURE_HASH_FIELD);
        verifiable.remove(SECURE_HASH_TYPE_FIELD);

        if let Some(claimed) = claimed_hash {
            let message = verifiable.hash_data();
            if !signer::verify(&self.config.secret_key, &message, &claimed) {
                warn!(
                    txn_ref = params.get("vnp_TxnRef").unwrap_or("<missing>"),
                    "Callback secure hash did not verify"
                );
                return Err(AppError::Signature(
                    "callback secure hash mismatch".to_string(),
                ));
            }
        }

        match params.get(RESPONSE_CODE_FIELD) {
            Some(SUCCESS_RESPONSE_CODE) => Ok(CallbackOutcome::Success),
            _ => Ok(CallbackOutcome::Failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::config::CommandConfig;

    fn test_service() -> CallbackService {
        CallbackService::new(Arc::new(GatewayConfig {
            pay_url: "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".to_string(),
            return_url: "https://merchant.test/api/v1/payments/callback".to_string(),
            api_url: "https://sandbox.vnpayment.vn/merchant_webapi/api/transaction".to_string(),
            tmn_code: "DEMOTMN1".to_string(),
            secret_key: "TESTSECRETKEY".to_string(),
            version: "2.1.0".to_string(),
            command: CommandConfig {
                pay: "pay".to_string(),
                query: "querydr".to_string(),
                refund: "refund".to_string(),
            },
            order_type: "other".to_string(),
            curr_code: "VND".to_string(),
            request_timeout_secs: 30,
        }))
    }

    fn signed_params(response_code: &str, secret: &str) -> ParameterSet {
        let mut params = ParameterSet::new();
        params.insert(RESPONSE_CODE_FIELD, response_code);
        params.insert("vnp_TxnRef", "12345678");
        params.insert("vnp_Amount", "10000000");
        let digest = signer::sign(secret, &params.hash_data());
        params.insert(SECURE_HASH_FIELD, digest);
        params
    }

    #[test]
    fn response_code_00_is_success() {
        let service = test_service();
        let params = signed_params("00", "TESTSECRETKEY");
        assert_eq!(service.evaluate(&params).unwrap(), CallbackOutcome::Success);
    }

    #[test]
    fn other_response_codes_fail() {
        let service = test_service();
        let params = signed_params("07", "TESTSECRETKEY");
        assert_eq!(service.evaluate(&params).unwrap(), CallbackOutcome::Failure);
    }

    #[test]
    fn missing_response_code_fails_without_panicking() {
        let service = test_service();
        let mut params = ParameterSet::new();
        params.insert("vnp_TxnRef", "12345678");
        assert_eq!(service.evaluate(&params).unwrap(), CallbackOutcome::Failure);
    }

    #[test]
    fn tampered_hash_is_a_signature_error() {
        let service = test_service();
        let params = signed_params("00", "WRONGSECRET");
        let err = service.evaluate(&params).unwrap_err();
        assert!(matches!(err, AppError::Signature(_)));
    }

    #[test]
    fn tampered_response_code_is_a_signature_error() {
        let service = test_service();
        let mut params = signed_params("07", "TESTSECRETKEY");
        // Attacker flips the code to success after signing
        params.insert(RESPONSE_CODE_FIELD, "00");
        let err = service.evaluate(&params).unwrap_err();
        assert!(matches!(err, AppError::Signature(_)));
    }

    #[test]
    fn hash_type_field_is_excluded_from_verification() {
        let service = test_service();
        let mut params = signed_params("00", "TESTSECRETKEY");
        params.insert(SECURE_HASH_TYPE_FIELD, "HmacSHA512");
        assert_eq!(service.evaluate(&params).unwrap(), CallbackOutcome::Success);
    }
}
