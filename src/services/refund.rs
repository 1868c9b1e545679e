//! Refund Service
//!
//! Builds the signed refund payload and posts it to the gateway API. The
//! refund hash message is pipe-delimited with 13 segments; the empty
//! `vnp_TransactionNo` segment is part of the contract and must stay even
//! when no original transaction number is supplied.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::AppError;
use crate::gateway::canonical::{ParameterSet, SignedRequest};
use crate::gateway::client::GatewayClient;
use crate::gateway::config::GatewayConfig;
use crate::gateway::reference::random_reference;
use crate::gateway::signer;
use crate::gateway::time::format_timestamp;

/// Request body for a refund
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundCommand {
    /// Gateway transaction type code, e.g. "02" full / "03" partial refund
    pub tran_type: String,
    pub order_id: String,
    /// Original transaction date, `yyyyMMddHHmmss`
    pub trans_date: String,
    /// Amount in major currency units
    pub amount: i64,
    /// Identifier of the user requesting the refund
    pub user: String,
}

pub struct RefundService {
    config: Arc<GatewayConfig>,
    client: GatewayClient,
}

impl RefundService {
    pub fn new(config: Arc<GatewayConfig>, client: GatewayClient) -> Self {
        Self { config, client }
    }

    /// Issue a refund; returns the raw gateway body on any HTTP status.
    ///
    /// The gateway reports refund rejections in the response body, so a
    /// non-200 status still yields the body text rather than an error.
    pub async fn refund_transaction(
        &self,
        command: &RefundCommand,
        client_ip: &str,
    ) -> Result<String, AppError> {
        let request_id = random_reference();
        let create_date = format_timestamp(Utc::now());
        let payload = self.build_payload(command, client_ip, &request_id, &create_date)?;

        info!(
            order_id = %command.order_id,
            request_id = %request_id,
            amount = command.amount,
            "Submitting refund"
        );

        let response = self.client.post_json(&payload).await?;
        Ok(response.body)
    }

    /// Build the signed JSON payload for a given request id and create date
    pub fn build_payload(
        &self,
        command: &RefundCommand,
        client_ip: &str,
        request_id: &str,
        create_date: &str,
    ) -> Result<Value, AppError> {
        if command.amount <= 0 {
            return Err(AppError::invalid_amount("amount must be positive"));
        }
        let amount_minor = command
            .amount
            .checked_mul(100)
            .ok_or_else(|| AppError::invalid_amount("amount too large"))?;
        if command.order_id.is_empty() {
            return Err(AppError::Validation {
                field: "order_id",
                reason: "order id must not be empty".to_string(),
            });
        }

        let amount_minor = amount_minor.to_string();
        let order_info = format!("Refund for transaction: {}", command.order_id);
        // No original transaction number is carried, but the segment must exist
        let transaction_no = "";

        let mut params = ParameterSet::new();
        params.insert("vnp_RequestId", request_id);
        params.insert("vnp_Version", self.config.version.as_str());
        params.insert("vnp_Command", self.config.command.refund.as_str());
        params.insert("vnp_TmnCode", self.config.tmn_code.as_str());
        params.insert("vnp_TransactionType", command.tran_type.as_str());
        params.insert("vnp_TxnRef", command.order_id.as_str());
        params.insert("vnp_Amount", amount_minor.as_str());
        params.insert("vnp_OrderInfo", order_info.as_str());
        params.insert("vnp_TransactionDate", command.trans_date.as_str());
        params.insert("vnp_CreateBy", command.user.as_str());
        params.insert("vnp_CreateDate", create_date);
        params.insert("vnp_IpAddr", client_ip);

        let hash_message = [
            request_id,
            self.config.version.as_str(),
            self.config.command.refund.as_str(),
            self.config.tmn_code.as_str(),
            command.tran_type.as_str(),
            command.order_id.as_str(),
            amount_minor.as_str(),
            transaction_no,
            command.trans_date.as_str(),
            command.user.as_str(),
            create_date,
            client_ip,
            order_info.as_str(),
        ]
        .join("|");

        let digest = signer::sign(&self.config.secret_key, &hash_message);
        Ok(SignedRequest::new(params, digest).to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::config::CommandConfig;

    fn test_service() -> RefundService {
        let config = Arc::new(GatewayConfig {
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
        });
        let client = GatewayClient::new(config.api_url.clone(), config.request_timeout_secs)
            .expect("client builds");
        RefundService::new(config, client)
    }

    fn test_command() -> RefundCommand {
        RefundCommand {
            tran_type: "02".to_string(),
            order_id: "12345678".to_string(),
            trans_date: "20240301100000".to_string(),
            amount: 100_000,
            user: "ops.admin".to_string(),
        }
    }

    #[test]
    fn hash_message_has_thirteen_segments_with_empty_transaction_no() {
        let service = test_service();
        let command = test_command();

        let hash_message = [
            "11112222",
            "2.1.0",
            "refund",
            "DEMOTMN1",
            "02",
            "12345678",
            "10000000",
            "",
            "20240301100000",
            "ops.admin",
            "20240301103000",
            "127.0.0.1",
            "Refund for transaction: 12345678",
        ]
        .join("|");
        let segments: Vec<&str> = hash_message.split('|').collect();
        assert_eq!(segments.len(), 13);
        assert_eq!(segments[7], "");

        let payload = service
            .build_payload(&command, "127.0.0.1", "11112222", "20240301103000")
            .unwrap();
        let expected = signer::sign("TESTSECRETKEY", &hash_message);
        assert_eq!(payload["vnp_SecureHash"], Value::String(expected));
    }

    #[test]
    fn payload_converts_amount_to_minor_units() {
        let service = test_service();
        let payload = service
            .build_payload(&test_command(), "127.0.0.1", "11112222", "20240301103000")
            .unwrap();
        assert_eq!(payload["vnp_Amount"], "10000000");
        assert_eq!(payload["vnp_TransactionType"], "02");
        assert_eq!(payload["vnp_CreateBy"], "ops.admin");
        // No transaction number field is transmitted when none exists
        assert!(payload.get("vnp_TransactionNo").is_none());
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let service = test_service();
        for amount in [0, -5] {
            let mut command = test_command();
            command.amount = amount;
            let err = service
                .build_payload(&command, "127.0.0.1", "11112222", "20240301103000")
                .unwrap_err();
            assert!(matches!(err, AppError::Validation { field: "amount", .. }));
        }
    }

    #[test]
    fn rejects_overflowing_amount() {
        let service = test_service();
        let mut command = test_command();
        command.amount = i64::MAX;
        let err = service
            .build_payload(&command, "127.0.0.1", "11112222", "20240301103000")
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "amount", .. }));
    }
}
