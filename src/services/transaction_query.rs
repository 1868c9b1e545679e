//! Transaction Query Service
//!
//! Builds the signed status-query payload and posts it to the gateway API.
//! The hash input here is pipe-delimited in the gateway's documented field
//! order, not the sorted key=value form used for payment URLs.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::info;

use crate::error::AppError;
use crate::gateway::canonical::{ParameterSet, SignedRequest};
use crate::gateway::client::GatewayClient;
use crate::gateway::config::GatewayConfig;
use crate::gateway::reference::random_reference;
use crate::gateway::signer;
use crate::gateway::time::format_timestamp;

pub struct TransactionQueryService {
    config: Arc<GatewayConfig>,
    client: GatewayClient,
}

impl TransactionQueryService {
    pub fn new(config: Arc<GatewayConfig>, client: GatewayClient) -> Self {
        Self { config, client }
    }

    /// Query the status of a transaction; returns the raw gateway body.
    ///
    /// Single attempt, fail-fast: transport errors and non-200 responses
    /// propagate as typed errors, never retried.
    pub async fn query_transaction(
        &self,
        order_id: &str,
        trans_date: &str,
        client_ip: &str,
    ) -> Result<String, AppError> {
        let request_id = random_reference();
        let create_date = format_timestamp(Utc::now());
        let payload = self.build_payload(order_id, trans_date, client_ip, &request_id, &create_date)?;

        info!(order_id, request_id = %request_id, "Querying transaction status");

        let response = self.client.post_json(&payload).await?;
        if !response.is_success() {
            return Err(AppError::RemoteRejected {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response.body)
    }

    /// Build the signed JSON payload for a given request id and create date
    pub fn build_payload(
        &self,
        order_id: &str,
        trans_date: &str,
        client_ip: &str,
        request_id: &str,
        create_date: &str,
    ) -> Result<Value, AppError> {
        if order_id.is_empty() {
            return Err(AppError::Validation {
                field: "order_id",
                reason: "order id must not be empty".to_string(),
            });
        }
        if trans_date.is_empty() {
            return Err(AppError::Validation {
                field: "trans_date",
                reason: "transaction date must not be empty".to_string(),
            });
        }

        let order_info = format!("Check transaction status for OrderId: {}", order_id);

        let mut params = ParameterSet::new();
        params.insert("vnp_RequestId", request_id);
        params.insert("vnp_Version", self.config.version.as_str());
        params.insert("vnp_Command", self.config.command.query.as_str());
        params.insert("vnp_TmnCode", self.config.tmn_code.as_str());
        params.insert("vnp_TxnRef", order_id);
        params.insert("vnp_OrderInfo", order_info.as_str());
        params.insert("vnp_TransactionDate", trans_date);
        params.insert("vnp_CreateDate", create_date);
        params.insert("vnp_IpAddr", client_ip);

        // Field order is the gateway's documented contract, not alphabetical
        let hash_message = [
            request_id,
            self.config.version.as_str(),
            self.config.command.query.as_str(),
            self.config.tmn_code.as_str(),
            order_id,
            trans_date,
            create_date,
            client_ip,
            order_info.as_str(),
        ]
        .join("|");

        let digest = signer::sign(&self.config.secret_key, &hash_message);
        Ok(SignedRequest::new(params, digest).to_json())
    }
}
