//! Gateway configuration
//!
//! Loaded once at startup from the environment and passed by `Arc` into every
//! service. Read-only afterwards; nothing in the codebase mutates it.

use serde::Deserialize;

/// Command identifiers the gateway expects per operation
#[derive(Debug, Clone, Deserialize)]
pub struct CommandConfig {
    pub pay: String,
    pub query: String,
    pub refund: String,
}

/// Immutable VNPay gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Browser redirect base URL for payment initiation
    pub pay_url: String,
    /// URL the gateway redirects the customer back to
    pub return_url: String,
    /// JSON API endpoint for query and refund calls
    pub api_url: String,
    /// Merchant terminal code assigned by the gateway
    pub tmn_code: String,
    /// Shared HMAC secret
    pub secret_key: String,
    /// Protocol version string
    pub version: String,
    pub command: CommandConfig,
    /// Default order type sent with every payment
    pub order_type: String,
    /// ISO currency code, e.g. "VND"
    pub curr_code: String,
    /// Outbound request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl GatewayConfig {
    /// Load configuration from `VNPAY_*` environment variables.
    ///
    /// Nested command names use double underscores, e.g.
    /// `VNPAY_COMMAND__PAY=pay`, `VNPAY_COMMAND__QUERY=querydr`.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("VNPAY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
