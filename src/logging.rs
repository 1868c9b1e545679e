//! Logging and tracing configuration
//!
//! Structured logging with JSON formatting in production and human-readable
//! output in development, plus redaction helpers so the signing secret and
//! secure hashes never land in log output verbatim.

use std::env;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Environment types for logging configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Detect environment from ENV variable
    pub fn from_env() -> Self {
        match env::var("ENVIRONMENT")
            .or_else(|_| env::var("ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "prod" | "production" => Self::Production,
            "staging" | "stage" => Self::Staging,
            _ => Self::Development,
        }
    }

    /// Get default log level for environment
    pub fn default_log_level(&self) -> Level {
        match self {
            Self::Development => Level::DEBUG,
            Self::Staging => Level::INFO,
            Self::Production => Level::INFO,
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Initialize the tracing subscriber with appropriate formatting
///
/// # Environment Variables
/// - `ENVIRONMENT` or `ENV`: Set to "production", "staging", or "development"
/// - `RUST_LOG`: Override log level (e.g., "info", "debug", "warn")
/// - `LOG_FORMAT`: Force format to "json" or "pretty"
pub fn init_tracing() {
    let environment = Environment::from_env();

    // Determine log format (JSON for production, pretty for dev)
    let use_json = env::var("LOG_FORMAT")
        .map(|f| f.to_lowercase() == "json")
        .unwrap_or_else(|_| environment.is_production());

    // Build the environment filter
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            // Default filter: info level for our app, warn for dependencies
            EnvFilter::try_new(format!(
                "{}={},tower_http=debug,axum=debug,hyper=warn,reqwest=warn",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                environment.default_log_level()
            ))
        })
        .unwrap();

    if use_json {
        // JSON formatting for production (machine-readable)
        let json_layer = fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_target(true)
            .with_level(true)
            .with_file(false)
            .with_line_number(false)
            .with_filter(env_filter);

        tracing_subscriber::registry().with(json_layer).init();
    } else {
        // Pretty formatting for development (human-readable)
        let pretty_layer = fmt::layer()
            .pretty()
            .with_target(true)
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter);

        tracing_subscriber::registry().with(pretty_layer).init();
    }

    tracing::info!(
        environment = ?environment,
        format = if use_json { "json" } else { "pretty" },
        "Tracing initialized"
    );
}

/// Mask a secure hash digest for logging
///
/// Shows first 8 and last 8 hex characters, masks the rest
pub fn mask_secure_hash(digest: &str) -> String {
    if digest.len() <= 16 {
        return "****".to_string();
    }
    format!("{}...{}", &digest[..8], &digest[digest.len() - 8..])
}

/// Redact sensitive fields from JSON-like structures
///
/// Replaces values for keys like "secret_key", "vnp_SecureHash", "password"
pub fn redact_sensitive_data(text: &str) -> String {
    let sensitive_keys = [
        "secret_key",
        "secretKey",
        "vnp_SecureHash",
        "password",
        "token",
        "api_key",
        "apiKey",
        "auth",
        "authorization",
        "card_number",
        "cardNumber",
        "cvv",
        "pin",
    ];

    let mut result = text.to_string();
    for key in &sensitive_keys {
        // Match patterns like "key": "value" or "key":"value"
        let patterns = [
            format!(r#""{}":\s*"[^"]*""#, key),
            format!(r#"'{}': '[^']*'"#, key),
        ];

        for pattern in &patterns {
            if let Ok(re) = regex::Regex::new(pattern) {
                result = re
                    .replace_all(&result, format!(r#""{}": "[REDACTED]""#, key))
                    .to_string();
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_detection() {
        env::set_var("ENVIRONMENT", "production");
        assert_eq!(Environment::from_env(), Environment::Production);
        assert!(Environment::from_env().is_production());

        env::set_var("ENVIRONMENT", "development");
        assert_eq!(Environment::from_env(), Environment::Development);
        assert!(!Environment::from_env().is_production());
    }

    #[test]
    fn test_mask_secure_hash() {
        let digest = "0123456789abcdef".repeat(8);
        let masked = mask_secure_hash(&digest);
        assert_eq!(masked, "01234567...89abcdef");

        let short = "abc123";
        assert_eq!(mask_secure_hash(short), "****");
    }

    #[test]
    fn test_default_log_levels() {
        assert_eq!(Environment::Development.default_log_level(), Level::DEBUG);
        assert_eq!(Environment::Production.default_log_level(), Level::INFO);
        assert_eq!(Environment::Staging.default_log_level(), Level::INFO);
    }

    #[test]
    fn test_redact_sensitive_data() {
        let data = r#"{"secret_key": "TESTSECRETKEY", "vnp_Amount": "100"}"#;
        let redacted = redact_sensitive_data(data);
        assert!(redacted.contains("[REDACTED]"));
        assert!(!redacted.contains("TESTSECRETKEY"));
        assert!(redacted.contains("100")); // Non-sensitive data preserved

        let signed = r#"{"vnp_SecureHash": "49345f1c7004eabb", "vnp_TxnRef": "12345678"}"#;
        let redacted = redact_sensitive_data(signed);
        assert!(!redacted.contains("49345f1c7004eabb"));
        assert!(redacted.contains("12345678"));
    }
}
