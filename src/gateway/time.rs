//! Gateway timestamp handling
//!
//! VNPay timestamps are civil time in UTC+7 formatted as `yyyyMMddHHmmss`,
//! regardless of where the server runs.

use chrono::{DateTime, Duration, FixedOffset, Utc};

/// Gateway civil timezone offset (UTC+7), in seconds
const GATEWAY_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// Payment URL validity window
const PAYMENT_VALIDITY_MINUTES: i64 = 15;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Format an instant as a gateway timestamp in UTC+7
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    let offset =
        FixedOffset::east_opt(GATEWAY_UTC_OFFSET_SECS).expect("static offset is in range");
    instant
        .with_timezone(&offset)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// Creation and expiry timestamps for a payment URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub create_date: String,
    pub expire_date: String,
}

impl TimeWindow {
    /// Window starting at `created`, expiring 15 minutes later
    pub fn starting_at(created: DateTime<Utc>) -> Self {
        Self {
            create_date: format_timestamp(created),
            expire_date: format_timestamp(created + Duration::minutes(PAYMENT_VALIDITY_MINUTES)),
        }
    }
}
