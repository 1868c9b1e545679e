//! Services module for gateway request construction and evaluation

pub mod callback;
pub mod payment_url;
pub mod refund;
pub mod transaction_query;
