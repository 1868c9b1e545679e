//! VNPay gateway integration service
//!
//! A thin integration layer between a merchant backend and the VNPay payment
//! gateway: signed payment-URL construction, return-callback handling,
//! transaction status queries and refunds. The correctness-critical core is
//! the canonical parameter string and its HMAC-SHA512 signature in
//! [`gateway`]; everything else is request/response glue around it.

pub mod api;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod middleware;
pub mod services;
