//! Middleware modules
//!
//! Provides request/response logging middleware

pub mod logging;
