pub mod canonical;
pub mod client;
pub mod config;
pub mod reference;
pub mod signer;
pub mod time;
