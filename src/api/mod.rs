pub mod models;
pub mod payments;
