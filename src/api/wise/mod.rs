pub mod client;
pub mod models;

pub use client::WiseClient;
pub use models::{ApiError, Balance};
