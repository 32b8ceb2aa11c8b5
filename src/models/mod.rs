//! Data models for the proxy's responses

pub mod balance;

pub use balance::BalancePair;
