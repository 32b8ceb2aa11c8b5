//! Upstream APIs the proxy reads from

use async_trait::async_trait;

pub mod wise;

use wise::{ApiError, Balance};

/// Anything that can produce the current balances of one profile.
///
/// Handlers only see this trait, so tests can plug in a fake upstream.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn fetch_balances(&self) -> Result<Vec<Balance>, ApiError>;
}
