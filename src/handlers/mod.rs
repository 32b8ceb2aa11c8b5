//! HTTP routes
//!
//! Both routes share the same flow: check the caller token, fetch the balances
//! once, then render them. Errors are turned into responses before any body is
//! written, so a failed request never carries a partial payload.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::api::wise::{ApiError, Balance};
use crate::api::BalanceSource;
use crate::utils::AccessGate;

pub mod raw;
pub mod text;

/// State shared by every request. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn BalanceSource>,
    pub gate: Arc<AccessGate>,
}

impl AppState {
    pub fn new(source: Arc<dyn BalanceSource>, gate: AccessGate) -> Self {
        Self {
            source,
            gate: Arc::new(gate),
        }
    }
}

/// Query parameters in request order. Repeated keys are kept, so a
/// duplicated `user_token` reaches the gate instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct TokenQuery(pub Vec<(String, String)>);

impl TokenQuery {
    /// First `user_token` value, like `url.Values.Get`
    pub fn user_token(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == "user_token")
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("invalid or missing user_token")]
    Unauthorized,
    #[error("failed to fetch balances: {0}")]
    Upstream(#[from] ApiError),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::Unauthorized => {
                warn!("Rejected request: {}", self);
                (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
            }
            HandlerError::Upstream(ref e) => {
                error!("Error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch or parse data").into_response()
            }
            HandlerError::Encode(ref e) => {
                error!("Error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode JSON").into_response()
            }
        }
    }
}

/// Gate the request, then fetch. The upstream is not called for rejected callers.
async fn authorized_balances(
    state: &AppState,
    query: &TokenQuery,
) -> Result<Vec<Balance>, HandlerError> {
    if !state.gate.allows(query.user_token()) {
        return Err(HandlerError::Unauthorized);
    }

    Ok(state.source.fetch_balances().await?)
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/raw", get(raw::handle))
        .route("/text", get(text::handle))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
