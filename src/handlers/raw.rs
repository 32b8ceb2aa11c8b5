use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use super::{authorized_balances, AppState, HandlerError, TokenQuery};
use crate::services::balance_service;

/// GET /raw
///
/// Balances as a JSON array of `[currency, value]` pairs.
pub async fn handle(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Response, HandlerError> {
    let balances = authorized_balances(&state, &query).await?;
    let body = balance_service::render_json(&balances)?;

    debug!("Serving {} balances as JSON", balances.len());
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
