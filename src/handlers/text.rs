use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use super::{authorized_balances, AppState, HandlerError, TokenQuery};
use crate::services::balance_service;

/// GET /text
pub async fn handle(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Response, HandlerError> {
    let balances = authorized_balances(&state, &query).await?;
    let body = balance_service::render_text(&balances);

    debug!("Serving {} balances as text", balances.len());
    Ok(([(header::CONTENT_TYPE, "text/plain")], body).into_response())
}
