use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::models::state::AppState;

#[derive(Serialize)]
pub struct StatusPayload {
    status: &'static str,
    chain_id: u64,
    tokens: usize,
}

pub async fn status(State(state): State<AppState>) -> (StatusCode, Json<StatusPayload>) {
    // Construction already wired the providers; an empty registry is the
    // only state in which requests cannot be served.
    let tokens = state.registry.len();
    let status = if tokens > 0 { "ready" } else { "warming_up" };
    let status_code = if status == "ready" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(StatusPayload {
            status,
            chain_id: state.chain_id,
            tokens,
        }),
    )
}
