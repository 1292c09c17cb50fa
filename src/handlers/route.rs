use std::str::FromStr;

use axum::{extract::State, http::StatusCode, Json};
use num_bigint::BigUint;
use tracing::{info, warn};

use crate::models::{
    messages::{PlanPayload, RouteErrorResponse, RouteRequest, RouteResponse},
    state::AppState,
};

pub async fn post_route(
    State(state): State<AppState>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<RouteResponse>, (StatusCode, Json<RouteErrorResponse>)> {
    info!(
        request_id = request.request_id.as_deref().unwrap_or("-"),
        token_in = request.token_in.as_str(),
        token_out = request.token_out.as_str(),
        amount = request.amount.as_str(),
        trade_type = ?request.trade_type,
        "Received routing request"
    );

    let reject = |status: StatusCode, error: String| {
        (
            status,
            Json(RouteErrorResponse {
                error,
                request_id: request.request_id.clone(),
            }),
        )
    };

    let token_in = state
        .registry
        .resolve(&request.token_in)
        .map_err(|e| reject(e.status_code(), e.message().to_string()))?;
    let token_out = state
        .registry
        .resolve(&request.token_out)
        .map_err(|e| reject(e.status_code(), e.message().to_string()))?;
    let amount = BigUint::from_str(&request.amount).map_err(|e| {
        reject(
            StatusCode::BAD_REQUEST,
            format!("Invalid amount {}: {}", request.amount, e),
        )
    })?;

    let plan = state
        .router
        .route(token_in, token_out, amount, request.trade_type.into())
        .await
        .map_err(|e| {
            warn!(
                request_id = request.request_id.as_deref().unwrap_or("-"),
                error = %e,
                "Routing request failed"
            );
            reject(e.status_code(), e.message().to_string())
        })?;

    info!(
        request_id = request.request_id.as_deref().unwrap_or("-"),
        planned = plan.is_some(),
        "Routing request completed"
    );
    Ok(Json(RouteResponse {
        request_id: request.request_id,
        plan: plan.as_ref().map(PlanPayload::from_plan),
    }))
}
