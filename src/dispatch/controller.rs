use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::dispatch::{ApiResponse, RpcRequest, dispatch};
use crate::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[utoipa::path(
    post,
    path = "/api/rpc",
    request_body = RpcRequest,
    responses(
        (status = 200, description = "Action result; check `success` for the outcome", body = ApiResponse)
    ),
    tag = "Actions"
)]
#[instrument(skip(state, body))]
pub async fn handle_rpc(
    State(state): State<AppState>,
    body: Result<Json<RpcRequest>, JsonRejection>,
) -> Json<ApiResponse> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::info!(error = %rejection.body_text(), "Malformed action request");
            return Json(ApiResponse::error("Invalid request"));
        }
    };

    let action = request.action.trim();
    Json(dispatch(&state, action, request.payload).await)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
