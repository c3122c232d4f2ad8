use axum::{
    Router,
    routing::{get, post},
};

use crate::dispatch::controller::{handle_rpc, health};
use crate::state::AppState;

pub fn init_dispatch_router() -> Router<AppState> {
    Router::new().route("/rpc", post(handle_rpc))
}

pub fn init_health_router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
