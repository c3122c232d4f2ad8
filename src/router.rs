use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use sipkl_config::CorsConfig;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::dispatch::router::{init_dispatch_router, init_health_router};
use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::state::AppState;

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(init_health_router())
        .nest("/api", init_dispatch_router())
        .nest_service("/files", ServeDir::new(&state.storage_config.base_dir))
        .with_state(state.clone())
        .layer(cors_layer(&state.cors_config))
        .layer(middleware::from_fn(logging_middleware))
}

/// The RPC endpoint only takes JSON posts; files and docs are plain GETs.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.any_origin {
        AllowOrigin::any()
    } else {
        let allowed: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(allowed)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .max_age(config.max_age)
}
