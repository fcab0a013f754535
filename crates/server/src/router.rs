//! HTTP router construction.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::api;
use crate::locale::localize;
use crate::state::AppState;

fn cors(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => CorsLayer::permissive().allow_origin(value),
        Err(e) => {
            warn!(origin, error = %e, "invalid CORS origin, allowing any");
            CorsLayer::permissive()
        }
    }
}

/// Build the application router.
///
/// Health and readiness stay reachable while the first load is running;
/// every localized route waits for it.
pub fn build_router(state: Arc<AppState>, cors_origin: &str) -> Router {
    let localized = Router::new()
        .route("/translate/{key}", get(api::translate))
        .route(
            "/languages",
            get(api::languages).put(api::set_language),
        )
        .route("/views/{*name}", get(api::view))
        .route_layer(middleware::from_fn_with_state(state.clone(), localize));

    Router::new()
        .route("/health", get(api::health))
        .route("/ready", get(api::ready))
        .merge(localized)
        .layer(cors(cors_origin))
        .with_state(state)
}
