use axum::middleware;
use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::auth::require_auth;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    // Public routes
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render))
        .route("/api/wallet/:address", get(handlers::wallet::report));

    // Reads are public; updates require a Bearer token when API_TOKEN is set
    let requirements = get(handlers::requirements::get_requirements).merge(
        put(handlers::requirements::update_requirements)
            .route_layer(middleware::from_fn_with_state(state.clone(), require_auth)),
    );
    let protected = Router::new().route("/api/requirements", requirements);

    // The wallet report is read by browser frontends on other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
