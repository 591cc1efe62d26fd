use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::auth::require_session;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    // Public routes: no session required
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login));

    // Protected API routes: every query is scoped to the session's user
    let protected = Router::new()
        // Session
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        // Trades
        .route("/api/trades", get(handlers::trades::list).post(handlers::trades::create))
        .route(
            "/api/trades/:id",
            get(handlers::trades::detail)
                .put(handlers::trades::update)
                .delete(handlers::trades::remove),
        )
        // Setups
        .route("/api/setups", get(handlers::setups::list).post(handlers::setups::create))
        .route(
            "/api/setups/:id",
            get(handlers::setups::detail)
                .put(handlers::setups::update)
                .delete(handlers::setups::remove),
        )
        .route("/api/setups/:id/trades", get(handlers::setups::trades))
        .route("/api/setups/:id/recalculate", post(handlers::setups::recalculate))
        // Tags
        .route("/api/tags", get(handlers::tags::list).post(handlers::tags::create))
        .route("/api/tags/:id", delete(handlers::tags::remove))
        // Statistics
        .route("/api/stats/summary", get(handlers::stats::summary))
        .route("/api/stats/setups", get(handlers::stats::setups))
        // Calculator preview
        .route("/api/calculator", post(handlers::calculator::preview))
        .layer(middleware::from_fn_with_state(state.clone(), require_session));

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
