use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{auth_middleware, metrics_middleware, require_admin};
use super::{files, handlers, orchestrator, progress, translate};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config().server.max_upload_bytes;

    // Worker control, admin identities only
    let control_routes = Router::new()
        .route("/orchestrator/start", post(orchestrator::start))
        .route("/orchestrator/stop", post(orchestrator::stop))
        .route_layer(middleware::from_fn(require_admin));

    // Routes that require an identity
    let protected_routes = Router::new()
        .route("/config", get(handlers::get_config))
        // Submission and progress
        .route("/translate", post(translate::translate))
        .route("/progress", get(progress::list_progress))
        // Translated files
        .route(
            "/files",
            get(files::list_files).delete(files::delete_files),
        )
        .route("/files/download", post(files::download_files))
        .route("/orchestrator/status", get(orchestrator::get_status))
        .merge(control_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
