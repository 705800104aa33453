pub mod config;
pub mod handlers;
pub mod models;
pub mod storage;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub config: Arc<Config>,
}

/// Build the full application router.
///
/// Routing is case-sensitive (`/Api` does not match `/api`) and unknown paths
/// fall through to a plain 404.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/api",
            get(handlers::frames::list_frames)
                .post(handlers::frames::ingest_frame)
                .put(handlers::frames::ingest_frame)
                .fallback(handlers::not_implemented),
        )
        .route(
            "/api/devices",
            get(handlers::devices::list_devices).fallback(handlers::not_implemented),
        )
        .route(
            "/api/:device",
            get(handlers::frames::list_device_frames)
                .post(handlers::frames::ingest_frame)
                .put(handlers::frames::ingest_frame)
                .delete(handlers::frames::delete_device_frames)
                .fallback(handlers::not_implemented),
        )
        // Sigfox callbacks are tiny; anything bigger is not a frame.
        .layer(DefaultBodyLimit::max(64 * 1024));

    Router::new()
        .route(
            "/",
            get(handlers::status::index).post(handlers::status::index),
        )
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
