use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod state;

pub use state::AppState;

/// `GET /api/{source}?limit=N` runs one ingestion and returns the report:
/// 200 on any completed run (partial parsing errors included), 500 when the
/// report carries a critical error.
pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/sources", get(handlers::list_sources))
        .route("/api/:source", get(handlers::ingest_source))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::AppState;
    pub use khobor_core::{ArticleRecord, Error, Result, Source};
}
