use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use khobor_core::Source;
use khobor_scrapers::IngestReport;
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct IngestParams {
    pub limit: Option<i64>,
}

pub async fn ingest_source(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
    Query(params): Query<IngestParams>,
) -> (StatusCode, Json<IngestReport>) {
    let Ok(source) = source.parse::<Source>() else {
        return (
            StatusCode::NOT_FOUND,
            Json(IngestReport::critical(format!("unknown source: {}", source))),
        );
    };

    match state.manager.ingest_source(source, params.limit).await {
        Ok(report) => {
            let status = if report.is_critical() {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::OK
            };
            (status, Json(report))
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(IngestReport::critical(e.to_string())),
        ),
    }
}

pub async fn list_sources(State(_state): State<Arc<AppState>>) -> Json<Vec<&'static str>> {
    Json(Source::all().iter().map(|s| s.tag()).collect())
}
