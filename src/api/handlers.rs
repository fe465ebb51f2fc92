use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::bench;
use crate::service::{BenchService, RouteInfo};

use super::error::ApiError;

pub async fn health() -> &'static str {
    "OK"
}

pub async fn list_routes(State(service): State<Arc<BenchService>>) -> Json<Vec<RouteInfo>> {
    Json(service.routes())
}

/// Runs the whole workload and answers with every step's timing, or with an
/// error and no timings at all.
pub async fn benchmark(
    State(service): State<Arc<BenchService>>,
    Path((mode, backend)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let result = service.run(&mode, &backend).await?;
    let body = bench::serialize(&result)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
