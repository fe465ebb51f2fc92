use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::core::BenchError;

pub struct ApiError(pub BenchError);

impl From<BenchError> for ApiError {
    fn from(err: BenchError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BenchError::UnknownRoute(_) => StatusCode::NOT_FOUND,
            BenchError::SetupConflict(_)
            | BenchError::BackendOperation { .. }
            | BenchError::Serialization(_)
            | BenchError::Timer(_)
            | BenchError::WorkerPool(_)
            | BenchError::IoError(_)
            | BenchError::ConfigParsingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}
