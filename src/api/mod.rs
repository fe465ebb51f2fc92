mod error;
mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use log::{info, warn};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::core::BenchError;
use crate::service::BenchService;

pub use error::ApiError;

pub struct BenchApi {
    service: Arc<BenchService>,
}

impl BenchApi {
    pub fn new(service: BenchService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/routes", get(handlers::list_routes))
            .route("/{mode}/{backend}", get(handlers::benchmark))
            .layer(
                TraceLayer::new_for_http()
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .with_state(self.service.clone())
    }

    pub async fn serve(self, addr: &str) -> Result<(), BenchError> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| BenchError::IoError(format!("binding to {addr}: {e}")))?;
        info!("listening on {addr}");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| BenchError::IoError(format!("serving: {e}")))?;
        info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("cannot listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
