use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BenchError {
    #[error("Cannot parse config: {0}")]
    ConfigParsingError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Setup conflict: {0}")]
    SetupConflict(String),
    #[error("Backend '{backend}' failed: {message}")]
    BackendOperation { backend: String, message: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Timer error: {0}")]
    Timer(String),
    #[error("Unknown route: {0}")]
    UnknownRoute(String),
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl BenchError {
    pub fn backend(backend: &str, message: impl Into<String>) -> Self {
        BenchError::BackendOperation {
            backend: backend.to_string(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        BenchError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        BenchError::Serialization(err.to_string())
    }
}

impl From<tokio::task::JoinError> for BenchError {
    fn from(err: tokio::task::JoinError) -> Self {
        BenchError::WorkerPool(err.to_string())
    }
}
