use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Solr request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Passthrough HTTP error: {0}")]
    Passthrough(#[from] hyper::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] hyper::http::Error),

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExporterError>;
