use thiserror::Error;

/// Common error type shared by the blockpad crates
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid store key: {0:?}")]
    InvalidKey(String),

    #[error("Generic error: {0}")]
    Generic(String),
}
