//! Error types for the editor
//!
//! Missing blocks are not errors: those operations report `false`/`None`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
