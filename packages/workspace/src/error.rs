use blockpad_common::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Store error: {0}")]
    Store(#[from] CommonError),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document lock poisoned")]
    Poisoned,

    #[error("Autosave task is no longer running")]
    AutosaveStopped,
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
