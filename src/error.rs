use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task not found: {0}")]
    NotFound(String),

    #[error("task already completed: {0}")]
    AlreadyCompleted(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("pattern encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}
