use thiserror::Error;

/// Errors that can occur within the queue subsystem.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Payload failed to serialize/deserialize.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Outbound webhook alert failed.
    #[error("Webhook delivery error: {0}")]
    Webhook(String),
}

pub type Result<T> = std::result::Result<T, QueueError>;
