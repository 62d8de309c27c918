use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("store error: {0}")]
    Store(#[from] continuity_store::StoreError),

    #[error("window error: {0}")]
    Window(#[from] continuity_window::WindowError),

    #[error("topic error: {0}")]
    Topic(#[from] continuity_topics::TopicError),

    #[error("template error: {0}")]
    Template(#[from] continuity_core::CoreError),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ComposeError>;
