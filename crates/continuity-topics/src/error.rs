use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopicError {
    #[error("store error: {0}")]
    Store(#[from] continuity_store::StoreError),

    #[error("llm provider error: {0}")]
    Llm(#[from] continuity_llm::ProviderError),
}

pub type Result<T> = std::result::Result<T, TopicError>;
