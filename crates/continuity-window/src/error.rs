use thiserror::Error;

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("store error: {0}")]
    Store(#[from] continuity_store::StoreError),
}

pub type Result<T> = std::result::Result<T, WindowError>;
