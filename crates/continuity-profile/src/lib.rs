//! User-profile worker (component C): incremental merge of a session's
//! structured portrait from `role=user` text via one LLM call per job.

mod error;
mod merge;
mod prompt;
mod types;
mod worker;

pub use error::{ProfileError, Result};
pub use merge::merge_portrait;
pub use prompt::build_prompt;
pub use types::ProfileJobPayload;
pub use worker::ProfileWorker;
