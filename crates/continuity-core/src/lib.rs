pub mod config;
pub mod error;
pub mod keywords;
pub mod node;
pub mod salvage;
pub mod template;
pub mod types;

pub use config::{activate_cap, ContinuityConfig, RetentionConfig};
pub use error::{CoreError, Result};
pub use node::Node;
pub use types::{generate_session_id, SessionId, TaskId};
