//! Message-window engine: pairing, retention, and task-claim tracking for
//! one session's recent conversation turns.

mod error;
mod manager;
mod types;

pub use error::{Result, WindowError};
pub use manager::WindowEngine;
pub use types::{pair_flush, InboundMessage};
