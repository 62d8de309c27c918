//! Key-event worker (component E): extract timestamped events from
//! conversation turns and classify them past vs. future.

mod error;
mod prompt;
mod timestamp;
mod types;
mod worker;

pub use error::{EventError, Result};
pub use timestamp::parse_event_timestamp;
pub use types::{EventJobPayload, EventTurn};
pub use worker::EventWorker;
