use continuity_events::{EventJobPayload, EventWorker};
use continuity_queue::QueueMessage;

use crate::worker::pool::JobProcessor;

pub struct EventProcessor {
    pub worker: EventWorker,
}

#[async_trait::async_trait]
impl JobProcessor for EventProcessor {
    fn name(&self) -> &str {
        "event"
    }

    async fn handle(&self, msg: &QueueMessage) -> anyhow::Result<()> {
        let payload: EventJobPayload = serde_json::from_value(msg.payload.clone())?;
        self.worker
            .process(&payload.session_id, &payload.turns)
            .await?;
        Ok(())
    }
}
