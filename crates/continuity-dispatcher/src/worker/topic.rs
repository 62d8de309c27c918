use continuity_queue::QueueMessage;
use continuity_topics::{TopicJobPayload, TopicWorker};

use crate::worker::pool::JobProcessor;

pub struct TopicProcessor {
    pub worker: TopicWorker,
}

#[async_trait::async_trait]
impl JobProcessor for TopicProcessor {
    fn name(&self) -> &str {
        "topic"
    }

    async fn handle(&self, msg: &QueueMessage) -> anyhow::Result<()> {
        let payload: TopicJobPayload = serde_json::from_value(msg.payload.clone())?;
        self.worker
            .process(&payload.session_id, &payload.turns)
            .await?;
        Ok(())
    }
}
