use continuity_profile::{ProfileJobPayload, ProfileWorker};
use continuity_queue::QueueMessage;

use crate::worker::pool::JobProcessor;

pub struct ProfileProcessor {
    pub worker: ProfileWorker,
}

#[async_trait::async_trait]
impl JobProcessor for ProfileProcessor {
    fn name(&self) -> &str {
        "profile"
    }

    async fn handle(&self, msg: &QueueMessage) -> anyhow::Result<()> {
        let payload: ProfileJobPayload = serde_json::from_value(msg.payload.clone())?;
        self.worker
            .process(&payload.session_id, &payload.user_texts)
            .await?;
        Ok(())
    }
}
