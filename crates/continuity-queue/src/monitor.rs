use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::{engine::Queue, webhook::{QueueLengthAlert, WebhookAlert, WebhookClient}};

/// Periodically samples a queue's length and fires a webhook alert when it
/// crosses `threshold`. One monitor per queue, matching the spec's
/// per-queue background sampling task.
pub struct QueueMonitor {
    queue: Queue,
    threshold: usize,
    interval: Duration,
    webhook: WebhookClient,
}

impl QueueMonitor {
    pub fn new(queue: Queue, threshold: usize, interval: Duration, webhook: WebhookClient) -> Self {
        Self {
            queue,
            threshold,
            interval,
            webhook,
        }
    }

    /// Run until `shutdown` broadcasts `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut tick = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    self.sample();
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }

    fn sample(&self) {
        match self.queue.length() {
            Ok(len) => {
                info!(queue = %self.queue.name(), length = len, "queue length sample");
                if len > self.threshold {
                    warn!(queue = %self.queue.name(), length = len, threshold = self.threshold, "queue length over threshold");
                    self.webhook.notify(WebhookAlert::QueueLength(QueueLengthAlert {
                        queue: self.queue.name().to_string(),
                        length: len,
                        threshold: self.threshold,
                    }));
                }
            }
            Err(e) => warn!(queue = %self.queue.name(), error = %e, "queue length sample failed"),
        }
    }
}
