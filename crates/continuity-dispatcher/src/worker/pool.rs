use std::sync::Arc;

use continuity_queue::{DeadLetterAlert, Queue, QueueMessage, WebhookAlert, WebhookClient};
use tokio::sync::watch;
use tracing::{error, info, warn};

/// One unit of queue-driven work. Implemented once per derivation worker
/// (dispatch/profile/topic/event) so [`run_worker_pool`] can share the
/// dequeue/retry/dead-letter loop across all four instead of each worker
/// hand-rolling its own tick.
#[async_trait::async_trait]
pub trait JobProcessor: Send + Sync + 'static {
    /// Human-readable name used in log fields only.
    fn name(&self) -> &str;

    /// Handle one job. `Err` triggers the retry/dead-letter path; the
    /// returned error is only used for logging.
    async fn handle(&self, msg: &QueueMessage) -> anyhow::Result<()>;
}

/// Spawn `workers` tokio tasks, each polling `queue` on its own tick
/// interval until `shutdown` broadcasts `true`. A job that fails is
/// requeued with an incremented retry counter up to `max_retry`, then
/// dead-lettered (alerted via `webhook`, dropped from the queue).
///
/// Grounded on `SchedulerEngine::run`'s tick-interval `tokio::select!` loop,
/// adapted to a pull-based dequeue-until-empty-per-tick model since
/// [`Queue`] is pull-based rather than push/mpsc-driven.
pub fn spawn_worker_pool<P: JobProcessor>(
    processor: Arc<P>,
    queue: Queue,
    workers: usize,
    max_retry: u32,
    webhook: WebhookClient,
    shutdown: watch::Receiver<bool>,
) -> Vec<tokio::task::JoinHandle<()>> {
    (0..workers.max(1))
        .map(|worker_idx| {
            let processor = processor.clone();
            let queue = queue.clone();
            let webhook = webhook.clone();
            let mut shutdown = shutdown.clone();
            tokio::spawn(async move {
                info!(worker = processor.name(), worker_idx, "worker started");
                let mut tick = tokio::time::interval(std::time::Duration::from_millis(200));
                loop {
                    tokio::select! {
                        _ = tick.tick() => {
                            drain_queue(&processor, &queue, max_retry, &webhook).await;
                        }
                        _ = shutdown.changed() => {
                            if *shutdown.borrow() {
                                info!(worker = processor.name(), worker_idx, "worker shutting down");
                                break;
                            }
                        }
                    }
                }
            })
        })
        .collect()
}

async fn drain_queue<P: JobProcessor>(
    processor: &Arc<P>,
    queue: &Queue,
    max_retry: u32,
    webhook: &WebhookClient,
) {
    loop {
        let msg = match queue.dequeue() {
            Ok(Some(msg)) => msg,
            Ok(None) => return,
            Err(e) => {
                error!(worker = processor.name(), error = %e, "dequeue failed");
                return;
            }
        };

        if let Err(e) = processor.handle(&msg).await {
            warn!(
                worker = processor.name(),
                task_id = %msg.task_id,
                session_id = %msg.session_id,
                retry = msg.retry,
                error = %e,
                "job processing failed"
            );
            if msg.retry >= max_retry {
                webhook.notify(WebhookAlert::DeadLetter(DeadLetterAlert {
                    task_id: msg.task_id.clone(),
                    session_id: msg.session_id.clone(),
                    queue: queue.name().to_string(),
                    retry: msg.retry,
                    payload_summary: msg.payload.to_string(),
                    last_error: e.to_string(),
                }));
                error!(
                    worker = processor.name(),
                    task_id = %msg.task_id,
                    "job dead-lettered after exceeding max retry"
                );
            } else if let Err(e) = queue.requeue_with_retry(msg) {
                error!(worker = processor.name(), error = %e, "requeue failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    struct AlwaysFails {
        attempts: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl JobProcessor for AlwaysFails {
        fn name(&self) -> &str {
            "always-fails"
        }

        async fn handle(&self, _msg: &QueueMessage) -> anyhow::Result<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("synthetic failure")
        }
    }

    struct AlwaysSucceeds;

    #[async_trait::async_trait]
    impl JobProcessor for AlwaysSucceeds {
        fn name(&self) -> &str {
            "always-succeeds"
        }

        async fn handle(&self, _msg: &QueueMessage) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn test_queue(name: &str) -> Queue {
        let conn = std::sync::Arc::new(StdMutex::new(rusqlite::Connection::open_in_memory().unwrap()));
        Queue::new(conn, name).unwrap()
    }

    #[tokio::test]
    async fn successful_job_is_removed_from_the_queue() {
        let queue = test_queue("q");
        queue
            .enqueue(&QueueMessage::new("sess", serde_json::json!({})))
            .unwrap();
        let processor = Arc::new(AlwaysSucceeds);
        let webhook = WebhookClient::spawn(None, None);

        drain_queue(&processor, &queue, 3, &webhook).await;

        assert_eq!(queue.length().unwrap(), 0);
    }

    #[tokio::test]
    async fn failing_job_is_requeued_with_incremented_retry_until_dead_lettered() {
        let queue = test_queue("q");
        queue
            .enqueue(&QueueMessage::new("sess", serde_json::json!({})))
            .unwrap();
        let processor = Arc::new(AlwaysFails {
            attempts: AtomicUsize::new(0),
        });
        let webhook = WebhookClient::spawn(None, None);

        // max_retry=1: first drain fails and requeues (retry 0 -> 1), second
        // drain fails again and, since retry(1) >= max_retry(1), dead-letters
        // instead of requeuing.
        drain_queue(&processor, &queue, 1, &webhook).await;
        assert_eq!(queue.length().unwrap(), 1);

        drain_queue(&processor, &queue, 1, &webhook).await;
        assert_eq!(queue.length().unwrap(), 0);
        assert_eq!(processor.attempts.load(Ordering::SeqCst), 2);
    }
}
