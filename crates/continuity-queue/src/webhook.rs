//! Fire-and-forget webhook alerting — dead-letter notices and queue-length
//! alarms both flow through this one client.
//!
//! Grounded on the inbound HMAC verification this codebase's HTTP template
//! uses for webhook ingestion (`hmac`/`sha2`/`hex`), reused here in the
//! outbound direction: if a signing secret is configured, every alert body
//! carries an `X-Continuity-Signature-256` header so the receiving endpoint
//! can verify it came from this service.

use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use tokio::sync::mpsc;
use tracing::{error, warn};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Serialize)]
pub struct DeadLetterAlert {
    pub task_id: String,
    pub session_id: String,
    pub queue: String,
    pub retry: u32,
    pub payload_summary: String,
    pub last_error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueLengthAlert {
    pub queue: String,
    pub length: usize,
    pub threshold: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WebhookAlert {
    DeadLetter(DeadLetterAlert),
    QueueLength(QueueLengthAlert),
}

/// Posts alerts to a configured URL without blocking the caller.
///
/// Internally a single-slot buffered channel feeds a background task that
/// does the actual HTTP POST — callers use `notify` which never awaits I/O,
/// matching the spec's "fire-and-forget 1-slot buffered channel" design.
#[derive(Clone)]
pub struct WebhookClient {
    tx: Option<mpsc::Sender<WebhookAlert>>,
}

impl WebhookClient {
    /// Spawn the background delivery task. `url` being `None` degrades to
    /// logging alerts instead of posting them.
    pub fn spawn(url: Option<String>, signing_secret: Option<String>) -> Self {
        let Some(url) = url else {
            return Self { tx: None };
        };

        let (tx, mut rx) = mpsc::channel::<WebhookAlert>(1);
        tokio::spawn(async move {
            let client = reqwest::Client::new();
            while let Some(alert) = rx.recv().await {
                if let Err(e) = deliver(&client, &url, signing_secret.as_deref(), &alert).await {
                    error!(error = %e, "webhook delivery failed");
                }
            }
        });

        Self { tx: Some(tx) }
    }

    /// Enqueue an alert for delivery. Non-blocking: if the single slot is
    /// full the alert is dropped with a warning rather than backing up the
    /// caller, since alerting is best-effort observability, not a guarantee.
    pub fn notify(&self, alert: WebhookAlert) {
        match &self.tx {
            Some(tx) => {
                if tx.try_send(alert).is_err() {
                    warn!("webhook alert channel full or closed; alert dropped");
                }
            }
            None => warn!(?alert, "webhook alerting disabled; logging alert instead"),
        }
    }
}

async fn deliver(
    client: &reqwest::Client,
    url: &str,
    signing_secret: Option<&str>,
    alert: &WebhookAlert,
) -> Result<(), reqwest::Error> {
    let body = serde_json::to_vec(alert).unwrap_or_default();
    let mut req = client
        .post(url)
        .header("content-type", "application/json");

    if let Some(secret) = signing_secret {
        if let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) {
            mac.update(&body);
            let sig = hex::encode(mac.finalize().into_bytes());
            req = req.header("X-Continuity-Signature-256", format!("sha256={sig}"));
        }
    }

    req.body(body).send().await?.error_for_status()?;
    Ok(())
}
