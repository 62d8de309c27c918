use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

// Retention / cadence constants — defaults match the reference deployment.
pub const DEFAULT_MAX_RETRY: u32 = 3;
pub const DEFAULT_QUEUE_MAXLEN: usize = 80;
pub const DEFAULT_MONITOR_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_MAX_TOPIC_COUNT: usize = 60;
pub const DEFAULT_USER_ROUND: u64 = 1;
pub const DEFAULT_EVENT_ROUND: u64 = 5;
pub const DEFAULT_TOPIC_ROUND: u64 = 1;
pub const DEFAULT_CLEAR_ROUND: u64 = 15;
pub const DEFAULT_PROJECT_MESSAGES_COUNT: usize = 10;
pub const DEFAULT_TOPIC_SCORE_THRESHOLD: f64 = 3.0;

/// Top-level config (continuity.toml + CONTINUITY_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuityConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl Default for ContinuityConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            dispatcher: DispatcherConfig::default(),
            llm: LlmConfig {
                base_url: default_llm_base_url(),
                api_key: "change-me".to_string(),
                model: default_llm_model(),
                temperature: default_temperature(),
                reasoning_effort: default_reasoning_effort(),
                request_timeout_secs: default_llm_timeout(),
            },
            webhook: WebhookConfig::default(),
            retention: RetentionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Bearer token every HTTP endpoint requires in `Authorization: Bearer <token>`.
    #[serde(default = "default_auth_token")]
    pub auth_token: String,
    #[serde(default = "default_dispatcher_workers")]
    pub dispatcher_workers: usize,
    #[serde(default = "default_worker_pool_size")]
    pub profile_workers: usize,
    #[serde(default = "default_worker_pool_size")]
    pub topic_workers: usize,
    #[serde(default = "default_worker_pool_size")]
    pub event_workers: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            auth_token: default_auth_token(),
            dispatcher_workers: default_dispatcher_workers(),
            profile_workers: default_worker_pool_size(),
            topic_workers: default_worker_pool_size(),
            event_workers: default_worker_pool_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// `minimal`, `low`, `medium`, `high` — forwarded verbatim to the provider.
    #[serde(default = "default_reasoning_effort")]
    pub reasoning_effort: String,
    #[serde(default = "default_llm_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WebhookConfig {
    /// Dead-letter / alert webhook URL. `None` disables alerting (logged only).
    pub url: Option<String>,
    /// Optional HMAC-SHA256 secret used to sign outbound alert payloads via
    /// an `X-Continuity-Signature-256` header, mirroring the inbound scheme
    /// this codebase's template uses for verifying webhooks.
    pub signing_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    #[serde(default = "default_max_retry")]
    pub max_retry: u32,
    #[serde(default = "default_queue_maxlen")]
    pub queue_maxlen: usize,
    #[serde(default = "default_monitor_interval_secs")]
    pub monitor_interval_secs: u64,
    #[serde(default = "default_max_topic_count")]
    pub max_topic_count: usize,
    #[serde(default = "default_user_round")]
    pub user_round: u64,
    #[serde(default = "default_event_round")]
    pub event_round: u64,
    #[serde(default = "default_topic_round")]
    pub topic_round: u64,
    #[serde(default = "default_clear_round")]
    pub clear_round: u64,
    #[serde(default = "default_project_messages_count")]
    pub project_messages_count: usize,
    #[serde(default = "default_topic_score_threshold")]
    pub topic_score_threshold: f64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_retry: default_max_retry(),
            queue_maxlen: default_queue_maxlen(),
            monitor_interval_secs: default_monitor_interval_secs(),
            max_topic_count: default_max_topic_count(),
            user_round: default_user_round(),
            event_round: default_event_round(),
            topic_round: default_topic_round(),
            clear_round: default_clear_round(),
            project_messages_count: default_project_messages_count(),
            topic_score_threshold: default_topic_score_threshold(),
        }
    }
}

fn default_port() -> u16 {
    8080
}
fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_auth_token() -> String {
    "change-me".to_string()
}
fn default_dispatcher_workers() -> usize {
    20
}
fn default_worker_pool_size() -> usize {
    20
}
fn default_llm_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_reasoning_effort() -> String {
    "minimal".to_string()
}
fn default_llm_timeout() -> u64 {
    30
}
fn default_max_retry() -> u32 {
    DEFAULT_MAX_RETRY
}
fn default_queue_maxlen() -> usize {
    DEFAULT_QUEUE_MAXLEN
}
fn default_monitor_interval_secs() -> u64 {
    DEFAULT_MONITOR_INTERVAL_SECS
}
fn default_max_topic_count() -> usize {
    DEFAULT_MAX_TOPIC_COUNT
}
fn default_user_round() -> u64 {
    DEFAULT_USER_ROUND
}
fn default_event_round() -> u64 {
    DEFAULT_EVENT_ROUND
}
fn default_topic_round() -> u64 {
    DEFAULT_TOPIC_ROUND
}
fn default_clear_round() -> u64 {
    DEFAULT_CLEAR_ROUND
}
fn default_project_messages_count() -> usize {
    DEFAULT_PROJECT_MESSAGES_COUNT
}
fn default_topic_score_threshold() -> f64 {
    DEFAULT_TOPIC_SCORE_THRESHOLD
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.continuity/continuity.db", home)
}
fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.continuity/continuity.toml", home)
}

impl ContinuityConfig {
    /// Load config from a TOML file with `CONTINUITY_*` env var overrides.
    ///
    /// Checks in order: explicit path argument, then `~/.continuity/continuity.toml`.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: ContinuityConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("CONTINUITY_").split("_"))
            .extract()
            .map_err(|e| CoreError::Config(e.to_string()))?;

        Ok(config)
    }
}

/// `activate_cap(n)` — the ceiling on `|active_topics|` for a session with
/// `n` total topics. Flat below 10, then half-rate growth above.
pub fn activate_cap(topic_count: usize) -> usize {
    if topic_count <= 10 {
        topic_count
    } else {
        10 + (topic_count - 10) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_cap_is_identity_below_ten() {
        assert_eq!(activate_cap(0), 0);
        assert_eq!(activate_cap(10), 10);
    }

    #[test]
    fn activate_cap_halves_growth_above_ten() {
        // 30 -> 10 + floor(0.5 * 20) = 20, matching scenario 5 in the spec.
        assert_eq!(activate_cap(30), 20);
        assert_eq!(activate_cap(11), 10);
        assert_eq!(activate_cap(12), 11);
    }
}
