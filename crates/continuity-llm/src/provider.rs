use async_trait::async_trait;

/// One text-completion call: a system instruction plus a user prompt.
/// Workers render their own prompt text (template fill, portrait JSON,
/// etc.) and pass the finished strings in — the provider does no templating.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    /// Reasoning-effort hint (`"low"`, `"medium"`, `"high"`). Workers that
    /// only need a quick structured-JSON answer (profile merge, topic
    /// extraction) pass `"low"`; providers that don't support the concept
    /// silently ignore it.
    pub reasoning_effort: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub model: String,
    pub tokens_in: u32,
    pub tokens_out: u32,
}

/// Common interface for all LLM providers. Only one concrete implementation
/// ships here ([`crate::openai::OpenAiProvider`]); the trait exists so
/// workers depend on an abstraction rather than a transport.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },
}
