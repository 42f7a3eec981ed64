use crate::config::llm_provider::LlmProvider;

/// Configuration for a text model invocation.
///
/// # Fields
///
/// - `provider`: Which backend to use (Gemini, OpenAI, Ollama).
/// - `model`: The model identifier (e.g., `"gemini-2.5-flash"`).
/// - `endpoint`: Base URL of the provider API.
/// - `api_key`: Credential; `None` means the provider may be unusable.
/// - `max_tokens`: Default maximum output length.
/// - `temperature`: Default sampling temperature.
/// - `timeout_secs`: Per-request transport timeout.
///
/// # Examples
///
/// ```
/// use ai_llm_service::{LlmModelConfig, LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Gemini,
///     model: "gemini-2.5-flash".to_string(),
///     endpoint: "https://generativelanguage.googleapis.com".to_string(),
///     api_key: None,
///     max_tokens: Some(600),
///     temperature: Some(0.0),
///     timeout_secs: Some(60),
/// };
/// assert!(!cfg.has_credential());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The provider/backend.
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// Provider base URL.
    pub endpoint: String,

    /// Optional API key for authentication.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// `true` when a non-blank credential is present.
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}
