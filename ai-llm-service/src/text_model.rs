//! The seam between the triage gateway and a concrete provider.

use std::{future::Future, pin::Pin, sync::Arc};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::Result,
    response::ModelResponse,
    services::{
        gemini_service::GeminiService, ollama_service::OllamaService,
        open_ai_service::OpenAiService,
    },
};

/// How the prompt is put on the wire.
///
/// `Plain` is the full request with generation options. `Wrapped` is the
/// provider's minimal body carrying nothing but the prompt; it is the
/// alternate shape tried once when `Plain` is rejected as malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptShape<'a> {
    Plain(&'a str),
    Wrapped(&'a str),
}

impl<'a> PromptShape<'a> {
    pub fn prompt(&self) -> &'a str {
        match self {
            PromptShape::Plain(p) | PromptShape::Wrapped(p) => p,
        }
    }
}

/// Per-call generation knobs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GenerationOptions {
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

pub type GenerateFuture<'a> = Pin<Box<dyn Future<Output = Result<ModelResponse>> + Send + 'a>>;

/// A text-in, text-out model.
///
/// Implement this trait to plug in another backend (or a scripted fake in tests).
pub trait TextModel: Send + Sync {
    fn provider(&self) -> LlmProvider;

    fn model(&self) -> &str;

    /// Sends one request and returns the reply in whatever shape it came.
    fn generate<'a>(&'a self, shape: PromptShape<'a>, opts: GenerationOptions) -> GenerateFuture<'a>;
}

/// Constructs the client for `cfg.provider`.
///
/// # Errors
/// Propagates client construction errors (missing credential, bad endpoint,
/// HTTP client build failure).
pub fn build_text_model(cfg: LlmModelConfig) -> Result<Arc<dyn TextModel>> {
    let model: Arc<dyn TextModel> = match cfg.provider {
        LlmProvider::Gemini => Arc::new(GeminiService::new(cfg)?),
        LlmProvider::OpenAI => Arc::new(OpenAiService::new(cfg)?),
        LlmProvider::Ollama => Arc::new(OllamaService::new(cfg)?),
    };
    Ok(model)
}
