//! Scripted [`TextModel`] for gateway and pipeline tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use ai_llm_service::{
    AiLlmError, GenerateFuture, GenerationOptions, LlmProvider, ModelResponse, PromptShape,
    ProviderError, ProviderErrorKind, TextModel, error_handler::HttpError,
};

/// Which shape a recorded call used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Plain,
    Wrapped,
}

/// Replays scripted replies in order; once the script runs out every call
/// fails with a timeout.
#[derive(Default)]
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<ModelResponse, AiLlmError>>>,
    calls: Mutex<Vec<(Shape, String)>>,
}

impl ScriptedModel {
    pub fn new(script: Vec<Result<ModelResponse, AiLlmError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(Shape, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl TextModel for ScriptedModel {
    fn provider(&self) -> LlmProvider {
        LlmProvider::Gemini
    }

    fn model(&self) -> &str {
        "scripted"
    }

    fn generate<'a>(&'a self, shape: PromptShape<'a>, _opts: GenerationOptions) -> GenerateFuture<'a> {
        let kind = match shape {
            PromptShape::Plain(_) => Shape::Plain,
            PromptShape::Wrapped(_) => Shape::Wrapped,
        };
        self.calls
            .lock()
            .unwrap()
            .push((kind, shape.prompt().to_string()));
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(transient()));
        Box::pin(async move { next })
    }
}

pub fn text(s: &str) -> Result<ModelResponse, AiLlmError> {
    Ok(ModelResponse::Text(s.to_string()))
}

pub fn transient() -> AiLlmError {
    AiLlmError::Timeout(Duration::from_secs(60))
}

pub fn rejected_shape() -> AiLlmError {
    ProviderError::new(
        LlmProvider::Gemini,
        ProviderErrorKind::RequestShape(HttpError {
            status: reqwest::StatusCode::BAD_REQUEST,
            url: "http://fake/generate".into(),
            snippet: "unknown field".into(),
        }),
    )
    .into()
}
