//! Lightweight Ollama client for text generation.
//!
//! - `POST {endpoint}/api/generate`: synchronous text generation (`stream=false`)
//!
//! No credential is needed, so this provider never puts the gateway into
//! degraded mode by itself.

use std::time::Duration;

use serde::Serialize;
use tracing::instrument;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ProviderError, ProviderErrorKind},
    response::ModelResponse,
    services::{post_json, timeout_of, validated_base},
    text_model::{GenerateFuture, GenerationOptions, PromptShape, TextModel},
};

/// Thin client for Ollama.
pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_generate: String,
    timeout: Duration,
}

impl OllamaService {
    /// Creates a new [`OllamaService`] from the given config.
    ///
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not `Ollama`
    /// - `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(
                ProviderError::new(LlmProvider::Ollama, ProviderErrorKind::InvalidProvider).into(),
            );
        }

        let base = validated_base(LlmProvider::Ollama, &cfg.endpoint)?;
        let timeout = timeout_of(cfg.timeout_secs);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .brotli(true)
            .build()?;

        let url_generate = format!("{base}/api/generate");

        Ok(Self {
            client,
            cfg,
            url_generate,
            timeout,
        })
    }

    /// Performs a **non-streaming** generation request via `/api/generate`.
    ///
    /// Mapped options (`Plain` only):
    /// - `num_predict`  ← max output tokens
    /// - `temperature`  ← temperature
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    async fn generate_raw(
        &self,
        shape: PromptShape<'_>,
        opts: GenerationOptions,
    ) -> Result<ModelResponse, AiLlmError> {
        let options = match shape {
            PromptShape::Plain(_) => Some(GenerateOptions {
                temperature: opts.temperature.or(self.cfg.temperature),
                num_predict: opts.max_output_tokens.or(self.cfg.max_tokens),
            }),
            PromptShape::Wrapped(_) => None,
        };
        let body = GenerateRequest {
            model: &self.cfg.model,
            prompt: shape.prompt(),
            stream: false,
            options,
        };

        let value = post_json(
            &self.client,
            LlmProvider::Ollama,
            &self.url_generate,
            &body,
            self.timeout,
        )
        .await?;
        Ok(ModelResponse::from_json(value))
    }
}

impl TextModel for OllamaService {
    fn provider(&self) -> LlmProvider {
        LlmProvider::Ollama
    }

    fn model(&self) -> &str {
        &self.cfg.model
    }

    fn generate<'a>(&'a self, shape: PromptShape<'a>, opts: GenerationOptions) -> GenerateFuture<'a> {
        Box::pin(self.generate_raw(shape, opts))
    }
}

/* ==========================
HTTP payloads & options
========================== */

/// Request body for `/api/generate` (non-streaming).
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

/// Subset of Ollama `options`.
#[derive(Debug, Default, Serialize)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, method, path},
    };

    use super::*;
    use crate::error_handler::ProviderErrorKind;

    fn cfg(endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "qwen3:14b".into(),
            endpoint: endpoint.into(),
            api_key: None,
            max_tokens: Some(600),
            temperature: Some(0.0),
            timeout_secs: Some(5),
        }
    }

    #[tokio::test]
    async fn generate_reads_response_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({ "model": "qwen3:14b", "stream": false })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "response": "done", "done": true })),
            )
            .mount(&server)
            .await;

        let svc = OllamaService::new(cfg(&server.uri())).unwrap();
        let resp = svc
            .generate(PromptShape::Plain("x"), GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(resp.extract_text(), "done");
    }

    #[tokio::test]
    async fn unavailable_is_plain_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("loading model"))
            .mount(&server)
            .await;

        let svc = OllamaService::new(cfg(&server.uri())).unwrap();
        let err = svc
            .generate(PromptShape::Plain("x"), GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(!err.is_request_shape());
        assert!(matches!(
            err,
            AiLlmError::Provider(ref p) if matches!(p.kind, ProviderErrorKind::HttpStatus(_))
        ));
    }

    #[test]
    fn rejects_endpoint_without_scheme() {
        assert!(OllamaService::new(cfg("localhost:11434")).is_err());
    }
}
