//! Google Gemini client for text generation.
//!
//! Endpoint derived from `LlmModelConfig::endpoint`:
//! - POST {endpoint}/v1beta/models/{model}:generateContent
//!
//! Constructor validation:
//! - `cfg.provider` must be `LlmProvider::Gemini`
//! - `cfg.api_key` must be present (sent as `x-goog-api-key`)
//! - `cfg.endpoint` must start with http:// or https://

use std::time::Duration;

use reqwest::header;
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ProviderError, ProviderErrorKind},
    response::ModelResponse,
    services::{post_json, timeout_of, validated_base},
    text_model::{GenerateFuture, GenerationOptions, PromptShape, TextModel},
};

/// Thin client for the Gemini REST API.
#[derive(Debug)]
pub struct GeminiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_generate: String,
    timeout: Duration,
}

impl GeminiService {
    /// Creates a new [`GeminiService`] from the given config.
    ///
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not Gemini
    /// - `MissingApiKey` if no credential is configured
    /// - `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Gemini {
            return Err(
                ProviderError::new(LlmProvider::Gemini, ProviderErrorKind::InvalidProvider).into(),
            );
        }

        let api_key = cfg
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::new(LlmProvider::Gemini, ProviderErrorKind::MissingApiKey)
            })?;

        let base = validated_base(LlmProvider::Gemini, &cfg.endpoint)?;
        let timeout = timeout_of(cfg.timeout_secs);

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            header::HeaderValue::from_str(api_key.trim()).map_err(|e| {
                ProviderError::new(
                    LlmProvider::Gemini,
                    ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
                )
            })?,
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let url_generate = format!("{base}/v1beta/models/{}:generateContent", cfg.model);

        info!(
            provider = %cfg.provider,
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = timeout.as_secs(),
            "GeminiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_generate,
            timeout,
        })
    }

    #[instrument(skip_all, fields(model = %self.cfg.model))]
    async fn generate_content(
        &self,
        shape: PromptShape<'_>,
        opts: GenerationOptions,
    ) -> Result<ModelResponse, AiLlmError> {
        let value = match shape {
            PromptShape::Plain(prompt) => {
                let body = GenerateContentRequest::plain(&self.cfg, prompt, opts);
                post_json(&self.client, LlmProvider::Gemini, &self.url_generate, &body, self.timeout)
                    .await?
            }
            PromptShape::Wrapped(prompt) => {
                let body = GenerateContentRequest::wrapped(prompt);
                post_json(&self.client, LlmProvider::Gemini, &self.url_generate, &body, self.timeout)
                    .await?
            }
        };
        Ok(ModelResponse::from_json(value))
    }
}

impl TextModel for GeminiService {
    fn provider(&self) -> LlmProvider {
        LlmProvider::Gemini
    }

    fn model(&self) -> &str {
        &self.cfg.model
    }

    fn generate<'a>(&'a self, shape: PromptShape<'a>, opts: GenerationOptions) -> GenerateFuture<'a> {
        Box::pin(self.generate_content(shape, opts))
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl<'a> GenerateContentRequest<'a> {
    fn plain(cfg: &LlmModelConfig, prompt: &'a str, opts: GenerationOptions) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: Some(GenerationConfig {
                max_output_tokens: opts.max_output_tokens.or(cfg.max_tokens),
                temperature: opts.temperature.or(cfg.temperature),
            }),
        }
    }

    fn wrapped(prompt: &'a str) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![Part { text: prompt }],
            }],
            generation_config: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}
