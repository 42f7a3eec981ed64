//! OpenAI-compatible (chat completions) client for text generation.
//!
//! Endpoint derived from `LlmModelConfig::endpoint`:
//! - POST {endpoint}/v1/chat/completions: chat completion (non-streaming)
//!
//! Constructor validation:
//! - `cfg.provider` must be `LlmProvider::OpenAI`
//! - `cfg.api_key` must be present
//! - `cfg.endpoint` must start with http:// or https://

use std::time::Duration;

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ProviderError, ProviderErrorKind},
    response::{Candidate, ModelResponse},
    services::{post_json, timeout_of, validated_base},
    text_model::{GenerateFuture, GenerationOptions, PromptShape, TextModel},
};

/// Thin client for the OpenAI API.
///
/// Internally keeps a preconfigured `reqwest::Client` (with timeout and
/// default headers).
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
    timeout: Duration,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not OpenAI
    /// - `MissingApiKey` if `cfg.api_key` is `None`
    /// - `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        // 1) Provider must be OpenAI.
        if cfg.provider != LlmProvider::OpenAI {
            return Err(
                ProviderError::new(LlmProvider::OpenAI, ProviderErrorKind::InvalidProvider).into(),
            );
        }

        // 2) API key must be present.
        let api_key = cfg
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::new(LlmProvider::OpenAI, ProviderErrorKind::MissingApiKey)
            })?;

        // 3) Endpoint must use http/https.
        let base = validated_base(LlmProvider::OpenAI, &cfg.endpoint)?;

        // 4) HTTP client: timeout + default headers.
        let timeout = timeout_of(cfg.timeout_secs);

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", api_key.trim())).map_err(|e| {
                ProviderError::new(
                    LlmProvider::OpenAI,
                    ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
                )
            })?,
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let url_chat = format!("{base}/v1/chat/completions");

        info!(
            provider = %cfg.provider,
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = timeout.as_secs(),
            "OpenAiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
            timeout,
        })
    }

    /// Performs a **non-streaming** chat completion request.
    ///
    /// `Plain` maps `temperature` and `max_tokens`; `Wrapped` sends only the
    /// model and a single user message.
    async fn chat(
        &self,
        shape: PromptShape<'_>,
        opts: GenerationOptions,
    ) -> Result<ModelResponse, AiLlmError> {
        let prompt = shape.prompt();
        let body = match shape {
            PromptShape::Plain(_) => ChatCompletionRequest {
                model: &self.cfg.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
                temperature: opts.temperature.or(self.cfg.temperature),
                max_tokens: opts.max_output_tokens.or(self.cfg.max_tokens),
            },
            PromptShape::Wrapped(_) => ChatCompletionRequest {
                model: &self.cfg.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
                temperature: None,
                max_tokens: None,
            },
        };

        let value = post_json(
            &self.client,
            LlmProvider::OpenAI,
            &self.url_chat,
            &body,
            self.timeout,
        )
        .await?;

        // Typed decode when the payload looks like a chat completion; anything
        // else goes through the generic shape classifier.
        match serde_json::from_value::<ChatCompletionResponse>(value.clone()) {
            Ok(out) => Ok(ModelResponse::Candidates(
                out.choices
                    .into_iter()
                    .map(|c| Candidate::Attributes {
                        content: c.message.as_ref().and_then(|m| m.content.clone()),
                        message: None,
                        text: c.text,
                    })
                    .collect(),
            )),
            Err(_) => Ok(ModelResponse::from_json(value)),
        }
    }
}

impl TextModel for OpenAiService {
    fn provider(&self) -> LlmProvider {
        LlmProvider::OpenAI
    }

    fn model(&self) -> &str {
        &self.cfg.model
    }

    fn generate<'a>(&'a self, shape: PromptShape<'a>, opts: GenerationOptions) -> GenerateFuture<'a> {
        Box::pin(self.chat(shape, opts))
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Minimal request body for `/v1/chat/completions` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatMessageOut>,
    /// Legacy completions put the text here.
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    use super::*;

    fn cfg(endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: "gpt-4o-mini".into(),
            endpoint: endpoint.into(),
            api_key: Some("sk-test".into()),
            max_tokens: Some(600),
            temperature: Some(0.0),
            timeout_secs: Some(5),
        }
    }

    #[tokio::test]
    async fn chat_completion_yields_attribute_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "{\"a\":1}" } }]
            })))
            .mount(&server)
            .await;

        let svc = OpenAiService::new(cfg(&server.uri())).unwrap();
        let resp = svc
            .generate(PromptShape::Plain("hi"), GenerationOptions::default())
            .await
            .unwrap();
        assert!(matches!(resp, ModelResponse::Candidates(ref c) if matches!(c[0], Candidate::Attributes { .. })));
        assert_eq!(resp.extract_text(), "{\"a\":1}");
    }

    #[tokio::test]
    async fn unexpected_payload_is_kept_raw() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output": "weird" })))
            .mount(&server)
            .await;

        let svc = OpenAiService::new(cfg(&server.uri())).unwrap();
        let resp = svc
            .generate(PromptShape::Wrapped("hi"), GenerationOptions::default())
            .await
            .unwrap();
        assert!(matches!(resp, ModelResponse::Other(_)));
    }

    #[test]
    fn missing_key_fails() {
        let mut c = cfg("https://api.openai.com");
        c.api_key = None;
        assert!(OpenAiService::new(c).is_err());
    }
}
