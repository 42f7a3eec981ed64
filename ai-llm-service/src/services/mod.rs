//! Provider clients. Each one implements [`crate::TextModel`].

pub mod gemini_service;
pub mod ollama_service;
pub mod open_ai_service;

use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::{
    config::llm_provider::LlmProvider,
    error_handler::{
        AiLlmError, HttpError, ProviderError, ProviderErrorKind, Result, make_snippet, status_error,
    },
};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Validates the endpoint scheme and strips a trailing slash.
fn validated_base(provider: LlmProvider, endpoint: &str) -> Result<String> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
    {
        return Err(ProviderError::new(
            provider,
            ProviderErrorKind::InvalidEndpoint(endpoint.to_string()),
        )
        .into());
    }
    Ok(endpoint.trim_end_matches('/').to_string())
}

fn timeout_of(timeout_secs: Option<u64>) -> Duration {
    Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
}

/// POSTs `body` as JSON and decodes the reply into a raw JSON value.
///
/// Non-2xx statuses become [`ProviderErrorKind::RequestShape`] (400/422) or
/// [`ProviderErrorKind::HttpStatus`]; a timed-out request becomes
/// [`AiLlmError::Timeout`].
async fn post_json<B>(
    client: &reqwest::Client,
    provider: LlmProvider,
    url: &str,
    body: &B,
    timeout: Duration,
) -> Result<Value>
where
    B: Serialize + ?Sized,
{
    let started = Instant::now();
    debug!(%provider, "POST {url}");

    let resp = client.post(url).json(body).send().await.map_err(|e| {
        if e.is_timeout() {
            AiLlmError::Timeout(timeout)
        } else {
            AiLlmError::from(e)
        }
    })?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        let snippet = make_snippet(&text);

        error!(
            %provider,
            %status,
            %url,
            %snippet,
            latency_ms = started.elapsed().as_millis(),
            "provider returned non-success status"
        );

        return Err(status_error(
            provider,
            HttpError {
                status,
                url: url.to_string(),
                snippet,
            },
        )
        .into());
    }

    let value = resp.json::<Value>().await.map_err(|e| {
        ProviderError::new(
            provider,
            ProviderErrorKind::Decode(format!("serde error: {e}; expected a JSON body")),
        )
    })?;

    debug!(
        %provider,
        latency_ms = started.elapsed().as_millis(),
        "provider call completed"
    );

    Ok(value)
}
