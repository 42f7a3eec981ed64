//! Provider configs resolved from environment variables.
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_PROVIDER`     = `gemini` (default) | `openai` | `ollama`
//! - `LLM_MAX_TOKENS`   = optional max output tokens (u32, default 600)
//! - `LLM_TIMEOUT_SECS` = optional transport timeout (u64, default 60)
//!
//! Gemini:
//! - `GOOGLE_API_KEY` = credential (absent → caller runs in degraded mode)
//! - `GOOGLE_MODEL`   = model id (default `gemini-2.5-flash`)
//! - `GEMINI_URL`     = REST base (default Google endpoint)
//!
//! OpenAI-compatible:
//! - `OPENAI_API_KEY`, `OPENAI_MODEL` (default `gpt-4o-mini`), `OPENAI_URL`
//!
//! Ollama:
//! - `OLLAMA_URL` or `OLLAMA_PORT`, `OLLAMA_MODEL` (default `qwen3:14b`)
//!
//! A missing credential is never an error here: the config is returned with
//! `api_key: None` and the caller decides how to degrade.

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{ConfigError, Result, opt_u32, opt_u64, validate_http_endpoint},
};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen3:14b";

const DEFAULT_MAX_TOKENS: u32 = 600;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Resolves the model config from the process environment.
///
/// # Errors
/// - [`ConfigError::UnsupportedProvider`] for an unknown `LLM_PROVIDER`
/// - [`ConfigError::InvalidNumber`] for malformed numeric knobs
/// - [`ConfigError::InvalidFormat`] for an endpoint without http/https scheme
pub fn config_from_env() -> Result<LlmModelConfig> {
    config_from_lookup(|name| std::env::var(name).ok())
}

/// Same as [`config_from_env`], reading variables through `lookup`.
///
/// Blank values are treated as unset.
pub fn config_from_lookup<F>(lookup: F) -> Result<LlmModelConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let provider = match get("LLM_PROVIDER") {
        Some(raw) => raw.parse::<LlmProvider>()?,
        None => LlmProvider::Gemini,
    };

    let max_tokens = opt_u32("LLM_MAX_TOKENS", get("LLM_MAX_TOKENS"))?.unwrap_or(DEFAULT_MAX_TOKENS);
    let timeout_secs =
        opt_u64("LLM_TIMEOUT_SECS", get("LLM_TIMEOUT_SECS"))?.unwrap_or(DEFAULT_TIMEOUT_SECS);

    let (model, endpoint, api_key) = match provider {
        LlmProvider::Gemini => (
            get("GOOGLE_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            endpoint_or(get("GEMINI_URL"), "GEMINI_URL", DEFAULT_GEMINI_URL)?,
            get("GOOGLE_API_KEY"),
        ),
        LlmProvider::OpenAI => (
            get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            endpoint_or(get("OPENAI_URL"), "OPENAI_URL", DEFAULT_OPENAI_URL)?,
            get("OPENAI_API_KEY"),
        ),
        LlmProvider::Ollama => (
            get("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            ollama_endpoint(get("OLLAMA_URL"), get("OLLAMA_PORT"))?,
            None,
        ),
    };

    if model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: Some(max_tokens),
        temperature: Some(0.0),
        timeout_secs: Some(timeout_secs),
    })
}

fn endpoint_or(value: Option<String>, var: &'static str, default: &str) -> Result<String> {
    match value {
        Some(url) => {
            validate_http_endpoint(var, &url)?;
            Ok(url)
        }
        None => Ok(default.to_string()),
    }
}

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
/// 3. `http://localhost:11434`
fn ollama_endpoint(url: Option<String>, port: Option<String>) -> Result<String> {
    if let Some(url) = url {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = port {
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Ok("http://localhost:11434".to_string())
}
