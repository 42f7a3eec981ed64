//! Runtime configuration loaded from environment variables.

use std::time::Duration;

use ai_llm_service::{
    ConfigError, LlmModelConfig, config_from_lookup, error_handler::validate_range_f32,
};

use crate::error::TriageError;

const DEFAULT_TOP_K: usize = 3;
const DEFAULT_RETRIES: u32 = 2;
const DEFAULT_BACKOFF_MS: u64 = 1000;
const DEFAULT_MAX_TOKENS: u32 = 600;

/// Config bag for the pipeline. All fields have defaults via `from_env`.
#[derive(Clone, Debug)]
pub struct TriageConfig {
    /// Provider/model selection for the gateway.
    pub llm: LlmModelConfig,

    /// KB hits embedded in the prompt and attached to the result.
    pub top_k: usize,

    // Gateway knobs
    pub retries: u32,
    pub backoff_unit: Duration,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl TriageConfig {
    /// Build from the process environment.
    ///
    /// # Errors
    /// Malformed numbers and unknown providers are startup errors; a missing
    /// credential is not.
    pub fn from_env() -> Result<Self, TriageError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`TriageConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TriageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        let llm = config_from_lookup(&get)?;

        let temperature = parse("LLM_TEMPERATURE", get("LLM_TEMPERATURE"), 0.0f32)?;
        validate_range_f32("LLM_TEMPERATURE", temperature, 0.0, 2.0)?;

        Ok(Self {
            top_k: parse("TRIAGE_TOP_K", get("TRIAGE_TOP_K"), DEFAULT_TOP_K)?,
            retries: parse("LLM_RETRIES", get("LLM_RETRIES"), DEFAULT_RETRIES)?,
            backoff_unit: Duration::from_millis(parse(
                "LLM_BACKOFF_MS",
                get("LLM_BACKOFF_MS"),
                DEFAULT_BACKOFF_MS,
            )?),
            max_output_tokens: llm.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature,
            llm,
        })
    }
}

fn parse<T: std::str::FromStr>(
    var: &'static str,
    value: Option<String>,
    dflt: T,
) -> Result<T, TriageError> {
    match value {
        Some(v) => v.trim().parse().map_err(|_| {
            TriageError::from(ai_llm_service::AiLlmError::from(ConfigError::InvalidNumber {
                var,
                reason: "not a valid number",
            }))
        }),
        None => Ok(dflt),
    }
}
