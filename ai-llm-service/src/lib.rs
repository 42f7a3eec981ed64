//! Text-generation transport shared by the triage pipeline.
//!
//! - [`config`] resolves an [`LlmModelConfig`] from environment variables.
//! - [`services`] holds one thin HTTP client per provider.
//! - [`text_model::TextModel`] is the seam the gateway talks to; every provider
//!   implements it and returns a [`ModelResponse`].
//! - [`response`] models the shapes a provider reply may take and extracts
//!   plain text from them.
//! - [`telemetry`] provides a fmt layer scoped to the workspace crates.

pub mod config;
pub mod error_handler;
pub mod response;
pub mod services;
pub mod telemetry;
pub mod text_model;

pub use config::{
    default_config::{config_from_env, config_from_lookup},
    llm_model_config::LlmModelConfig,
    llm_provider::LlmProvider,
};
pub use error_handler::{AiLlmError, ConfigError, ProviderError, ProviderErrorKind, Result};
pub use response::{Candidate, ModelResponse};
pub use text_model::{GenerateFuture, GenerationOptions, PromptShape, TextModel, build_text_model};
