//! Typed errors for the triage-core crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriageError {
    /// KB snapshot access failed. The only failure a triage run propagates.
    #[error("KB error: {0}")]
    Kb(#[from] kb_index::KbError),

    /// Model configuration could not be resolved at startup.
    #[error("LLM error: {0}")]
    Llm(#[from] ai_llm_service::AiLlmError),
}

/// A parsed model object that does not fit the classification schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("missing or non-string field `{0}`")]
    Missing(&'static str),

    #[error("invalid value for `{field}`: {value}")]
    Invalid { field: &'static str, value: String },
}
