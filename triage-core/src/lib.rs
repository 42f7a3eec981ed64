//! Ticket triage: KB retrieval + model classification with a rule fallback.
//!
//! Public API: [`TriageService::triage`]. It searches the KB for the ticket,
//! builds the prompt, drives the model through the [`pipeline`] state machine
//! and attaches the KB hits to whatever classification came out.

pub mod api_types;
pub mod cfg;
mod error;
pub mod gateway;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod rules;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use kb_index::KbStore;
use tracing::{info, instrument};

pub use api_types::{
    Category, Classification, ResultSource, Severity, TriageOutcome, TriageResult,
};
pub use cfg::TriageConfig;
pub use error::{SchemaError, TriageError};
pub use gateway::{CallOptions, ModelGateway};

/// Composition root for triage runs. Cheap to share behind an `Arc`.
pub struct TriageService {
    kb: Arc<KbStore>,
    gateway: ModelGateway,
    top_k: usize,
    call: CallOptions,
}

impl TriageService {
    pub fn new(kb: Arc<KbStore>, gateway: ModelGateway, top_k: usize, call: CallOptions) -> Self {
        Self {
            kb,
            gateway,
            top_k,
            call,
        }
    }

    /// Wires the gateway from `cfg`. A missing credential yields a degraded
    /// gateway, not an error.
    pub fn from_config(cfg: &TriageConfig, kb: Arc<KbStore>) -> Self {
        let gateway = ModelGateway::from_config(&cfg.llm, cfg.backoff_unit);
        let call = CallOptions {
            max_output_tokens: cfg.max_output_tokens,
            temperature: cfg.temperature,
            retries: cfg.retries,
        };
        Self::new(kb, gateway, cfg.top_k, call)
    }

    pub fn kb(&self) -> &Arc<KbStore> {
        &self.kb
    }

    pub fn gateway(&self) -> &ModelGateway {
        &self.gateway
    }

    /// Triages one ticket description.
    ///
    /// # Errors
    /// Only KB snapshot access can fail; model and parsing problems end in
    /// the rule-based classification.
    #[instrument(skip_all, fields(desc_len = description.len()))]
    pub async fn triage(&self, description: &str) -> Result<TriageOutcome, TriageError> {
        let kb_hits = self.kb.search(description, self.top_k)?;
        let prompt = prompt::build_prompt(description, &kb_hits);

        let (classification, source, trace) =
            pipeline::run(&self.gateway, &prompt, self.call).await;

        info!(
            ?source,
            category = %classification.category,
            severity = %classification.severity,
            kb_hits = kb_hits.len(),
            "ticket triaged"
        );

        Ok(TriageOutcome {
            result: TriageResult {
                classification,
                kb_hits,
            },
            source,
            trace,
        })
    }
}
