//! Model gateway: one prompt in, plain text out.
//!
//! Live mode calls the configured [`TextModel`] with bounded retries:
//! - a request-shape rejection is answered by one `Wrapped` call, no sleep
//! - any other failure sleeps `unit * (1 + attempt * 2)` before the next attempt
//! - exhausting the budget yields `None`; the pipeline owns the next fallback
//!
//! Degraded mode (no client could be built) answers immediately with the
//! keyword-rule classification of the ticket serialized as JSON.

use std::{sync::Arc, time::Duration};

use ai_llm_service::{
    GenerationOptions, LlmModelConfig, ModelResponse, PromptShape, TextModel, build_text_model,
};
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::{prompt::Prompt, rules};

/// Per-call knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallOptions {
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Extra attempts after the first one.
    pub retries: u32,
}

enum Mode {
    Live(Arc<dyn TextModel>),
    Degraded { reason: String },
}

pub struct ModelGateway {
    mode: Mode,
    backoff_unit: Duration,
}

impl ModelGateway {
    pub fn live(model: Arc<dyn TextModel>, backoff_unit: Duration) -> Self {
        Self {
            mode: Mode::Live(model),
            backoff_unit,
        }
    }

    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            mode: Mode::Degraded {
                reason: reason.into(),
            },
            backoff_unit: Duration::ZERO,
        }
    }

    /// Builds the provider client, or falls back to degraded mode when the
    /// credential is missing or construction fails.
    pub fn from_config(cfg: &LlmModelConfig, backoff_unit: Duration) -> Self {
        if cfg.provider.requires_api_key() && !cfg.has_credential() {
            warn!(provider = %cfg.provider, "no credential configured, using rule-based replies");
            return Self::degraded(format!("{} credential missing", cfg.provider));
        }
        match build_text_model(cfg.clone()) {
            Ok(model) => {
                info!(provider = %model.provider(), model = %model.model(), "model gateway live");
                Self::live(model, backoff_unit)
            }
            Err(e) => {
                warn!(error = %e, "model client unavailable, using rule-based replies");
                Self::degraded(e.to_string())
            }
        }
    }

    /// `"live"` or `"degraded"`.
    pub fn mode_name(&self) -> &'static str {
        match self.mode {
            Mode::Live(_) => "live",
            Mode::Degraded { .. } => "degraded",
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.mode, Mode::Degraded { .. })
    }

    /// Returns the model's reply text, or `None` once every attempt failed.
    pub async fn call(&self, prompt: &Prompt, opts: CallOptions) -> Option<String> {
        let model = match &self.mode {
            Mode::Live(model) => model,
            Mode::Degraded { reason } => {
                debug!(%reason, "degraded gateway reply");
                return serde_json::to_string(&rules::classify(&prompt.subject)).ok();
            }
        };

        let gen_opts = GenerationOptions {
            max_output_tokens: Some(opts.max_output_tokens),
            temperature: Some(opts.temperature),
        };

        for attempt in 0..=opts.retries {
            let started = Instant::now();
            match model.generate(PromptShape::Plain(&prompt.text), gen_opts).await {
                Ok(resp) => return Some(self.accept(resp, attempt, started, "plain")),
                Err(e) if e.is_request_shape() => {
                    warn!(attempt, error = %e, "request shape rejected, trying wrapped prompt");
                    match model.generate(PromptShape::Wrapped(&prompt.text), gen_opts).await {
                        Ok(resp) => return Some(self.accept(resp, attempt, started, "wrapped")),
                        Err(e) => warn!(attempt, error = %e, "wrapped prompt failed"),
                    }
                }
                Err(e) => {
                    warn!(attempt, error = %e, "model call failed");
                    if attempt < opts.retries {
                        let delay = self.backoff_unit * (1 + attempt * 2);
                        debug!(attempt, delay_ms = delay.as_millis() as u64, "backing off");
                        sleep(delay).await;
                    }
                }
            }
        }

        warn!(attempts = opts.retries + 1, "model call budget exhausted");
        None
    }

    fn accept(&self, resp: ModelResponse, attempt: u32, started: Instant, shape: &str) -> String {
        let text = resp.extract_text();
        if let Mode::Live(model) = &self.mode {
            info!(
                provider = %model.provider(),
                model = %model.model(),
                attempt,
                shape,
                latency_ms = started.elapsed().as_millis() as u64,
                reply_len = text.len(),
                "model replied"
            );
        }
        text
    }
}
