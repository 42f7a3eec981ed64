//! Triage run as an explicit state machine.
//!
//! ```text
//! Attempting ──ok──────────────────────────────────────────────► Done
//!     │ no object
//!     ▼
//! ParseFailed ─► Retrying ──ok─────────────────────────────────► Done
//!                   │ no object
//!                   ▼
//!               Recovering (first reply re-parsed) ──ok────────► Done
//!                   │ no object
//!                   ▼
//!               Fallback (keyword rules) ──────────────────────► Done
//! ```
//!
//! Every transition is logged under `triage_core::pipeline` and kept in the
//! run's trace.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    api_types::{Classification, ResultSource, truncate_chars},
    gateway::{CallOptions, ModelGateway},
    parser::parse_structured,
    prompt::Prompt,
    rules,
};

const RAW_LOG_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Attempting,
    ParseFailed,
    Retrying,
    Recovering,
    Fallback,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
}

enum Step {
    Attempting,
    ParseFailed,
    Retrying,
    Recovering,
    Fallback,
    Done(Classification, ResultSource),
}

impl Step {
    fn phase(&self) -> Phase {
        match self {
            Step::Attempting => Phase::Attempting,
            Step::ParseFailed => Phase::ParseFailed,
            Step::Retrying => Phase::Retrying,
            Step::Recovering => Phase::Recovering,
            Step::Fallback => Phase::Fallback,
            Step::Done(..) => Phase::Done,
        }
    }
}

/// Drives one ticket from first model call to a classification.
///
/// Never fails: every model or parsing problem ends in the rule fallback.
pub(crate) async fn run(
    gateway: &ModelGateway,
    prompt: &Prompt,
    opts: CallOptions,
) -> (Classification, ResultSource, Vec<Transition>) {
    let mut trace = Vec::new();
    let mut first_raw: Option<String> = None;
    let mut step = Step::Attempting;

    loop {
        let from = step.phase();
        let next = match step {
            Step::Done(classification, source) => return (classification, source, trace),

            Step::Attempting => {
                let raw = gateway.call(prompt, opts).await;
                let parsed = raw.as_deref().and_then(interpret);
                first_raw = raw;
                match parsed {
                    Some(c) => Step::Done(c, ResultSource::Model),
                    None => Step::ParseFailed,
                }
            }

            Step::ParseFailed => Step::Retrying,

            Step::Retrying => {
                let strict = prompt.with_strict_retry();
                match gateway.call(&strict, opts).await.as_deref().and_then(interpret) {
                    Some(c) => Step::Done(c, ResultSource::StrictRetry),
                    None => Step::Recovering,
                }
            }

            Step::Recovering => match first_raw.as_deref().and_then(interpret) {
                Some(c) => Step::Done(c, ResultSource::Recovered),
                None => {
                    warn!(
                        target: "triage_core::pipeline",
                        raw = %truncate_chars(first_raw.as_deref().unwrap_or(""), RAW_LOG_CHARS),
                        "could not parse model JSON"
                    );
                    Step::Fallback
                }
            },

            Step::Fallback => Step::Done(rules::classify(&prompt.subject), ResultSource::RuleFallback),
        };

        let to = next.phase();
        info!(target: "triage_core::pipeline", ?from, ?to, "transition");
        trace.push(Transition { from, to });
        step = next;
    }
}

/// Parses raw reply text and coerces it into a classification.
fn interpret(raw: &str) -> Option<Classification> {
    let obj = parse_structured(raw)?;
    match Classification::from_model_value(&obj) {
        Ok(c) => Some(c),
        Err(e) => {
            debug!(target: "triage_core::pipeline", error = %e, "model object rejected");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        api_types::{Category, Severity},
        prompt::build_prompt,
        testing::{ScriptedModel, text, transient},
    };

    const GOOD: &str = r#"{"summary":"Checkout broken","category":"Bug","severity":"High","known_issue":true,"suggested_action":"Escalate"}"#;

    fn opts() -> CallOptions {
        CallOptions {
            max_output_tokens: 600,
            temperature: 0.0,
            retries: 0,
        }
    }

    fn phases(trace: &[Transition]) -> Vec<Phase> {
        let mut out = vec![trace[0].from];
        out.extend(trace.iter().map(|t| t.to));
        out
    }

    #[tokio::test]
    async fn first_reply_parses() {
        let gw = ModelGateway::live(ScriptedModel::new(vec![text(GOOD)]), Duration::ZERO);
        let (c, source, trace) = run(&gw, &build_prompt("x", &[]), opts()).await;
        assert_eq!(source, ResultSource::Model);
        assert_eq!(c.category, Category::Bug);
        assert_eq!(phases(&trace), vec![Phase::Attempting, Phase::Done]);
    }

    #[tokio::test]
    async fn prose_then_strict_retry() {
        let model = ScriptedModel::new(vec![text("I think it's a bug."), text(GOOD)]);
        let gw = ModelGateway::live(model.clone(), Duration::ZERO);
        let (c, source, trace) = run(&gw, &build_prompt("x", &[]), opts()).await;
        assert_eq!(source, ResultSource::StrictRetry);
        assert_eq!(c.severity, Severity::High);
        assert_eq!(
            phases(&trace),
            vec![Phase::Attempting, Phase::ParseFailed, Phase::Retrying, Phase::Done]
        );
        let calls = model.calls();
        assert!(calls[1].1.ends_with("Do not include any commentary."));
    }

    #[tokio::test]
    async fn invalid_schema_counts_as_parse_failure() {
        let bad = r#"{"summary":"s","category":"Bug","severity":"Urgent","known_issue":true,"suggested_action":"a"}"#;
        let gw = ModelGateway::live(ScriptedModel::new(vec![text(bad), text(GOOD)]), Duration::ZERO);
        let (_, source, _) = run(&gw, &build_prompt("x", &[]), opts()).await;
        assert_eq!(source, ResultSource::StrictRetry);
    }

    #[tokio::test]
    async fn unreachable_model_falls_back_to_rules() {
        let model = ScriptedModel::new(vec![Err(transient()), Err(transient())]);
        let gw = ModelGateway::live(model, Duration::ZERO);
        let prompt = build_prompt("Unable to export report, timeout", &[]);
        let (c, source, trace) = run(&gw, &prompt, opts()).await;
        assert_eq!(source, ResultSource::RuleFallback);
        assert_eq!(c, rules::classify("Unable to export report, timeout"));
        assert_eq!(
            phases(&trace),
            vec![
                Phase::Attempting,
                Phase::ParseFailed,
                Phase::Retrying,
                Phase::Recovering,
                Phase::Fallback,
                Phase::Done
            ]
        );
    }

    #[tokio::test]
    async fn degraded_gateway_is_a_model_reply() {
        let gw = ModelGateway::degraded("no key");
        let (c, source, _) = run(&gw, &build_prompt("Password reset loop", &[]), opts()).await;
        assert_eq!(source, ResultSource::Model);
        assert_eq!(c.category, Category::Login);
    }
}
