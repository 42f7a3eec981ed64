//! Keyword rules used whenever no model classification is available.
//!
//! Both the gateway's degraded mode and the pipeline's final fallback call
//! [`classify`]; there is no second copy of these rules.

use crate::api_types::{Category, Classification, SUMMARY_MAX_CHARS, Severity, truncate_chars};

const SUMMARY_HEAD_CHARS: usize = 120;
const KNOWN_ISSUE_MARKERS: [&str; 5] = ["500", "payment", "timeout", "sms", "export"];

pub const ACTION_ESCALATE: &str = "Escalate to backend team";
pub const ACTION_ASK_LOGS: &str = "Ask customer for logs/screenshots";

/// Classifies a ticket description with ordered keyword checks.
pub fn classify(description: &str) -> Classification {
    let text = description.to_lowercase();
    let has = |needle: &str| text.contains(needle);

    let summary = if text.chars().count() > SUMMARY_HEAD_CHARS {
        format!("{}...", truncate_chars(&text, SUMMARY_HEAD_CHARS))
    } else {
        text.clone()
    };

    let category = if has("payment") || has("card") {
        Category::Billing
    } else if has("login") || has("password") {
        Category::Login
    } else if has("slow") || has("latency") || has("timeout") {
        Category::Performance
    } else if has("error") || has("500") {
        Category::Bug
    } else {
        Category::Technical
    };

    let severity = if has("500") || has("data loss") || has("unable") {
        Severity::High
    } else if has("error") || has("failed") {
        Severity::Medium
    } else {
        Severity::Low
    };

    let known_issue = KNOWN_ISSUE_MARKERS.iter().any(|k| has(k));

    let suggested_action = match severity {
        Severity::High | Severity::Critical => ACTION_ESCALATE,
        Severity::Low | Severity::Medium => ACTION_ASK_LOGS,
    };

    Classification {
        summary: truncate_chars(&summary, SUMMARY_MAX_CHARS),
        category,
        severity,
        known_issue,
        suggested_action: suggested_action.to_string(),
    }
}
