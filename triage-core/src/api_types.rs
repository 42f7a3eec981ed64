//! Public result types re-used by external crates (e.g., the HTTP API layer).

use std::fmt;

use kb_index::SearchHit;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::pipeline::Transition;

/// Max characters kept in a summary.
pub const SUMMARY_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Billing,
    Login,
    Performance,
    Bug,
    #[serde(rename = "Question/How-To")]
    QuestionHowTo,
    Account,
    Technical,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Billing,
        Category::Login,
        Category::Performance,
        Category::Bug,
        Category::QuestionHowTo,
        Category::Account,
        Category::Technical,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Billing => "Billing",
            Category::Login => "Login",
            Category::Performance => "Performance",
            Category::Bug => "Bug",
            Category::QuestionHowTo => "Question/How-To",
            Category::Account => "Account",
            Category::Technical => "Technical",
            Category::Other => "Other",
        }
    }

    /// Case-insensitive label match; anything unrecognised maps to `Other`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
            .unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five structured fields produced by the model or the rule classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub summary: String,
    pub category: Category,
    pub severity: Severity,
    pub known_issue: bool,
    pub suggested_action: String,
}

impl Classification {
    /// Coerces a parsed model object into a classification.
    ///
    /// - `summary` and `suggested_action` must be strings; summary is cut to
    ///   [`SUMMARY_MAX_CHARS`]
    /// - unknown categories become `Other`
    /// - `severity` must name one of the four levels
    /// - `known_issue` accepts a bool or `"true"`/`"false"`
    pub fn from_model_value(obj: &Map<String, Value>) -> Result<Self, SchemaError> {
        let summary = str_field(obj, "summary")?;
        let suggested_action = str_field(obj, "suggested_action")?;

        let category = obj
            .get("category")
            .and_then(Value::as_str)
            .map_or(Category::Other, Category::from_label);

        let severity_raw = str_field(obj, "severity")?;
        let severity = Severity::from_label(severity_raw).ok_or_else(|| SchemaError::Invalid {
            field: "severity",
            value: severity_raw.to_string(),
        })?;

        let known_issue = match obj.get("known_issue") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
            Some(other) => {
                return Err(SchemaError::Invalid {
                    field: "known_issue",
                    value: other.to_string(),
                });
            }
            None => return Err(SchemaError::Missing("known_issue")),
        };

        Ok(Self {
            summary: truncate_chars(summary.trim(), SUMMARY_MAX_CHARS),
            category,
            severity,
            known_issue,
            suggested_action: suggested_action.trim().to_string(),
        })
    }
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &'static str) -> Result<&'a str, SchemaError> {
    obj.get(key)
        .and_then(Value::as_str)
        .ok_or(SchemaError::Missing(key))
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Final triage answer: the classification with the KB hits appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageResult {
    #[serde(flatten)]
    pub classification: Classification,
    pub kb_hits: Vec<SearchHit>,
}

/// Which path produced the classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    /// First model reply parsed.
    Model,
    /// Reply to the stricter retry prompt parsed.
    StrictRetry,
    /// First reply recovered after the retry failed.
    Recovered,
    /// Keyword rules.
    RuleFallback,
}

/// Result plus the audit trail of how it was obtained.
#[derive(Debug, Clone)]
pub struct TriageOutcome {
    pub result: TriageResult,
    pub source: ResultSource,
    pub trace: Vec<Transition>,
}
