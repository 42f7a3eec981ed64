//! Shapes a provider reply may take, and plain-text extraction from them.
//!
//! Providers differ in where the generated text lives: a direct text field
//! (Ollama `response`), a list of candidates (Gemini `candidates`, OpenAI
//! `choices`), or something else entirely. [`ModelResponse`] names the known
//! shapes and keeps an explicit arm for everything else, so extraction is a
//! `match` rather than a chain of field probes.

use serde_json::{Map, Value};

/// One reply from a text model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    /// The provider returned the generated text directly.
    Text(String),
    /// The provider returned a list of alternatives; the first one wins.
    Candidates(Vec<Candidate>),
    /// Unknown shape; stringified as a last resort.
    Other(Value),
}

/// One element of a candidates-like list.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    /// Raw JSON object as sent by the provider.
    Mapping(Map<String, Value>),
    /// Typed candidate decoded by a provider client.
    Attributes {
        content: Option<String>,
        message: Option<String>,
        text: Option<String>,
    },
}

impl ModelResponse {
    /// Classifies a raw JSON payload.
    ///
    /// - a string `text` or `response` field → [`ModelResponse::Text`]
    /// - a `candidates` or `choices` array → [`ModelResponse::Candidates`]
    /// - anything else → [`ModelResponse::Other`]
    pub fn from_json(value: Value) -> Self {
        if let Some(obj) = value.as_object() {
            for key in ["text", "response"] {
                if let Some(Value::String(s)) = obj.get(key) {
                    return ModelResponse::Text(s.clone());
                }
            }
            for key in ["candidates", "choices"] {
                if let Some(Value::Array(items)) = obj.get(key) {
                    let candidates = items
                        .iter()
                        .map(|item| match item {
                            Value::Object(map) => Candidate::Mapping(map.clone()),
                            Value::String(s) => Candidate::Attributes {
                                content: None,
                                message: None,
                                text: Some(s.clone()),
                            },
                            other => {
                                let mut map = Map::new();
                                map.insert("content".into(), other.clone());
                                Candidate::Mapping(map)
                            }
                        })
                        .collect();
                    return ModelResponse::Candidates(candidates);
                }
            }
        }
        ModelResponse::Other(value)
    }

    /// Extracts plain text, trimmed.
    ///
    /// Preference order: direct text, then `content`/`message`/`text` of the
    /// first candidate, then the stringified response. A first candidate that
    /// carries none of those fields yields an empty string.
    pub fn extract_text(&self) -> String {
        match self {
            ModelResponse::Text(s) if !s.trim().is_empty() => s.trim().to_string(),
            ModelResponse::Candidates(list) if !list.is_empty() => {
                list[0].text().map(|s| s.trim().to_string()).unwrap_or_default()
            }
            other => other.stringify(),
        }
    }

    fn stringify(&self) -> String {
        match self {
            ModelResponse::Text(s) => s.trim().to_string(),
            ModelResponse::Candidates(_) => "[]".to_string(),
            ModelResponse::Other(Value::String(s)) => s.trim().to_string(),
            ModelResponse::Other(v) => v.to_string(),
        }
    }
}

impl Candidate {
    /// First non-empty of `content`, `message`, `text`.
    pub fn text(&self) -> Option<String> {
        match self {
            Candidate::Mapping(map) => ["content", "message", "text"]
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(value_text),
            Candidate::Attributes {
                content,
                message,
                text,
            } => [content, message, text]
                .into_iter()
                .flatten()
                .find(|s| !s.trim().is_empty())
                .cloned(),
        }
    }
}

/// Pulls text out of a nested value.
///
/// Handles plain strings, `{parts: [{text}]}` (Gemini content),
/// `{content: ...}` (chat messages) and `{text: ...}`.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) => {
            if let Some(Value::Array(parts)) = map.get("parts") {
                let joined: String = parts.iter().filter_map(value_text).collect();
                return (!joined.trim().is_empty()).then_some(joined);
            }
            ["content", "text"]
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(value_text)
        }
        Value::Array(items) => {
            let joined: String = items.iter().filter_map(value_text).collect();
            (!joined.trim().is_empty()).then_some(joined)
        }
        _ => None,
    }
}
