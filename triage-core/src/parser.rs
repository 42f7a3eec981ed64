//! Extracts a JSON object from free-form model output.
//!
//! Order of attempts:
//! 1. the whole text as strict JSON
//! 2. the span from the first `{` to the last `}`
//! 3. that span after repairs (single → double quotes, trailing commas dropped)
//!
//! Only JSON objects are accepted. Field validation is left to the caller.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

static TRAILING_COMMA_OBJ: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\}").expect("static regex"));
static TRAILING_COMMA_ARR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\]").expect("static regex"));

/// Returns the structured object embedded in `text`, or `None`.
pub fn parse_structured(text: &str) -> Option<Map<String, Value>> {
    if text.trim().is_empty() {
        return None;
    }
    if let Some(obj) = strict_object(text) {
        return Some(obj);
    }

    let candidate = outer_braces(text)?;
    strict_object(candidate).or_else(|| strict_object(&repair(candidate)))
}

fn strict_object(s: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(m)) => Some(m),
        _ => None,
    }
}

fn outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn repair(candidate: &str) -> String {
    let quoted = candidate.replace('\'', "\"");
    let no_obj_commas = TRAILING_COMMA_OBJ.replace_all(&quoted, "}");
    TRAILING_COMMA_ARR
        .replace_all(&no_obj_commas, "]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn as_value(m: Map<String, Value>) -> Value {
        Value::Object(m)
    }

    #[test]
    fn strict_json_object() {
        let v = json!({"summary": "x", "known_issue": true, "n": [1, 2]});
        let parsed = parse_structured(&v.to_string()).unwrap();
        assert_eq!(as_value(parsed), v);
    }

    #[test]
    fn prose_around_object() {
        let body = json!({"category": "Bug", "severity": "High"});
        let text = format!("Sure! {body} Thanks.");
        assert_eq!(as_value(parse_structured(&text).unwrap()), body);
    }

    #[test]
    fn fenced_multiline_object() {
        let text = "```json\n{\n  \"summary\": \"a\",\n  \"severity\": \"Low\"\n}\n```";
        let parsed = parse_structured(text).unwrap();
        assert_eq!(parsed["severity"], "Low");
    }

    #[test]
    fn single_quotes_and_trailing_commas() {
        let text = "Here you go: {'summary': 'x', 'tags': ['a', 'b',], 'known_issue': true,}";
        let parsed = parse_structured(text).unwrap();
        assert_eq!(parsed["summary"], "x");
        assert_eq!(parsed["tags"], json!(["a", "b"]));
        assert_eq!(parsed["known_issue"], true);
    }

    #[test]
    fn non_object_json_is_rejected() {
        assert!(parse_structured("[1, 2, 3]").is_none());
        assert!(parse_structured("\"just a string\"").is_none());
    }

    #[test]
    fn hopeless_text_is_none() {
        assert!(parse_structured("").is_none());
        assert!(parse_structured("   ").is_none());
        assert!(parse_structured("no braces here").is_none());
        assert!(parse_structured("} backwards {").is_none());
        assert!(parse_structured("{not: json at all").is_none());
        assert!(parse_structured("{ totally :: broken }").is_none());
    }
}
