//! Prompt builder: instructions, ticket text, KB matches and the response format.

use kb_index::SearchHit;

const TASK: &str =
    "You are an assistant that extracts structured triage info from a support ticket description.";

const RESPONSE_FORMAT: &str = "Respond ONLY with a JSON object with these fields:
summary: one-line summary string,
category: one of [Billing, Login, Performance, Bug, Question/How-To, Account, Technical, Other],
severity: one of [Low, Medium, High, Critical],
known_issue: boolean,
suggested_action: one-line suggested next action.

IMPORTANT: Reply only with the JSON object (no surrounding explanation).";

const STRICT_RETRY: &str = "\n\nIf you previously returned anything other than pure JSON, reply ONLY with the JSON object now. Do not include any commentary.";

/// A prompt plus the ticket text it was built for.
///
/// `subject` is what the gateway classifies with keyword rules when no model
/// is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub subject: String,
}

impl Prompt {
    /// The same prompt with the "reply only with JSON" directive appended.
    pub fn with_strict_retry(&self) -> Prompt {
        Prompt {
            text: format!("{}{STRICT_RETRY}", self.text),
            subject: self.subject.clone(),
        }
    }
}

/// Builds the triage prompt for `description` and its KB matches.
pub fn build_prompt(description: &str, hits: &[SearchHit]) -> Prompt {
    let kb_block = if hits.is_empty() {
        "(none)\n".to_string()
    } else {
        hits.iter()
            .map(|h| {
                format!(
                    "- {}: {} (symptoms: {})",
                    h.record.id,
                    h.record.title,
                    h.record.symptoms.join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut out = String::new();
    out.push_str(TASK);
    out.push_str("\n\nTicket description:\n");
    out.push_str(description);
    out.push_str("\n\nKnown-issues (top matches):\n");
    out.push_str(&kb_block);
    out.push_str("\n\n");
    out.push_str(RESPONSE_FORMAT);

    Prompt {
        text: out,
        subject: description.to_string(),
    }
}
