use serde::Deserialize;

/// Request payload for /triage.
#[derive(Debug, Deserialize)]
pub struct TriageRequest {
    /// Free-text ticket description.
    pub description: String,
}
