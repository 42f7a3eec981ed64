//! Immutable known-issue index: records plus their TF-IDF rows.

use serde::Serialize;
use tracing::debug;

use crate::record::KnownIssueRecord;
use crate::tfidf::{TfIdfModel, cosine};

/// A record returned from search with its similarity score.
///
/// Serializes flat: the record fields followed by `match_score`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub record: KnownIssueRecord,
    /// Similarity in `[0, 1]`, rounded to 3 decimals.
    pub match_score: f64,
}

/// One built snapshot of the KB.
///
/// Row `i` of the matrix always describes `records[i]`. The matrix is `None`
/// when there are no records or when no record yields a single token.
#[derive(Debug, Clone, Default)]
pub struct KbIndex {
    records: Vec<KnownIssueRecord>,
    texts_lower: Vec<String>,
    matrix: Option<TfIdfModel>,
}

impl KbIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds searchable text for every record and fits the TF-IDF matrix
    /// over the whole corpus.
    pub fn build(records: Vec<KnownIssueRecord>) -> Self {
        if records.is_empty() {
            return Self::empty();
        }
        let texts: Vec<String> = records.iter().map(|r| r.searchable_text()).collect();
        let matrix = TfIdfModel::fit(&texts);
        if matrix.is_none() {
            debug!(records = records.len(), "empty vocabulary, keyword overlap only");
        }
        let texts_lower = texts.iter().map(|t| t.to_lowercase()).collect();
        Self {
            records,
            texts_lower,
            matrix,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[KnownIssueRecord] {
        &self.records
    }

    /// Number of TF-IDF columns; `0` when no matrix was built.
    pub fn vocabulary_len(&self) -> usize {
        self.matrix.as_ref().map_or(0, TfIdfModel::vocabulary_len)
    }

    pub fn has_matrix(&self) -> bool {
        self.matrix.is_some()
    }

    /// Returns up to `k` hits ordered by descending score; equal scores keep
    /// record order.
    pub fn search(&self, query: &str, k: usize) -> Vec<SearchHit> {
        if k == 0 || self.records.is_empty() {
            return Vec::new();
        }

        let scores = match &self.matrix {
            Some(m) => {
                let q = m.transform(query);
                m.rows().iter().map(|row| cosine(&q, row)).collect()
            }
            None => self.overlap_scores(query),
        };

        let mut ranked: Vec<(usize, f64)> = scores.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        ranked
            .into_iter()
            .take(k)
            .map(|(i, score)| SearchHit {
                record: self.records[i].clone(),
                match_score: round3(score),
            })
            .collect()
    }

    /// 1.0 when any whitespace token of the lowercased query occurs inside the
    /// record text, else 0.0.
    fn overlap_scores(&self, query: &str) -> Vec<f64> {
        let q = query.to_lowercase();
        let tokens: Vec<&str> = q.split_whitespace().collect();
        self.texts_lower
            .iter()
            .map(|text| {
                if tokens.iter().any(|t| text.contains(t)) {
                    1.0
                } else {
                    0.0
                }
            })
            .collect()
    }
}

fn round3(x: f64) -> f64 {
    ((x * 1000.0).round() / 1000.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, title: &str, symptoms: &[&str], content: &str) -> KnownIssueRecord {
        KnownIssueRecord {
            id: id.into(),
            title: title.into(),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            content: content.into(),
        }
    }

    fn sample() -> Vec<KnownIssueRecord> {
        vec![
            rec(
                "A",
                "Checkout fails on mobile",
                &["500", "mobile"],
                "Payment service returns error 500 during checkout from the mobile app.",
            ),
            rec(
                "B",
                "SMS login code not delivered",
                &["sms", "otp"],
                "Some carriers delay one-time passwords sent by SMS.",
            ),
            rec(
                "C",
                "CSV export times out",
                &["export", "timeout"],
                "Large exports exceed the gateway timeout.",
            ),
        ]
    }

    #[test]
    fn checkout_query_ranks_a_first() {
        let idx = KbIndex::build(sample());
        let hits = idx.search("checkout error 500 mobile", 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].record.id, "A");
        assert!(hits[0].match_score > 0.0);
    }

    #[test]
    fn hits_are_bounded_sorted_and_in_range() {
        let idx = KbIndex::build(sample());
        for q in ["sms otp", "export", "nothing matches here", "", "timeout export sms 500"] {
            for k in [1, 2, 3, 10] {
                let hits = idx.search(q, k);
                assert!(hits.len() <= k);
                assert!(hits.windows(2).all(|w| w[0].match_score >= w[1].match_score));
                assert!(hits.iter().all(|h| (0.0..=1.0).contains(&h.match_score)));
            }
        }
    }

    #[test]
    fn zero_scores_keep_record_order() {
        let idx = KbIndex::build(sample());
        let ids: Vec<_> = idx
            .search("unrelated words", 3)
            .into_iter()
            .map(|h| h.record.id)
            .collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn empty_index_returns_nothing() {
        let idx = KbIndex::empty();
        assert!(idx.search("checkout", 3).is_empty());
        assert!(!idx.has_matrix());
        assert_eq!(idx.vocabulary_len(), 0);
    }

    #[test]
    fn k_zero_returns_nothing() {
        assert!(KbIndex::build(sample()).search("checkout", 0).is_empty());
    }

    #[test]
    fn stop_word_corpus_uses_keyword_overlap() {
        let idx = KbIndex::build(vec![
            rec("X", "the", &[], "and of"),
            rec("Y", "it is", &[], "a"),
        ]);
        assert!(!idx.has_matrix());
        let hits = idx.search("Is it", 2);
        assert_eq!(hits[0].record.id, "Y");
        assert_eq!(hits[0].match_score, 1.0);
        assert_eq!(hits[1].match_score, 0.0);
    }

    #[test]
    fn hit_serializes_flat() {
        let idx = KbIndex::build(sample());
        let hit = &idx.search("sms", 1)[0];
        let v = serde_json::to_value(hit).unwrap();
        assert_eq!(v["id"], "B");
        assert!(v["symptoms"].is_array());
        assert!(v["match_score"].as_f64().unwrap() > 0.0);
    }
}
