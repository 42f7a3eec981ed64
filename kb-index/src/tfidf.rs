//! Sparse TF-IDF model.
//!
//! Weighting:
//! - raw term counts per document
//! - smoothed idf: `ln((1 + n) / (1 + df)) + 1`
//! - every row L2-normalized
//!
//! Vocabulary indices follow sorted term order so a rebuild over the same
//! corpus yields identical vectors.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::tokenize::tokenize;

/// Sparse vector with entries sorted by column index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|(_, v)| *v == 0.0)
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
    }

    /// Scales to unit length; zero vectors are left untouched.
    pub fn normalize(&mut self) {
        let n = self.norm();
        if n > 0.0 {
            for (_, v) in &mut self.entries {
                *v /= n;
            }
        }
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j, mut acc) = (0, 0, 0.0);
        while i < self.entries.len() && j < other.entries.len() {
            let (ci, vi) = self.entries[i];
            let (cj, vj) = other.entries[j];
            match ci.cmp(&cj) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    acc += vi * vj;
                    i += 1;
                    j += 1;
                }
            }
        }
        acc
    }
}

/// Cosine similarity; `0.0` when either side is a zero vector.
pub fn cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 { 0.0 } else { a.dot(b) / denom }
}

/// Fitted TF-IDF weights plus one normalized row per document.
#[derive(Debug, Clone)]
pub struct TfIdfModel {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<SparseVector>,
}

impl TfIdfModel {
    /// Fits the model over `docs`.
    ///
    /// Returns `None` when no document contributes a single token (empty
    /// corpus or stop words only).
    pub fn fit(docs: &[String]) -> Option<Self> {
        let counts: Vec<BTreeMap<String, usize>> = docs.iter().map(|d| term_counts(d)).collect();

        let terms: BTreeSet<&str> = counts
            .iter()
            .flat_map(|c| c.keys().map(String::as_str))
            .collect();
        if terms.is_empty() {
            return None;
        }

        let vocabulary: HashMap<String, usize> = terms
            .iter()
            .enumerate()
            .map(|(i, t)| ((*t).to_owned(), i))
            .collect();

        let mut df = vec![0usize; vocabulary.len()];
        for c in &counts {
            for term in c.keys() {
                if let Some(&i) = vocabulary.get(term) {
                    df[i] += 1;
                }
            }
        }

        let n = docs.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let mut model = Self {
            vocabulary,
            idf,
            rows: Vec::with_capacity(counts.len()),
        };
        model.rows = counts.iter().map(|c| model.weigh(c)).collect();
        Some(model)
    }

    /// Projects `text` onto the fitted vocabulary. Unknown terms are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        self.weigh(&term_counts(text))
    }

    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    fn weigh(&self, counts: &BTreeMap<String, usize>) -> SparseVector {
        let mut entries: Vec<(usize, f64)> = counts
            .iter()
            .filter_map(|(term, &tf)| {
                self.vocabulary
                    .get(term)
                    .map(|&i| (i, tf as f64 * self.idf[i]))
            })
            .collect();
        entries.sort_by_key(|(i, _)| *i);
        let mut v = SparseVector { entries };
        v.normalize();
        v
    }
}

fn term_counts(text: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for t in tokenize(text) {
        *counts.entry(t).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rows_are_unit_length() {
        let m = TfIdfModel::fit(&docs(&["checkout error 500", "login otp sms"])).unwrap();
        for row in m.rows() {
            assert!((row.norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn vocabulary_is_sorted() {
        let m = TfIdfModel::fit(&docs(&["zeta alpha", "mid"])).unwrap();
        assert_eq!(m.vocabulary_len(), 3);
        assert_eq!(m.vocabulary["alpha"], 0);
        assert_eq!(m.vocabulary["mid"], 1);
        assert_eq!(m.vocabulary["zeta"], 2);
    }

    #[test]
    fn smoothed_idf_values() {
        let m = TfIdfModel::fit(&docs(&["shared rare", "shared"])).unwrap();
        let shared = m.idf[m.vocabulary["shared"]];
        let rare = m.idf[m.vocabulary["rare"]];
        assert!((shared - 1.0).abs() < 1e-12);
        assert!((rare - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn stop_word_corpus_has_no_model() {
        assert!(TfIdfModel::fit(&docs(&["the and of", "it is"])).is_none());
        assert!(TfIdfModel::fit(&[]).is_none());
    }

    #[test]
    fn unknown_query_is_zero_vector() {
        let m = TfIdfModel::fit(&docs(&["checkout error"])).unwrap();
        let q = m.transform("completely different words");
        assert!(q.is_zero());
        assert_eq!(cosine(&q, &m.rows()[0]), 0.0);
    }

    #[test]
    fn identical_text_scores_one() {
        let m = TfIdfModel::fit(&docs(&["checkout error 500", "login otp"])).unwrap();
        let q = m.transform("checkout error 500");
        assert!((cosine(&q, &m.rows()[0]) - 1.0).abs() < 1e-9);
    }
}
