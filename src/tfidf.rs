//! Term-frequency / inverse-document-frequency over a micro-corpus.
//!
//! A [`TfIdf`] table is built fresh per invocation from the exact texts in
//! scope (one document for key phrases, two for pairwise cosine), so there is
//! no hidden cross-call state. The idf is smoothed as `ln(1 + n/df)` so terms
//! shared by every document still carry weight and identical documents
//! produce identical non-zero vectors.

use std::collections::HashMap;

use crate::text;

/// TF-IDF table over a fixed set of documents.
#[derive(Debug)]
pub struct TfIdf {
    vectors: Vec<HashMap<String, f64>>,
}

impl TfIdf {
    /// Tokenize each text and build its weighted term vector.
    pub fn new(texts: &[&str]) -> Self {
        let n = texts.len();
        let token_lists: Vec<Vec<String>> = texts.iter().map(|t| text::tokenize(t)).collect();

        // Document frequency per term.
        let mut df: HashMap<&str, usize> = HashMap::new();
        for tokens in &token_lists {
            let mut seen: Vec<&str> = tokens.iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let vectors = token_lists
            .iter()
            .map(|tokens| {
                let len = tokens.len().max(1) as f64;
                let mut tf: HashMap<String, f64> = HashMap::new();
                for token in tokens {
                    *tf.entry(token.clone()).or_insert(0.0) += 1.0;
                }
                tf.into_iter()
                    .map(|(term, count)| {
                        let d = df.get(term.as_str()).copied().unwrap_or(1) as f64;
                        let idf = (1.0 + n as f64 / d).ln();
                        (term, (count / len) * idf)
                    })
                    .collect()
            })
            .collect();

        Self { vectors }
    }

    /// Weighted term vector of document `index`.
    pub fn vector(&self, index: usize) -> &HashMap<String, f64> {
        &self.vectors[index]
    }

    /// Top terms of document `index` by weight, restricted to terms longer
    /// than `min_term_len`. Ties break on the term itself for determinism.
    pub fn top_terms(&self, index: usize, limit: usize, min_term_len: usize) -> Vec<(String, f64)> {
        let mut terms: Vec<(String, f64)> = self.vectors[index]
            .iter()
            .filter(|(term, _)| term.len() > min_term_len)
            .map(|(term, weight)| (term.clone(), *weight))
            .collect();
        terms.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        terms.truncate(limit);
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_terms_weigh_more() {
        let table = TfIdf::new(&["safety safety safety response format"]);
        let top = table.top_terms(0, 5, 3);
        assert_eq!(top[0].0, "safety");
        assert!(top[0].1 > top[1].1);
    }

    #[test]
    fn min_term_len_filters_short_tokens() {
        let table = TfIdf::new(&["the cat sat on the mat comfortably"]);
        let top = table.top_terms(0, 10, 3);
        assert!(top.iter().all(|(term, _)| term.len() > 3));
    }

    #[test]
    fn shared_terms_keep_nonzero_weight() {
        // Smoothed idf: a term in both documents must not vanish.
        let table = TfIdf::new(&["alpha beta", "alpha gamma"]);
        assert!(table.vector(0).get("alpha").copied().unwrap_or(0.0) > 0.0);
    }

    #[test]
    fn identical_documents_get_identical_vectors() {
        let table = TfIdf::new(&["always answer politely", "always answer politely"]);
        assert_eq!(table.vector(0).len(), table.vector(1).len());
        for (term, w) in table.vector(0) {
            let other = table.vector(1).get(term).copied().unwrap_or(0.0);
            assert!((w - other).abs() < 1e-12);
        }
    }
}
