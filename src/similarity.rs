//! Pairwise text similarity metrics.
//!
//! Three independent metrics, each in [0, 1]: Jaccard over lowercased token
//! sets, cosine over TF-IDF vectors built from the two-document micro-corpus,
//! and edit similarity derived from character-level Levenshtein distance.
//! The overall score is their unweighted mean.
//!
//! All metrics are symmetric, and every metric scores identical inputs 1.0
//! (two empty inputs count as identical).

use std::collections::{HashMap, HashSet};

use crate::models::{SimilarityClass, SimilarityScores};
use crate::tfidf::TfIdf;
use crate::text;

/// Jaccard similarity of the lowercased token sets of two texts.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let set_a: HashSet<String> = text::tokenize(a).into_iter().collect();
    let set_b: HashSet<String> = text::tokenize(b).into_iter().collect();
    token_jaccard(&set_a, &set_b)
}

/// Jaccard over pre-built token sets. Two empty sets are identical.
pub fn token_jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    intersection as f64 / union as f64
}

/// Cosine similarity of two weighted term vectors.
pub fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let norm_a: f64 = a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b: f64 = b.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm_a == 0.0 && norm_b == 0.0 {
        return 1.0;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .filter_map(|(term, w)| b.get(term).map(|v| w * v))
        .sum();
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Cosine similarity over TF-IDF vectors from the two-document micro-corpus.
pub fn tfidf_cosine(a: &str, b: &str) -> f64 {
    let table = TfIdf::new(&[a, b]);
    cosine(table.vector(0), table.vector(1))
}

/// `1 − Levenshtein(a, b) / max(len(a), len(b))` over characters.
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let chars_a: Vec<char> = a.chars().collect();
    let chars_b: Vec<char> = b.chars().collect();
    let max_len = chars_a.len().max(chars_b.len());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&chars_a, &chars_b) as f64 / max_len as f64
}

/// Two-row dynamic-programming Levenshtein distance.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Bucket an overall score. Monotonic: a higher score never maps lower.
pub fn classify(overall: f64) -> SimilarityClass {
    if overall > 0.8 {
        SimilarityClass::VeryHigh
    } else if overall > 0.6 {
        SimilarityClass::High
    } else if overall > 0.4 {
        SimilarityClass::Medium
    } else if overall > 0.2 {
        SimilarityClass::Low
    } else {
        SimilarityClass::VeryLow
    }
}

/// All three metrics plus the blended overall score and its bucket.
pub fn score_pair(a: &str, b: &str) -> SimilarityScores {
    let jaccard = jaccard(a, b);
    let cosine = tfidf_cosine(a, b);
    let edit = edit_similarity(a, b);
    let overall = (jaccard + cosine + edit) / 3.0;
    SimilarityScores {
        jaccard,
        cosine,
        edit,
        overall,
        classification: classify(overall),
    }
}
