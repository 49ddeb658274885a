//! Per-document analysis and corpus-wide aggregation.
//!
//! `analyze` computes category coverage, sentiment, complexity, directives,
//! key phrases, and structural metrics for one record. `analyze_corpus` runs
//! per-document analysis in parallel, folds the aggregate, derives category
//! coverage patterns, and computes per-service time trends over dated
//! records. A record with no prompt text is skipped with a warning, never
//! treated as empty.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, warn};

use crate::categories;
use crate::error::{PromptError, Result};
use crate::lexicon;
use crate::models::{
    AggregateAnalysis, AnalysisResult, CategoryAggregate, CategoryPattern, Complexity,
    ComplexityLabel, CorpusAnalysis, DocumentRecord, KeyPhrase, ServiceAggregate, ServiceTrends,
    SkippedDocument, StructureMetrics,
};
use crate::text;
use crate::tfidf::TfIdf;
use crate::trend;

/// Directive sentences retained per document.
const MAX_DIRECTIVES: usize = 10;
/// Key phrases retained per document.
const MAX_KEY_PHRASES: usize = 20;
/// Key phrase terms must be longer than this.
const MIN_PHRASE_TERM_LEN: usize = 3;

// The three directive families: imperative openers, negative obligations,
// and action-verb openers.
static DIRECTIVE_IMPERATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(always|never|should|must|will|when|if)\b").expect("static regex")
});
static DIRECTIVE_OBLIGATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(do not|don't|avoid|ensure)\b").expect("static regex")
});
static DIRECTIVE_ACTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(respond|answer|provide|generate|create)\b").expect("static regex")
});

/// Analyze one parsed record.
pub fn analyze(record: &DocumentRecord) -> Result<AnalysisResult> {
    let prompt = record
        .prompt_text
        .as_deref()
        .ok_or_else(|| PromptError::MissingContent(record.filename.clone()))?;

    let sentences = text::split_sentences(prompt);

    Ok(AnalysisResult {
        filename: record.filename.clone(),
        categories: categories::score_all(prompt, &sentences),
        sentiment: lexicon::score_sentiment(prompt),
        complexity: complexity(prompt, &sentences),
        directives: extract_directives(&sentences),
        key_phrases: key_phrases(prompt),
        structure: structure_metrics(&record.raw_text),
    })
}

/// Analyze a whole corpus: individual results, aggregate fold, category
/// patterns, and per-service evolution trends.
pub fn analyze_corpus(records: &[DocumentRecord]) -> CorpusAnalysis {
    let results: Vec<(&DocumentRecord, Result<AnalysisResult>)> = records
        .par_iter()
        .map(|record| (record, analyze(record)))
        .collect();

    let mut individual = Vec::new();
    let mut analyzed: Vec<&DocumentRecord> = Vec::new();
    let mut skipped = Vec::new();
    for (record, result) in results {
        match result {
            Ok(analysis) => {
                individual.push(analysis);
                analyzed.push(record);
            }
            Err(err) => {
                warn!(filename = %record.filename, error = %err, "skipping record");
                skipped.push(SkippedDocument {
                    filename: record.filename.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    let aggregate = fold_aggregate(&analyzed, &individual);
    let patterns = category_patterns(&individual);
    let evolution = service_evolution(&analyzed, &individual);

    debug!(
        analyzed = individual.len(),
        skipped = skipped.len(),
        "corpus analysis complete"
    );

    CorpusAnalysis {
        individual,
        aggregate,
        patterns,
        evolution,
        skipped,
    }
}

// ============ Complexity ============

fn complexity(prompt: &str, sentences: &[String]) -> Complexity {
    let words = text::word_count(prompt);
    let sentence_count = sentences.len().max(1);
    let avg_sentence_length = words as f64 / sentence_count as f64;

    let tokens = text::stemmed_tokens(prompt);
    let lexical_diversity = if tokens.is_empty() {
        0.0
    } else {
        let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
        unique.len() as f64 / tokens.len() as f64
    };

    let label = if avg_sentence_length > 20.0 || lexical_diversity > 0.7 {
        ComplexityLabel::High
    } else if avg_sentence_length > 15.0 || lexical_diversity > 0.5 {
        ComplexityLabel::Medium
    } else {
        ComplexityLabel::Low
    };

    Complexity {
        avg_sentence_length,
        lexical_diversity,
        label,
    }
}

// ============ Directives ============

/// Sentences matching any directive family, capped, in document order.
pub fn extract_directives(sentences: &[String]) -> Vec<String> {
    sentences
        .iter()
        .filter(|s| {
            let t = s.trim();
            DIRECTIVE_IMPERATIVE.is_match(t)
                || DIRECTIVE_OBLIGATION.is_match(t)
                || DIRECTIVE_ACTION.is_match(t)
        })
        .take(MAX_DIRECTIVES)
        .cloned()
        .collect()
}

// ============ Key phrases ============

fn key_phrases(prompt: &str) -> Vec<KeyPhrase> {
    TfIdf::new(&[prompt])
        .top_terms(0, MAX_KEY_PHRASES, MIN_PHRASE_TERM_LEN)
        .into_iter()
        .map(|(term, weight)| KeyPhrase {
            term,
            weight: (weight * 100.0).round() / 100.0,
        })
        .collect()
}

// ============ Structure ============

/// Line-level structural counts over the full document text.
pub fn structure_metrics(raw_text: &str) -> StructureMetrics {
    let mut metrics = StructureMetrics::default();
    for line in raw_text.lines() {
        if text::is_heading(line) {
            metrics.heading_count += 1;
        } else if text::is_bullet(line) {
            metrics.bullet_count += 1;
        } else if text::is_numbered(line) {
            metrics.numbered_count += 1;
        }
    }
    metrics.paragraph_count = text::split_paragraphs(raw_text).len();
    metrics.has_structure =
        metrics.heading_count > 0 || metrics.bullet_count > 0 || metrics.numbered_count > 0;
    metrics
}

// ============ Aggregation ============

fn fold_aggregate(
    records: &[&DocumentRecord],
    results: &[AnalysisResult],
) -> AggregateAnalysis {
    let mut aggregate = AggregateAnalysis {
        total_documents: results.len(),
        ..Default::default()
    };

    for (record, result) in records.iter().zip(results) {
        aggregate.total_words += record.word_count;

        for (category, score) in &result.categories {
            let entry = aggregate
                .categories
                .entry(category.clone())
                .or_insert_with(CategoryAggregate::default);
            entry.total += score.score;
            entry.count += 1;
        }

        let service = aggregate
            .services
            .entry(record.metadata.service.clone())
            .or_insert_with(ServiceAggregate::default);
        service.count += 1;
        service.total_words += record.word_count;
        for (category, score) in &result.categories {
            *service.category_totals.entry(category.clone()).or_insert(0.0) += score.score;
        }
    }

    for entry in aggregate.categories.values_mut() {
        if entry.count > 0 {
            entry.average = entry.total / entry.count as f64;
        }
    }

    aggregate
}

fn category_patterns(results: &[AnalysisResult]) -> Vec<CategoryPattern> {
    categories::CATEGORIES
        .iter()
        .map(|def| {
            let covering: Vec<(&str, f64)> = results
                .iter()
                .filter_map(|r| {
                    r.categories
                        .get(def.name)
                        .filter(|s| s.score > 0.0)
                        .map(|s| (r.filename.as_str(), s.score))
                })
                .collect();
            let average_score = if covering.is_empty() {
                0.0
            } else {
                covering.iter().map(|(_, s)| s).sum::<f64>() / covering.len() as f64
            };
            CategoryPattern {
                category: def.name.to_string(),
                document_count: covering.len(),
                documents: covering.iter().map(|(f, _)| f.to_string()).collect(),
                average_score,
            }
        })
        .collect()
}

// ============ Evolution ============

/// Per-service trends over dated documents: word count plus every category
/// score, each as an ascending-date series through the shared trend routine.
fn service_evolution(
    records: &[&DocumentRecord],
    results: &[AnalysisResult],
) -> BTreeMap<String, ServiceTrends> {
    let mut by_service: BTreeMap<String, Vec<(&DocumentRecord, &AnalysisResult)>> =
        BTreeMap::new();
    for (record, result) in records.iter().copied().zip(results) {
        if record.metadata.date.is_some() {
            by_service
                .entry(record.metadata.service.clone())
                .or_default()
                .push((record, result));
        }
    }

    let mut evolution = BTreeMap::new();
    for (service, mut docs) in by_service {
        if docs.len() < 2 {
            continue;
        }
        docs.sort_by_key(|(record, _)| record.metadata.date);

        let word_counts: Vec<f64> = docs.iter().map(|(r, _)| r.word_count as f64).collect();
        let word_count_trend = match trend::analyze_trend(&word_counts) {
            Ok(t) => t,
            Err(_) => continue,
        };

        let mut category_trends = BTreeMap::new();
        for def in categories::CATEGORIES {
            let series: Vec<f64> = docs
                .iter()
                .map(|(_, result)| {
                    result
                        .categories
                        .get(def.name)
                        .map(|s| s.score)
                        .unwrap_or(0.0)
                })
                .collect();
            if let Ok(t) = trend::analyze_trend(&series) {
                category_trends.insert(def.name.to_string(), t);
            }
        }

        evolution.insert(
            service.clone(),
            ServiceTrends {
                service,
                document_count: docs.len(),
                word_count_trend,
                category_trends,
            },
        );
    }
    evolution
}
