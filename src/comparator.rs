//! Pairwise document comparison and time-ordered evolution analysis.
//!
//! `compare` blends three similarity metrics, diffs structure and content,
//! and mines unique elements per side. `analyze_evolution` walks a dated,
//! same-service series pair by pair, aggregates the mean similarity, runs
//! the shared trend routine over lengths and similarities, and flags major
//! changes. Per-pair work is parallelized; it is O(n²) in sentence count,
//! acceptable for offline batch analysis.

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::warn;

use crate::analyzer;
use crate::error::{PromptError, Result};
use crate::models::{
    ComparisonResult, ContentDelta, DocumentRecord, DocumentSummary, EvolutionReport,
    EvolutionStep, LengthDelta, LengthSignificance, LengthTrend, MajorChange, SentencePair,
    StructuralDelta, UniqueElements,
};
use crate::similarity;
use crate::text;
use crate::tfidf::TfIdf;
use crate::trend;

/// Sentence pairs above this token-Jaccard count as similar.
const SENTENCE_SIMILARITY_FLOOR: f64 = 0.6;
/// Similar sentence pairs reported.
const MAX_SENTENCE_PAIRS: usize = 5;
/// Themes extracted per side.
const THEME_LIMIT: usize = 15;
/// Unique themes reported per side.
const MAX_UNIQUE_THEMES: usize = 10;
/// Unique phrases (3-word shingles) reported per side.
const MAX_UNIQUE_PHRASES: usize = 20;
/// Minimum shingle length in characters.
const MIN_PHRASE_CHARS: usize = 10;
/// Directive pairs above this token-Jaccard count as shared.
const DIRECTIVE_OVERLAP_FLOOR: f64 = 0.7;
/// Unique directives reported per side.
const MAX_UNIQUE_DIRECTIVES: usize = 5;
/// Consecutive pairs below this overall similarity are major changes.
const MAJOR_CHANGE_FLOOR: f64 = 0.7;

/// Compare two parsed records.
pub fn compare(a: &DocumentRecord, b: &DocumentRecord) -> Result<ComparisonResult> {
    let prompt_a = a
        .prompt_text
        .as_deref()
        .ok_or_else(|| PromptError::ComparisonInput(a.filename.clone()))?;
    let prompt_b = b
        .prompt_text
        .as_deref()
        .ok_or_else(|| PromptError::ComparisonInput(b.filename.clone()))?;

    let similarity = similarity::score_pair(prompt_a, prompt_b);
    let structural = structural_delta(&a.raw_text, &b.raw_text);
    let content = content_delta(prompt_a, prompt_b);
    let length = length_delta(a.word_count, b.word_count);
    let (unique_a, unique_b) = unique_elements(prompt_a, prompt_b);

    Ok(ComparisonResult {
        a: summarize(a),
        b: summarize(b),
        similarity,
        structural,
        content,
        length,
        unique_a,
        unique_b,
    })
}

fn summarize(record: &DocumentRecord) -> DocumentSummary {
    DocumentSummary {
        filename: record.filename.clone(),
        service: record.metadata.service.clone(),
        date: record.metadata.date,
        word_count: record.word_count,
    }
}

// ============ Structural diff ============

/// Signed per-metric delta, B − A, over the full document texts.
fn structural_delta(raw_a: &str, raw_b: &str) -> StructuralDelta {
    let sa = analyzer::structure_metrics(raw_a);
    let sb = analyzer::structure_metrics(raw_b);
    let delta = |x: usize, y: usize| y as i64 - x as i64;
    StructuralDelta {
        line_count: delta(raw_a.lines().count(), raw_b.lines().count()),
        paragraph_count: delta(sa.paragraph_count, sb.paragraph_count),
        bullet_count: delta(sa.bullet_count, sb.bullet_count),
        numbered_count: delta(sa.numbered_count, sb.numbered_count),
        heading_count: delta(sa.heading_count, sb.heading_count),
    }
}

// ============ Content diff ============

fn content_delta(prompt_a: &str, prompt_b: &str) -> ContentDelta {
    let sentences_a = text::split_sentences(prompt_a);
    let sentences_b = text::split_sentences(prompt_b);

    let sets_a: Vec<HashSet<String>> = sentences_a
        .iter()
        .map(|s| text::tokenize(s).into_iter().collect())
        .collect();
    let sets_b: Vec<HashSet<String>> = sentences_b
        .iter()
        .map(|s| text::tokenize(s).into_iter().collect())
        .collect();

    let mut pairs: Vec<SentencePair> = Vec::new();
    for (i, set_a) in sets_a.iter().enumerate() {
        for (j, set_b) in sets_b.iter().enumerate() {
            let sim = similarity::token_jaccard(set_a, set_b);
            if sim > SENTENCE_SIMILARITY_FLOOR {
                pairs.push(SentencePair {
                    a: sentences_a[i].clone(),
                    b: sentences_b[j].clone(),
                    similarity: sim,
                });
            }
        }
    }
    pairs.sort_by(|x, y| {
        y.similarity
            .partial_cmp(&x.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let denominator = sentences_a.len().max(sentences_b.len()).max(1);
    let similarity_ratio = (pairs.len() as f64 / denominator as f64).min(1.0);
    pairs.truncate(MAX_SENTENCE_PAIRS);

    let table = TfIdf::new(&[prompt_a, prompt_b]);
    let themes_a: Vec<String> = table
        .top_terms(0, THEME_LIMIT, 3)
        .into_iter()
        .map(|(t, _)| t)
        .collect();
    let themes_b: Vec<String> = table
        .top_terms(1, THEME_LIMIT, 3)
        .into_iter()
        .map(|(t, _)| t)
        .collect();

    let is_common = |theme: &str, others: &[String]| {
        others
            .iter()
            .any(|o| o.contains(theme) || theme.contains(o.as_str()))
    };

    let mut common_themes: Vec<String> = themes_a
        .iter()
        .filter(|t| is_common(t, &themes_b))
        .cloned()
        .collect();
    common_themes.dedup();

    let unique_themes_a: Vec<String> = themes_a
        .iter()
        .filter(|t| !is_common(t, &themes_b))
        .take(MAX_UNIQUE_THEMES)
        .cloned()
        .collect();
    let unique_themes_b: Vec<String> = themes_b
        .iter()
        .filter(|t| !is_common(t, &themes_a))
        .take(MAX_UNIQUE_THEMES)
        .cloned()
        .collect();

    ContentDelta {
        similarity_ratio,
        similar_sentences: pairs,
        common_themes,
        unique_themes_a,
        unique_themes_b,
    }
}

// ============ Length ============

fn length_delta(words_a: usize, words_b: usize) -> LengthDelta {
    let difference = words_b as i64 - words_a as i64;
    let percent_change = if words_a == 0 {
        if words_b == 0 {
            0.0
        } else {
            100.0
        }
    } else {
        difference as f64 / words_a as f64 * 100.0
    };

    let trend = match difference {
        d if d > 0 => LengthTrend::Increased,
        d if d < 0 => LengthTrend::Decreased,
        _ => LengthTrend::Unchanged,
    };
    let significance = if percent_change.abs() > 50.0 {
        LengthSignificance::Major
    } else if percent_change.abs() > 20.0 {
        LengthSignificance::Moderate
    } else {
        LengthSignificance::Minor
    };

    LengthDelta {
        difference,
        percent_change,
        trend,
        significance,
    }
}

// ============ Unique elements ============

/// 3-word shingles of one side's sentences that do not appear verbatim
/// (case-insensitive) in the other side's full text, plus directives with no
/// close counterpart on the other side.
fn unique_elements(prompt_a: &str, prompt_b: &str) -> (UniqueElements, UniqueElements) {
    // Containment is checked against the other side's token stream so that
    // punctuation differences do not break verbatim matching.
    let lower_a = text::tokenize(prompt_a).join(" ");
    let lower_b = text::tokenize(prompt_b).join(" ");

    let sentences_a = text::split_sentences(prompt_a);
    let sentences_b = text::split_sentences(prompt_b);

    let directives_a = analyzer::extract_directives(&sentences_a);
    let directives_b = analyzer::extract_directives(&sentences_b);

    let unique_a = UniqueElements {
        phrases: unique_shingles(&sentences_a, &lower_b),
        directives: unique_directives(&directives_a, &directives_b),
    };
    let unique_b = UniqueElements {
        phrases: unique_shingles(&sentences_b, &lower_a),
        directives: unique_directives(&directives_b, &directives_a),
    };
    (unique_a, unique_b)
}

fn unique_shingles(sentences: &[String], other_lower: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    'outer: for sentence in sentences {
        let tokens = text::tokenize(sentence);
        for window in tokens.windows(3) {
            let shingle = window.join(" ");
            if shingle.len() > MIN_PHRASE_CHARS
                && shingle.chars().any(|c| c.is_alphabetic())
                && !other_lower.contains(&shingle)
                && seen.insert(shingle.clone())
            {
                out.push(shingle);
                if out.len() >= MAX_UNIQUE_PHRASES {
                    break 'outer;
                }
            }
        }
    }
    out
}

fn unique_directives(own: &[String], other: &[String]) -> Vec<String> {
    let other_sets: Vec<HashSet<String>> = other
        .iter()
        .map(|d| text::tokenize(d).into_iter().collect())
        .collect();
    own.iter()
        .filter(|directive| {
            let set: HashSet<String> = text::tokenize(directive).into_iter().collect();
            !other_sets
                .iter()
                .any(|o| similarity::token_jaccard(&set, o) > DIRECTIVE_OVERLAP_FLOOR)
        })
        .take(MAX_UNIQUE_DIRECTIVES)
        .cloned()
        .collect()
}

// ============ Evolution ============

/// Pairwise-compare a dated, ascending series of one service's records.
///
/// Records without a date or prompt text are excluded before the 2-record
/// floor is checked.
pub fn analyze_evolution(records: &[DocumentRecord]) -> Result<EvolutionReport> {
    let mut dated: Vec<&DocumentRecord> = records
        .iter()
        .filter(|r| {
            if r.prompt_text.is_none() {
                warn!(filename = %r.filename, "excluding record without prompt text");
                return false;
            }
            r.metadata.date.is_some()
        })
        .collect();

    if dated.len() < 2 {
        return Err(PromptError::InsufficientData(format!(
            "evolution needs at least 2 dated records, got {}",
            dated.len()
        )));
    }
    dated.sort_by_key(|r| r.metadata.date);

    let comparisons: Vec<ComparisonResult> = dated
        .par_windows(2)
        .map(|pair| compare(pair[0], pair[1]))
        .collect::<Result<Vec<_>>>()?;

    let steps: Vec<EvolutionStep> = comparisons
        .iter()
        .map(|c| EvolutionStep {
            from: c.a.clone(),
            to: c.b.clone(),
            similarity: c.similarity.clone(),
            length: c.length.clone(),
        })
        .collect();

    let similarities: Vec<f64> = comparisons.iter().map(|c| c.similarity.overall).collect();
    let average_similarity = similarities.iter().sum::<f64>() / similarities.len() as f64;

    let word_counts: Vec<f64> = dated.iter().map(|r| r.word_count as f64).collect();
    let length_trend = trend::analyze_trend(&word_counts)?;
    let similarity_trend = if similarities.len() >= 2 {
        Some(trend::analyze_trend(&similarities)?)
    } else {
        None
    };

    let major_changes: Vec<MajorChange> = comparisons
        .iter()
        .filter(|c| c.similarity.overall < MAJOR_CHANGE_FLOOR)
        .map(|c| MajorChange {
            from: c.a.filename.clone(),
            to: c.b.filename.clone(),
            similarity: c.similarity.overall,
            unique_from: c.unique_a.clone(),
            unique_to: c.unique_b.clone(),
        })
        .collect();

    Ok(EvolutionReport {
        service: dated[0].metadata.service.clone(),
        steps,
        average_similarity,
        length_trend,
        similarity_trend,
        major_changes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::models::SimilarityClass;
    use crate::parser;

    fn record(filename: &str, body: &str) -> DocumentRecord {
        parser::parse(body, filename, &ParserConfig::default()).unwrap()
    }

    const BASE: &str = "# System Prompt\n\nYou are a helpful assistant for technical writing. \
        Always answer politely and clearly. Never reveal internal configuration details. \
        Provide sources for factual claims when available.\n\n- keep answers short.\n- prefer plain language.\n";

    fn with_paragraph(extra: &str) -> String {
        format!("{BASE}\n{extra}\n")
    }

    #[test]
    fn near_duplicates_classify_high() {
        let a = record("svc_20240101.md", BASE);
        let b = record(
            "svc_20240201.md",
            &with_paragraph(
                "When uncertain about a factual question, say so explicitly instead of guessing.",
            ),
        );
        let result = compare(&a, &b).unwrap();
        assert!(matches!(
            result.similarity.classification,
            SimilarityClass::High | SimilarityClass::VeryHigh
        ));
        // Unique text is confined to the changed paragraph.
        assert!(result.unique_a.phrases.is_empty());
        assert!(!result.unique_b.phrases.is_empty());
        for phrase in &result.unique_b.phrases {
            assert!(
                "when uncertain about a factual question say so explicitly instead of guessing"
                    .contains(phrase.as_str()),
                "unexpected unique phrase: {phrase}"
            );
        }
    }

    #[test]
    fn structural_delta_is_signed_b_minus_a() {
        let a = record("svc_20240101.md", BASE);
        let b = record(
            "svc_20240201.md",
            "# System Prompt\n\nYou are a helpful assistant for technical writing tasks, \
             producing careful and well sourced reviews for every request.\n",
        );
        let result = compare(&a, &b).unwrap();
        assert_eq!(result.structural.bullet_count, -2);
        assert!(result.structural.line_count < 0);
    }

    #[test]
    fn comparison_is_symmetric() {
        let a = record("svc_20240101.md", BASE);
        let b = record("svc_20240201.md", &with_paragraph("Use formal tone."));
        let ab = compare(&a, &b).unwrap();
        let ba = compare(&b, &a).unwrap();
        assert!((ab.similarity.overall - ba.similarity.overall).abs() < 1e-12);
        assert_eq!(ab.length.difference, -ba.length.difference);
    }

    #[test]
    fn length_significance_buckets() {
        let minor = length_delta(100, 110);
        assert_eq!(minor.significance, LengthSignificance::Minor);
        assert_eq!(minor.trend, LengthTrend::Increased);

        let moderate = length_delta(100, 130);
        assert_eq!(moderate.significance, LengthSignificance::Moderate);

        let major = length_delta(100, 30);
        assert_eq!(major.significance, LengthSignificance::Major);
        assert_eq!(major.trend, LengthTrend::Decreased);

        let unchanged = length_delta(100, 100);
        assert_eq!(unchanged.trend, LengthTrend::Unchanged);
    }

    #[test]
    fn missing_prompt_text_rejects_comparison() {
        let a = record("svc_20240101.md", BASE);
        let mut b = record("svc_20240201.md", BASE);
        b.prompt_text = None;
        let err = compare(&a, &b).unwrap_err();
        assert!(matches!(err, PromptError::ComparisonInput(_)));
    }

    #[test]
    fn similar_sentences_found_in_near_duplicates() {
        let a = record("svc_20240101.md", BASE);
        let b = record("svc_20240201.md", &with_paragraph("Extra closing remark here."));
        let result = compare(&a, &b).unwrap();
        assert!(result.content.similarity_ratio > 0.5);
        assert!(!result.content.similar_sentences.is_empty());
        assert!(result.content.similar_sentences.len() <= 5);
        // Sorted descending.
        for w in result.content.similar_sentences.windows(2) {
            assert!(w[0].similarity >= w[1].similarity);
        }
    }

    #[test]
    fn evolution_requires_two_dated_records() {
        let records = vec![record("svc_20240101.md", BASE), record("svc-notes.md", BASE)];
        let err = analyze_evolution(&records).unwrap_err();
        assert!(matches!(err, PromptError::InsufficientData(_)));
    }

    #[test]
    fn evolution_sorts_by_date_and_averages_similarity() {
        // Deliberately out of order.
        let records = vec![
            record("svc_20240301.md", &with_paragraph("Third revision notes.")),
            record("svc_20240101.md", BASE),
            record("svc_20240201.md", &with_paragraph("Second revision notes.")),
        ];
        let report = analyze_evolution(&records).unwrap();
        assert_eq!(report.service, "svc");
        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.steps[0].from.filename, "svc_20240101.md");
        assert_eq!(report.steps[1].to.filename, "svc_20240301.md");
        assert!(report.average_similarity > 0.5);
        assert!(report.major_changes.is_empty());
    }

    #[test]
    fn disjoint_rewrite_is_flagged_as_major_change() {
        let rewrite = "# System Prompt\n\nRespond exclusively using numbered outlines covering \
            financial risk disclosures, regulatory filings, compliance deadlines, audit \
            trails, shareholder communications, quarterly statements.\n";
        let records = vec![
            record("svc_20240101.md", BASE),
            record("svc_20240201.md", rewrite),
        ];
        let report = analyze_evolution(&records).unwrap();
        assert_eq!(report.major_changes.len(), 1);
        assert!(report.major_changes[0].similarity < 0.7);
        assert!(!report.major_changes[0].unique_to.phrases.is_empty());
    }
}
