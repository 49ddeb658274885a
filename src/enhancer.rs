//! Rule-based improvement suggestions and the overall quality score.
//!
//! Each rule fires independently when its threshold condition holds; the
//! overall score is a weighted sum normalized to the weight total, so the
//! configured point allocation (20/25/20/25/10 by default) acts as relative
//! shares. Strengths mirror the same thresholds from the other side.

use crate::categories::IMPORTANT_CATEGORIES;
use crate::config::EnhancerConfig;
use crate::error::{PromptError, Result};
use crate::models::{
    AnalysisResult, DocumentRecord, EnhancementReport, PromptMetrics, Suggestion,
    SuggestionDimension, SuggestionPriority,
};
use crate::text;

/// Flesch score below which a prompt is flagged hard to read.
const READABILITY_FLOOR: f64 = 30.0;
/// Average sentence length above which prose is flagged as run-on.
const SENTENCE_LENGTH_CEIL: f64 = 25.0;
/// Minimum blank-line paragraph breaks before the structure rule fires.
const MIN_PARAGRAPH_BREAKS: usize = 3;
/// Sentence-length band with full balance credit.
const BALANCE_LOW: f64 = 10.0;
const BALANCE_HIGH: f64 = 20.0;
const BALANCE_MID: f64 = 15.0;

/// Fuzzy filler words that weaken instructions.
const VAGUE_TERMS: &[&str] = &[
    "etc", "stuff", "things", "various", "somehow", "and so on", "as needed",
    "appropriately",
];

/// Words signalling the prompt contains worked examples.
const EXAMPLE_MARKERS: &[&str] = &["example", "instance", "such as"];

/// Keyword families a complete prompt is expected to touch.
const COMPLETENESS_FAMILIES: &[(&str, &[&str])] = &[
    ("role definition", &["you are", "act as", "your role"]),
    ("interaction style", &["tone", "style", "respond"]),
    ("output format", &["format", "output", "structure"]),
    (
        "error handling",
        &["if you cannot", "if you do not know", "unsure", "uncertain"],
    ),
];

/// Compute suggestions, strengths, and the 0-100 score for one record.
pub fn suggest(
    record: &DocumentRecord,
    analysis: &AnalysisResult,
    cfg: &EnhancerConfig,
) -> Result<EnhancementReport> {
    let prompt = record
        .prompt_text
        .as_deref()
        .ok_or_else(|| PromptError::MissingContent(record.filename.clone()))?;

    let metrics = gather_metrics(record, analysis, prompt);
    let suggestions = run_rules(prompt, analysis, &metrics, cfg);
    let strengths = derive_strengths(prompt, analysis, &metrics, cfg);
    let overall_score = score(&metrics, cfg);

    Ok(EnhancementReport {
        filename: record.filename.clone(),
        overall_score,
        suggestions,
        strengths,
        metrics,
    })
}

// ============ Metrics ============

fn gather_metrics(
    record: &DocumentRecord,
    analysis: &AnalysisResult,
    prompt: &str,
) -> PromptMetrics {
    let word_count = record.word_count;
    let sentence_count = text::split_sentences(prompt).len().max(1);
    let avg_sentence_length = word_count as f64 / sentence_count as f64;

    let structure = analysis.structure;
    let has_good_structure =
        structure.heading_count > 0 || structure.bullet_count > 3 || structure.numbered_count > 3;

    let readability = flesch_reading_ease(prompt, avg_sentence_length);

    let important: Vec<f64> = IMPORTANT_CATEGORIES
        .iter()
        .map(|name| {
            analysis
                .categories
                .get(*name)
                .map(|s| s.score)
                .unwrap_or(0.0)
        })
        .collect();
    let category_average = important.iter().sum::<f64>() / important.len() as f64;
    let category_coverage =
        important.iter().filter(|s| **s > 0.0).count() as f64 / important.len() as f64;

    PromptMetrics {
        word_count,
        sentence_count,
        avg_sentence_length,
        structure,
        has_good_structure,
        readability,
        category_average,
        category_coverage,
    }
}

/// Flesch reading ease, clamped to [0, 100].
fn flesch_reading_ease(prompt: &str, avg_sentence_length: f64) -> f64 {
    let asw = text::avg_syllables_per_word(prompt);
    (206.835 - 1.015 * avg_sentence_length - 84.6 * asw).clamp(0.0, 100.0)
}

// ============ Rules ============

fn run_rules(
    prompt: &str,
    analysis: &AnalysisResult,
    metrics: &PromptMetrics,
    cfg: &EnhancerConfig,
) -> Vec<Suggestion> {
    let mut out = Vec::new();
    let lower = prompt.to_lowercase();
    let s = &metrics.structure;

    if s.heading_count == 0 {
        out.push(Suggestion {
            dimension: SuggestionDimension::Structure,
            issue: "No headings divide the prompt".to_string(),
            suggestion: "Break the prompt into sections with markdown headings".to_string(),
            example: "# Role\n# Capabilities\n# Safety".to_string(),
            priority: SuggestionPriority::High,
        });
    }
    if s.bullet_count == 0 && s.numbered_count == 0 {
        out.push(Suggestion {
            dimension: SuggestionDimension::Structure,
            issue: "No bulleted or numbered lists".to_string(),
            suggestion: "Turn enumerations of rules or steps into lists".to_string(),
            example: "- Always cite sources\n- Keep answers concise".to_string(),
            priority: SuggestionPriority::Medium,
        });
    }
    // Breaks, not blocks: n paragraphs have n - 1 blank-line breaks.
    let paragraph_breaks = s.paragraph_count.saturating_sub(1);
    if paragraph_breaks < MIN_PARAGRAPH_BREAKS {
        out.push(Suggestion {
            dimension: SuggestionDimension::Structure,
            issue: format!("Only {} paragraph break(s)", paragraph_breaks),
            suggestion: "Separate distinct topics with blank lines".to_string(),
            example: "One topic per paragraph, one blank line between".to_string(),
            priority: SuggestionPriority::Medium,
        });
    }

    if metrics.word_count < cfg.length.min_words {
        out.push(Suggestion {
            dimension: SuggestionDimension::Completeness,
            issue: format!(
                "Prompt is short: {} words (minimum {})",
                metrics.word_count, cfg.length.min_words
            ),
            suggestion: "Expand coverage of behaviour, constraints, and edge cases".to_string(),
            example: "Describe how to handle ambiguous or unsafe requests".to_string(),
            priority: SuggestionPriority::High,
        });
    }

    if metrics.readability < READABILITY_FLOOR {
        out.push(Suggestion {
            dimension: SuggestionDimension::Clarity,
            issue: format!("Low readability score ({:.0})", metrics.readability),
            suggestion: "Shorten sentences and prefer common words".to_string(),
            example: "Split compound instructions into one rule per sentence".to_string(),
            priority: SuggestionPriority::High,
        });
    }
    if metrics.avg_sentence_length > SENTENCE_LENGTH_CEIL {
        out.push(Suggestion {
            dimension: SuggestionDimension::Clarity,
            issue: format!(
                "Average sentence length is {:.1} words",
                metrics.avg_sentence_length
            ),
            suggestion: "Break long sentences apart".to_string(),
            example: "Aim for 10-20 words per sentence".to_string(),
            priority: SuggestionPriority::Medium,
        });
    }
    let vague: Vec<&str> = VAGUE_TERMS
        .iter()
        .filter(|term| lower.contains(*term))
        .copied()
        .collect();
    if !vague.is_empty() {
        out.push(Suggestion {
            dimension: SuggestionDimension::Clarity,
            issue: format!("Vague terms present: {}", vague.join(", ")),
            suggestion: "Replace vague terms with concrete nouns and limits".to_string(),
            example: "\"various formats\" -> \"JSON, YAML, or Markdown\"".to_string(),
            priority: SuggestionPriority::Medium,
        });
    }

    for name in IMPORTANT_CATEGORIES {
        let covered = analysis
            .categories
            .get(name)
            .map(|s| s.score > 0.0)
            .unwrap_or(false);
        if !covered {
            out.push(Suggestion {
                dimension: SuggestionDimension::Content,
                issue: format!("No {} content", name),
                suggestion: format!("Add a section describing {}", name),
                example: example_for_category(name).to_string(),
                priority: SuggestionPriority::High,
            });
        }
    }
    if !EXAMPLE_MARKERS.iter().any(|m| lower.contains(m)) {
        out.push(Suggestion {
            dimension: SuggestionDimension::Content,
            issue: "No worked examples".to_string(),
            suggestion: "Show at least one example of the expected behaviour".to_string(),
            example: "For example: when asked for code, reply with a fenced block".to_string(),
            priority: SuggestionPriority::Medium,
        });
    }

    for (family, markers) in COMPLETENESS_FAMILIES {
        if !markers.iter().any(|m| lower.contains(m)) {
            out.push(Suggestion {
                dimension: SuggestionDimension::Completeness,
                issue: format!("Missing {} language", family),
                suggestion: format!("State the assistant's {} explicitly", family),
                example: family_example(family).to_string(),
                priority: SuggestionPriority::Medium,
            });
        }
    }

    out
}

fn example_for_category(name: &str) -> &'static str {
    match name {
        "personality" => "You are a patient, encouraging tutor.",
        "capabilities" => "You can explain concepts, review code, and draft text.",
        "safety" => "Never provide instructions that could cause harm.",
        "limitations" => "You cannot browse the web or run code.",
        _ => "Add a short paragraph covering this dimension.",
    }
}

fn family_example(family: &str) -> &'static str {
    match family {
        "role definition" => "You are a support agent for the Acme API.",
        "interaction style" => "Respond in a friendly, professional tone.",
        "output format" => "Format answers as short markdown sections.",
        "error handling" => "If you cannot answer, say so and suggest alternatives.",
        _ => "",
    }
}

// ============ Strengths ============

fn derive_strengths(
    prompt: &str,
    analysis: &AnalysisResult,
    metrics: &PromptMetrics,
    cfg: &EnhancerConfig,
) -> Vec<String> {
    let mut out = Vec::new();
    let lower = prompt.to_lowercase();

    if (cfg.length.min_words..=cfg.length.optimal_words).contains(&metrics.word_count) {
        out.push(format!("Well-sized prompt ({} words)", metrics.word_count));
    }
    if metrics.has_good_structure {
        out.push("Clear structural organization".to_string());
    }
    if metrics.readability > 60.0 {
        out.push("Very readable prose".to_string());
    } else if metrics.readability > 40.0 {
        out.push("Readable prose".to_string());
    }
    if metrics.category_coverage > 0.75 {
        out.push("Covers all or nearly all important dimensions".to_string());
    } else if metrics.category_coverage > 0.5 {
        out.push("Covers most important dimensions".to_string());
    }
    if EXAMPLE_MARKERS.iter().any(|m| lower.contains(m)) {
        out.push("Includes concrete examples".to_string());
    }
    if analysis
        .categories
        .get("personality")
        .map(|s| s.score > 0.0)
        .unwrap_or(false)
    {
        out.push("Defines a personality".to_string());
    }
    if analysis
        .categories
        .get("safety")
        .map(|s| s.score > 0.0)
        .unwrap_or(false)
    {
        out.push("Addresses safety".to_string());
    }
    out
}

// ============ Score ============

/// Weighted sum normalized to the weight total, on a 0-100 scale.
fn score(metrics: &PromptMetrics, cfg: &EnhancerConfig) -> f64 {
    let w = &cfg.weights;

    let length_pts = length_points(metrics.word_count, cfg) * w.length;
    let structure_pts = structure_points(metrics) * w.structure;
    let readability_pts = (metrics.readability / 100.0) * w.readability;
    let coverage_pts = metrics.category_coverage * w.coverage;
    let balance_pts = balance_points(metrics.avg_sentence_length) * w.sentence_balance;

    let total = length_pts + structure_pts + readability_pts + coverage_pts + balance_pts;
    (total / w.total() * 100.0).clamp(0.0, 100.0)
}

/// Fraction of the length weight earned: full credit inside [min, optimal],
/// 3/4 up to max, 1/2 above max, linear taper below min.
fn length_points(word_count: usize, cfg: &EnhancerConfig) -> f64 {
    let band = &cfg.length;
    if word_count >= band.min_words && word_count <= band.optimal_words {
        1.0
    } else if word_count > band.optimal_words && word_count <= band.max_words {
        0.75
    } else if word_count > band.max_words {
        0.5
    } else {
        word_count as f64 / band.min_words as f64
    }
}

/// Fraction of the structure weight: 3/5 base for good structure, plus 1/5
/// each for having any heading and any list.
fn structure_points(metrics: &PromptMetrics) -> f64 {
    let s = &metrics.structure;
    let mut fraction = 0.0;
    if metrics.has_good_structure {
        fraction += 0.6;
    }
    if s.heading_count > 0 {
        fraction += 0.2;
    }
    if s.bullet_count > 0 || s.numbered_count > 0 {
        fraction += 0.2;
    }
    fraction
}

/// Full credit for 10-20 words per sentence, losing 1/10 per word of
/// deviation beyond the band.
fn balance_points(avg_sentence_length: f64) -> f64 {
    if (BALANCE_LOW..=BALANCE_HIGH).contains(&avg_sentence_length) {
        1.0
    } else {
        let deviation = (avg_sentence_length - BALANCE_MID).abs();
        (1.0 - (deviation - 5.0) / 10.0).max(0.0)
    }
}
