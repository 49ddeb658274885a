//! Core data models used throughout promptscope.
//!
//! These types represent the documents, analyses, comparisons, and reports
//! that flow through the pipeline. Everything derives `Serialize` so callers
//! can persist results however they like; category maps are `BTreeMap` so
//! iteration and serialization order is deterministic.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

/// Raw input pair supplied by the caller before parsing.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub filename: String,
    pub text: String,
}

impl RawDocument {
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
        }
    }
}

/// Metadata decomposed from a document's filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMetadata {
    pub service: String,
    pub model: Option<String>,
    pub version: Option<String>,
    pub date: Option<NaiveDate>,
}

/// One named section of a document body, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

/// Parsed unit holding one source file's extracted prompt text and metadata.
///
/// Immutable after parse. A record with `prompt_text: None` is unanalyzable;
/// every consumer surfaces it as [`crate::PromptError::MissingContent`]
/// rather than treating it as empty text.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    pub filename: String,
    pub metadata: PromptMetadata,
    pub source_url: Option<String>,
    pub prompt_text: Option<String>,
    pub sections: Vec<Section>,
    pub word_count: usize,
    pub raw_text: String,
    /// SHA-256 of the raw text, for identity and staleness checks.
    pub content_hash: String,
}

/// A document that `parse_all` skipped, with the reason it was skipped.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedDocument {
    pub filename: String,
    pub reason: String,
}

/// Batch parse output: surviving records plus the skip ledger.
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    pub records: Vec<DocumentRecord>,
    pub skipped: Vec<SkippedDocument>,
}

impl ParseOutcome {
    pub fn skip_count(&self) -> usize {
        self.skipped.len()
    }
}

// ============ Analysis ============

/// Relevance of one semantic category to a document.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryScore {
    /// Raw hit score (keyword hits + 2 × pattern hits), kept for aggregation.
    pub score: f64,
    /// `min(score / 5, 1)`.
    pub relevance: f64,
    pub matched_keywords: Vec<String>,
    /// Up to 3 sentences that matched this category.
    pub sentences: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Serialize)]
pub struct Sentiment {
    pub score: f64,
    pub label: SentimentLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityLabel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
pub struct Complexity {
    pub avg_sentence_length: f64,
    pub lexical_diversity: f64,
    pub label: ComplexityLabel,
}

/// A salient term and its TF-IDF weight, rounded to 2 decimals.
#[derive(Debug, Clone, Serialize)]
pub struct KeyPhrase {
    pub term: String,
    pub weight: f64,
}

/// Line-level structural counts for one document body.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StructureMetrics {
    pub heading_count: usize,
    pub bullet_count: usize,
    pub numbered_count: usize,
    pub paragraph_count: usize,
    pub has_structure: bool,
}

/// Full per-document analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub filename: String,
    pub categories: BTreeMap<String, CategoryScore>,
    pub sentiment: Sentiment,
    pub complexity: Complexity,
    /// Up to 10 directive sentences, in document order.
    pub directives: Vec<String>,
    /// Up to 20 key phrases, highest weight first.
    pub key_phrases: Vec<KeyPhrase>,
    pub structure: StructureMetrics,
}

/// Per-category running totals across a corpus.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryAggregate {
    pub total: f64,
    pub count: usize,
    pub average: f64,
}

/// Per-service totals across a corpus.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceAggregate {
    pub count: usize,
    pub total_words: usize,
    pub category_totals: BTreeMap<String, f64>,
}

/// Corpus-wide aggregate statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateAnalysis {
    pub total_documents: usize,
    pub total_words: usize,
    pub categories: BTreeMap<String, CategoryAggregate>,
    pub services: BTreeMap<String, ServiceAggregate>,
}

/// Cross-corpus coverage of one category: which documents score above zero.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryPattern {
    pub category: String,
    pub document_count: usize,
    pub documents: Vec<String>,
    pub average_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Increasing,
    Decreasing,
    Stable,
}

/// Direction of a numeric series, from first-third vs last-third averages.
#[derive(Debug, Clone, Serialize)]
pub struct TrendSummary {
    pub label: TrendLabel,
    pub percent_change: f64,
    pub first_avg: f64,
    pub last_avg: f64,
}

/// Per-service time trends over dated documents.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceTrends {
    pub service: String,
    pub document_count: usize,
    pub word_count_trend: TrendSummary,
    pub category_trends: BTreeMap<String, TrendSummary>,
}

/// Output of `analyze_corpus`.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusAnalysis {
    pub individual: Vec<AnalysisResult>,
    pub aggregate: AggregateAnalysis,
    pub patterns: Vec<CategoryPattern>,
    /// Keyed by service; only services with >= 2 dated documents appear.
    pub evolution: BTreeMap<String, ServiceTrends>,
    pub skipped: Vec<SkippedDocument>,
}

// ============ Comparison ============

/// Identifying summary of one side of a comparison.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub filename: String,
    pub service: String,
    pub date: Option<NaiveDate>,
    pub word_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityClass {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

/// The three sub-metrics, their unweighted mean, and its bucket.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityScores {
    pub jaccard: f64,
    pub cosine: f64,
    pub edit: f64,
    pub overall: f64,
    pub classification: SimilarityClass,
}

/// Signed per-metric structural difference (B − A).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StructuralDelta {
    pub line_count: i64,
    pub paragraph_count: i64,
    pub bullet_count: i64,
    pub numbered_count: i64,
    pub heading_count: i64,
}

/// A pair of similar sentences across the two sides.
#[derive(Debug, Clone, Serialize)]
pub struct SentencePair {
    pub a: String,
    pub b: String,
    pub similarity: f64,
}

/// Sentence- and theme-level content difference.
#[derive(Debug, Clone, Serialize)]
pub struct ContentDelta {
    /// |similar pairs| / max(|sentences A|, |sentences B|), clamped to [0, 1].
    pub similarity_ratio: f64,
    /// Top 5 similar sentence pairs, highest similarity first.
    pub similar_sentences: Vec<SentencePair>,
    pub common_themes: Vec<String>,
    pub unique_themes_a: Vec<String>,
    pub unique_themes_b: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthTrend {
    Increased,
    Decreased,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthSignificance {
    Major,
    Moderate,
    Minor,
}

/// Word-count difference between the two sides.
#[derive(Debug, Clone, Serialize)]
pub struct LengthDelta {
    pub difference: i64,
    pub percent_change: f64,
    pub trend: LengthTrend,
    pub significance: LengthSignificance,
}

/// Phrases and directives present on one side but absent from the other.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UniqueElements {
    pub phrases: Vec<String>,
    pub directives: Vec<String>,
}

/// Full pairwise comparison result.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub a: DocumentSummary,
    pub b: DocumentSummary,
    pub similarity: SimilarityScores,
    pub structural: StructuralDelta,
    pub content: ContentDelta,
    pub length: LengthDelta,
    pub unique_a: UniqueElements,
    pub unique_b: UniqueElements,
}

/// One consecutive-pair step in an evolution series.
#[derive(Debug, Clone, Serialize)]
pub struct EvolutionStep {
    pub from: DocumentSummary,
    pub to: DocumentSummary,
    pub similarity: SimilarityScores,
    pub length: LengthDelta,
}

/// A consecutive pair whose overall similarity fell below the change floor.
#[derive(Debug, Clone, Serialize)]
pub struct MajorChange {
    pub from: String,
    pub to: String,
    pub similarity: f64,
    pub unique_from: UniqueElements,
    pub unique_to: UniqueElements,
}

/// Trend detection across a time-ordered series of same-service versions.
#[derive(Debug, Clone, Serialize)]
pub struct EvolutionReport {
    pub service: String,
    pub steps: Vec<EvolutionStep>,
    pub average_similarity: f64,
    pub length_trend: TrendSummary,
    /// Needs at least two consecutive pairs to exist.
    pub similarity_trend: Option<TrendSummary>,
    pub major_changes: Vec<MajorChange>,
}

// ============ Enhancement ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionDimension {
    Structure,
    Content,
    Clarity,
    Completeness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionPriority {
    Medium,
    High,
}

/// A structured, rule-derived recommendation along one quality dimension.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub dimension: SuggestionDimension,
    pub issue: String,
    pub suggestion: String,
    pub example: String,
    pub priority: SuggestionPriority,
}

/// Metrics snapshot the enhancer's rules and score are computed from.
#[derive(Debug, Clone, Serialize)]
pub struct PromptMetrics {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    pub structure: StructureMetrics,
    pub has_good_structure: bool,
    /// Flesch reading ease, clamped to [0, 100].
    pub readability: f64,
    /// Mean score over the important categories.
    pub category_average: f64,
    /// Fraction of important categories with score > 0.
    pub category_coverage: f64,
}

/// Suggestions, strengths, and the 0-100 quality score for one document.
#[derive(Debug, Clone, Serialize)]
pub struct EnhancementReport {
    pub filename: String,
    pub overall_score: f64,
    pub suggestions: Vec<Suggestion>,
    pub strengths: Vec<String>,
    pub metrics: PromptMetrics,
}

impl EnhancementReport {
    /// Suggestions filtered to one dimension, preserving rule order.
    pub fn suggestions_for(&self, dimension: SuggestionDimension) -> Vec<&Suggestion> {
        self.suggestions
            .iter()
            .filter(|s| s.dimension == dimension)
            .collect()
    }
}

/// Best-effort heuristic rewrite of a prompt. Advisory only.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionProposal {
    pub revised_text: String,
    /// Human-readable notes for each transform that fired.
    pub applied: Vec<String>,
    /// `min(40, 10 × high-priority + 5 × medium-priority suggestions)`.
    pub estimated_improvement: f64,
}
