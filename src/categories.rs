//! Static category table and category scoring.
//!
//! Each category is a data row of keywords plus regex patterns; scoring
//! iterates the table generically, so adding a category is a data change,
//! not a code change. Score = keyword hits + 2 × pattern hits; relevance is
//! `min(score / 5, 1)`.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::CategoryScore;

/// One row of the category table.
pub struct CategoryDef {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub patterns: &'static [&'static str],
}

/// The fixed set of semantic dimensions used to score prompt coverage.
pub static CATEGORIES: &[CategoryDef] = &[
    CategoryDef {
        name: "personality",
        keywords: &[
            "personality", "tone", "friendly", "warm", "empathetic", "persona",
            "character", "polite",
        ],
        patterns: &[
            r"(?i)\byou are (a|an)\b",
            r"(?i)\bact as\b",
            r"(?i)\byour (tone|personality|style)\b",
        ],
    },
    CategoryDef {
        name: "capabilities",
        keywords: &[
            "capable", "capabilities", "ability", "able to", "tools", "functions",
            "skills", "tasks",
        ],
        patterns: &[
            r"(?i)\byou can\b",
            r"(?i)\bhelp (users?|people) (with|to)\b",
            r"(?i)\bassist (with|in)\b",
        ],
    },
    CategoryDef {
        name: "limitations",
        keywords: &[
            "cannot", "limitation", "limitations", "limited", "restricted",
            "unable", "do not have",
        ],
        patterns: &[
            r"(?i)\byou (cannot|can't|may not)\b",
            r"(?i)\bnot able to\b",
            r"(?i)\bbeyond your\b",
        ],
    },
    CategoryDef {
        name: "safety",
        keywords: &[
            "safety", "safe", "harmful", "dangerous", "refuse", "illegal",
            "unsafe", "malicious",
        ],
        patterns: &[
            r"(?i)\bdo not (provide|generate|create|produce)\b",
            r"(?i)\b(must|should) (not|never)\b",
            r"(?i)\brefuse to\b",
        ],
    },
    CategoryDef {
        name: "interaction_style",
        keywords: &[
            "respond", "answer", "conversation", "user", "dialogue", "clarify",
            "concise", "questions",
        ],
        patterns: &[
            r"(?i)\brespond (in|with|to)\b",
            r"(?i)\bwhen (the )?user\b",
            r"(?i)\bask (for )?clarif",
        ],
    },
    CategoryDef {
        name: "knowledge",
        keywords: &[
            "knowledge", "information", "facts", "sources", "training",
            "cutoff", "cite", "accurate",
        ],
        patterns: &[
            r"(?i)\bknowledge cutoff\b",
            r"(?i)\bup[- ]to[- ]date\b",
            r"(?i)\btraining data\b",
        ],
    },
    CategoryDef {
        name: "formatting",
        keywords: &[
            "format", "markdown", "bullet", "list", "heading", "code block",
            "json", "table",
        ],
        patterns: &[
            r"(?i)\buse markdown\b",
            r"(?i)\bformat (your|the)\b",
            r"(?i)\bcode blocks?\b",
        ],
    },
    CategoryDef {
        name: "identity",
        keywords: &[
            "identity", "assistant", "model", "created by", "developed by",
            "your name",
        ],
        patterns: &[
            r"(?i)\byour name is\b",
            r"(?i)\b(created|developed|made|built) by\b",
            r"(?i)\byou are (called|named)\b",
        ],
    },
];

/// The categories the enhancer treats as essential coverage.
pub const IMPORTANT_CATEGORIES: [&str; 4] =
    ["personality", "capabilities", "safety", "limitations"];

/// Relevance saturates at this raw score.
const SCORE_CAP: f64 = 5.0;
/// Representative sentences retained per category.
const MAX_SENTENCES: usize = 3;

static COMPILED_PATTERNS: Lazy<Vec<Vec<Regex>>> = Lazy::new(|| {
    CATEGORIES
        .iter()
        .map(|def| {
            def.patterns
                .iter()
                .map(|p| Regex::new(p).expect("static category pattern must compile"))
                .collect()
        })
        .collect()
});

/// Score every category in the table against one prompt text.
pub fn score_all(text: &str, sentences: &[String]) -> BTreeMap<String, CategoryScore> {
    let lower = text.to_lowercase();
    CATEGORIES
        .iter()
        .enumerate()
        .map(|(i, def)| {
            let regexes = &COMPILED_PATTERNS[i];

            let matched_keywords: Vec<String> = def
                .keywords
                .iter()
                .filter(|kw| lower.contains(&kw.to_lowercase()))
                .map(|kw| kw.to_string())
                .collect();
            let pattern_hits = regexes.iter().filter(|re| re.is_match(text)).count();

            let score = matched_keywords.len() as f64 + 2.0 * pattern_hits as f64;
            let relevance = (score / SCORE_CAP).min(1.0);

            let matched_sentences: Vec<String> = sentences
                .iter()
                .filter(|s| sentence_matches(s, def, regexes))
                .take(MAX_SENTENCES)
                .cloned()
                .collect();

            (
                def.name.to_string(),
                CategoryScore {
                    score,
                    relevance,
                    matched_keywords,
                    sentences: matched_sentences,
                },
            )
        })
        .collect()
}

fn sentence_matches(sentence: &str, def: &CategoryDef, regexes: &[Regex]) -> bool {
    let lower = sentence.to_lowercase();
    def.keywords.iter().any(|kw| lower.contains(&kw.to_lowercase()))
        || regexes.iter().any(|re| re.is_match(sentence))
}
