//! Lexical primitives shared by the whole pipeline.
//!
//! Tokenizer, suffix-stripping stemmer, sentence splitter, syllable
//! estimator, and line classification (headings, bullets, numbered items).
//! All pure functions over `&str`; no cross-call state.

/// Sentence fragments shorter than this are discarded as noise.
pub const MIN_SENTENCE_CHARS: usize = 10;

/// Lowercased alphanumeric tokens, split on punctuation and whitespace.
/// Apostrophes are dropped so "don't" tokenizes as `dont`.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            current.extend(ch.to_lowercase());
        } else if ch == '\'' {
            // drop, keep the token running
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Whitespace word count over the raw text.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Suffix-stripping table, longest suffix first. Applied once; the stem must
/// keep at least 3 characters or the token is returned unchanged.
const SUFFIXES: &[&str] = &[
    "ization", "fulness", "ousness", "iveness", "ational", "ingly", "ously",
    "ation", "ments", "ness", "ment", "tion", "sion", "ance", "ence", "able",
    "ible", "ally", "ized", "izes", "ical", "ful", "ous", "ive", "ing", "est",
    "ies", "ily", "ed", "ly", "es", "er", "s",
];

/// Deterministic stemmer: strips the longest matching suffix once.
pub fn stem(token: &str) -> String {
    for suffix in SUFFIXES {
        if let Some(base) = token.strip_suffix(suffix) {
            if base.len() >= 3 {
                return base.to_string();
            }
        }
    }
    token.to_string()
}

/// Tokenize then stem every token.
pub fn stemmed_tokens(text: &str) -> Vec<String> {
    tokenize(text).iter().map(|t| stem(t)).collect()
}

/// Split on sentence terminators, keeping fragments longer than
/// [`MIN_SENTENCE_CHARS`], trimmed, in document order.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.len() > MIN_SENTENCE_CHARS)
        .map(str::to_string)
        .collect()
}

/// Blank-line-delimited blocks with non-empty content.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Approximate syllable count: vowel-group transitions, minus one for a
/// silent trailing "e", floored at one per word.
pub fn syllable_count(word: &str) -> usize {
    let lower = word.to_lowercase();
    let mut count = 0usize;
    let mut prev_vowel = false;
    for ch in lower.chars() {
        let vowel = matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    if lower.ends_with('e') && !lower.ends_with("le") && count > 1 {
        count -= 1;
    }
    count.max(1)
}

/// Mean syllables per word over the whole text. Returns 0.0 for empty text.
pub fn avg_syllables_per_word(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let total: usize = words.iter().map(|w| syllable_count(w)).sum();
    total as f64 / words.len() as f64
}

// ============ Line classification ============

/// Markdown heading marker.
pub fn is_heading(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Heading text with markers and surrounding whitespace removed.
pub fn heading_text(line: &str) -> &str {
    line.trim_start().trim_start_matches('#').trim()
}

/// Bullet glyph at the start of the line.
pub fn is_bullet(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("- ") || t.starts_with("* ") || t.starts_with("• ")
}

/// Digit(s) followed by a period or parenthesis at the start of the line.
pub fn is_numbered(line: &str) -> bool {
    let t = line.trim_start();
    let digits: String = t.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return false;
    }
    let rest = &t[digits.len()..];
    rest.starts_with('.') || rest.starts_with(')')
}
