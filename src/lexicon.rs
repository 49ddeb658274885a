//! Static sentiment polarity lexicon.
//!
//! The lexicon ships as a compiled-in asset (`assets/sentiment_lexicon.txt`)
//! and is parsed once on first use. Scoring is a plain polarity sum over
//! tokens, normalized by token count; no external NLP dependency.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::models::{Sentiment, SentimentLabel};
use crate::text;

const LEXICON_SRC: &str = include_str!("../assets/sentiment_lexicon.txt");

/// Label thresholds on the normalized score.
const POSITIVE_FLOOR: f64 = 0.1;
const NEGATIVE_CEIL: f64 = -0.1;

static LEXICON: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    LEXICON_SRC
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (token, polarity) = line.split_once(['\t', ' '])?;
            Some((token, polarity.trim().parse::<f64>().ok()?))
        })
        .collect()
});

/// Polarity of a single lowercased token, 0.0 if unlisted.
pub fn polarity(token: &str) -> f64 {
    LEXICON.get(token).copied().unwrap_or(0.0)
}

/// Lexicon-based sentiment over the whole text: polarity sum over tokens,
/// normalized by token count. Empty text is neutral with score 0.0.
pub fn score_sentiment(text: &str) -> Sentiment {
    let tokens = text::tokenize(text);
    if tokens.is_empty() {
        return Sentiment {
            score: 0.0,
            label: SentimentLabel::Neutral,
        };
    }
    let sum: f64 = tokens.iter().map(|t| polarity(t)).sum();
    let score = sum / tokens.len() as f64;
    let label = if score > POSITIVE_FLOOR {
        SentimentLabel::Positive
    } else if score < NEGATIVE_CEIL {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };
    Sentiment { score, label }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_parses_nonempty() {
        assert!(LEXICON.len() > 50);
        assert!(polarity("helpful") > 0.0);
        assert!(polarity("harmful") < 0.0);
        assert_eq!(polarity("table"), 0.0);
    }

    #[test]
    fn positive_text_labels_positive() {
        let s = score_sentiment("Be helpful, honest, and kind. Great friendly support.");
        assert_eq!(s.label, SentimentLabel::Positive);
        assert!(s.score > 0.1);
    }

    #[test]
    fn negative_text_labels_negative() {
        let s = score_sentiment("Harmful dangerous toxic content. Deceptive malicious harm.");
        assert_eq!(s.label, SentimentLabel::Negative);
        assert!(s.score < -0.1);
    }

    #[test]
    fn plain_text_is_neutral() {
        let s = score_sentiment("The quarterly report covers three regional offices.");
        assert_eq!(s.label, SentimentLabel::Neutral);
    }
}
