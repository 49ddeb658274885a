//! Error types for promptscope operations.
//!
//! Every failure mode a caller can hit is a variant of [`PromptError`], so
//! batch drivers can filter failed documents uniformly. Per-document failures
//! never abort a batch: `parse_all` and `analyze_corpus` catch them at the
//! batch boundary and report skip counts instead.

use thiserror::Error;

/// Failure modes of the parse/analyze/compare/enhance pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    /// Raw document body is below the minimum size floor.
    #[error("document too short: {filename} ({length} chars, minimum {minimum})")]
    DocumentTooShort {
        filename: String,
        length: usize,
        minimum: usize,
    },

    /// No extraction strategy yielded enough prompt text.
    #[error("no extractable prompt text in {filename}")]
    NoPromptText { filename: String },

    /// Analysis or enhancement requested on a record with no prompt text.
    #[error("record has no prompt text: {0}")]
    MissingContent(String),

    /// One side of a pairwise comparison lacks prompt text.
    #[error("cannot compare: {0}")]
    ComparisonInput(String),

    /// Evolution or trend analysis requested with too few qualifying records.
    #[error("insufficient data: {0}")]
    InsufficientData(String),
}

/// Result type alias for promptscope operations.
pub type Result<T> = std::result::Result<T, PromptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_filename_context() {
        let err = PromptError::DocumentTooShort {
            filename: "tiny.md".to_string(),
            length: 80,
            minimum: 100,
        };
        let msg = err.to_string();
        assert!(msg.contains("tiny.md"));
        assert!(msg.contains("80"));

        let err = PromptError::NoPromptText {
            filename: "empty.md".to_string(),
        };
        assert!(err.to_string().contains("empty.md"));
    }
}
