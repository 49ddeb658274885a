//! Raw text + filename → [`DocumentRecord`].
//!
//! Parsing is strictly local: filename decomposition, source-URL scan,
//! prompt-text extraction (four strategies in a fixed order), and a single
//! linear scan for headed sections. A parse failure is a skip, not an abort:
//! `parse_all` logs the failure with filename context and continues with the
//! rest of the batch.

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::ParserConfig;
use crate::error::{PromptError, Result};
use crate::models::{
    DocumentRecord, ParseOutcome, PromptMetadata, RawDocument, Section, SkippedDocument,
};
use crate::text;

/// Lines scanned for a `source:` marker.
const SOURCE_SCAN_LINES: usize = 10;

// Filename forms, most specific first: bare service, service-model-version
// (dotted or v-prefixed numeric version), then service-model where the model
// may itself contain hyphens and dots (e.g. claude-3.5-sonnet).
static FN_SERVICE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9]+)_(\d{8})$").expect("static regex"));
static FN_SERVICE_MODEL_VERSION_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9]+)-(.+)-(v?\d+(?:\.\d+)*)_(\d{8})$").expect("static regex")
});
static FN_SERVICE_MODEL_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9]+)-(.+)_(\d{8})$").expect("static regex"));

static SOURCE_ANGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)source:\s*<([^>\s]+)>").expect("static regex"));
static SOURCE_MARKDOWN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)source:\s*\[[^\]]*\]\(([^)\s]+)\)").expect("static regex"));

static DATE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{8}$").expect("static regex"));

/// Parse one raw document. Errors are skips, never panics.
pub fn parse(raw_text: &str, filename: &str, cfg: &ParserConfig) -> Result<DocumentRecord> {
    // Floors are in characters, so multi-byte text is not over-counted.
    let char_count = raw_text.chars().count();
    if char_count < cfg.min_document_chars {
        return Err(PromptError::DocumentTooShort {
            filename: filename.to_string(),
            length: char_count,
            minimum: cfg.min_document_chars,
        });
    }

    let metadata = decompose_filename(filename);
    let source_url = extract_source_url(raw_text);
    let sections = extract_sections(raw_text);

    let prompt_text = extract_prompt_text(raw_text, &sections, cfg.min_prompt_chars).ok_or_else(
        || PromptError::NoPromptText {
            filename: filename.to_string(),
        },
    )?;

    let word_count = text::word_count(&prompt_text);
    let mut hasher = Sha256::new();
    hasher.update(raw_text.as_bytes());
    let content_hash = format!("{:x}", hasher.finalize());

    Ok(DocumentRecord {
        filename: filename.to_string(),
        metadata,
        source_url,
        prompt_text: Some(prompt_text),
        sections,
        word_count,
        raw_text: raw_text.to_string(),
        content_hash,
    })
}

/// Parse a whole batch in parallel. Unparseable entries are omitted from
/// `records` and listed in `skipped`; input order is preserved.
pub fn parse_all(docs: &[RawDocument], cfg: &ParserConfig) -> ParseOutcome {
    let results: Vec<(&RawDocument, Result<DocumentRecord>)> = docs
        .par_iter()
        .map(|doc| (doc, parse(&doc.text, &doc.filename, cfg)))
        .collect();

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    for (doc, result) in results {
        match result {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(filename = %doc.filename, error = %err, "skipping document");
                skipped.push(SkippedDocument {
                    filename: doc.filename.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    debug!(
        parsed = records.len(),
        skipped = skipped.len(),
        "batch parse complete"
    );

    ParseOutcome { records, skipped }
}

// ============ Filename decomposition ============

/// Decompose `service[-model[-version]]_YYYYMMDD[.ext]` filenames, falling
/// back to a loose `-`/`_` split with the last token as a date candidate.
pub fn decompose_filename(filename: &str) -> PromptMetadata {
    let stem = filename
        .rsplit_once('/')
        .map(|(_, name)| name)
        .unwrap_or(filename);
    let stem = stem.rsplit_once('.').map(|(base, _)| base).unwrap_or(stem);

    if let Some(caps) = FN_SERVICE_DATE.captures(stem) {
        return PromptMetadata {
            service: caps[1].to_lowercase(),
            model: None,
            version: None,
            date: parse_date(&caps[2]),
        };
    }
    if let Some(caps) = FN_SERVICE_MODEL_VERSION_DATE.captures(stem) {
        return PromptMetadata {
            service: caps[1].to_lowercase(),
            model: Some(caps[2].to_string()),
            version: Some(caps[3].to_string()),
            date: parse_date(&caps[4]),
        };
    }
    if let Some(caps) = FN_SERVICE_MODEL_DATE.captures(stem) {
        return PromptMetadata {
            service: caps[1].to_lowercase(),
            model: Some(caps[2].to_string()),
            version: None,
            date: parse_date(&caps[3]),
        };
    }

    // Loose fallback: split on - and _, last token may be a date.
    let tokens: Vec<&str> = stem.split(['-', '_']).filter(|t| !t.is_empty()).collect();
    if tokens.is_empty() {
        return PromptMetadata {
            service: stem.to_lowercase(),
            model: None,
            version: None,
            date: None,
        };
    }

    let (date, rest) = match tokens.last() {
        Some(last) if DATE_TOKEN.is_match(last) => {
            (parse_date(last), &tokens[..tokens.len() - 1])
        }
        _ => (None, &tokens[..]),
    };

    let service = rest.first().map_or_else(
        || stem.to_lowercase(),
        |s| s.to_lowercase(),
    );
    let model = if rest.len() > 1 {
        Some(rest[1..].join("-"))
    } else {
        None
    };

    PromptMetadata {
        service,
        model,
        version: None,
        date,
    }
}

/// A date token must be eight digits and a real calendar date, else `None`.
fn parse_date(token: &str) -> Option<chrono::NaiveDate> {
    if !DATE_TOKEN.is_match(token) {
        return None;
    }
    chrono::NaiveDate::parse_from_str(token, "%Y%m%d").ok()
}

// ============ Source URL ============

/// Scan only the first lines for a `source:` marker; first match wins.
fn extract_source_url(raw_text: &str) -> Option<String> {
    for line in raw_text.lines().take(SOURCE_SCAN_LINES) {
        if let Some(caps) = SOURCE_ANGLE.captures(line) {
            return Some(caps[1].to_string());
        }
        if let Some(caps) = SOURCE_MARKDOWN.captures(line) {
            return Some(caps[1].to_string());
        }
    }
    None
}

// ============ Sections ============

/// Single linear scan: each heading starts a new named section; subsequent
/// non-heading content accumulates until the next heading.
fn extract_sections(raw_text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in raw_text.lines() {
        if text::is_heading(line) {
            if let Some((heading, body)) = current.take() {
                sections.push(Section {
                    heading,
                    body: body.join("\n").trim().to_string(),
                });
            }
            current = Some((text::heading_text(line).to_string(), Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((heading, body)) = current {
        sections.push(Section {
            heading,
            body: body.join("\n").trim().to_string(),
        });
    }
    sections
}

// ============ Prompt text ============

/// Try the four extraction strategies in order; the first one yielding at
/// least `min_chars` of trimmed text wins.
fn extract_prompt_text(
    raw_text: &str,
    sections: &[Section],
    min_chars: usize,
) -> Option<String> {
    let candidates = [
        system_prompt_section(sections),
        first_headed_section(sections),
        after_metadata_separator(raw_text),
        heuristic_scan(raw_text),
    ];

    candidates
        .into_iter()
        .flatten()
        .map(|c| c.trim().to_string())
        .find(|c| c.chars().count() >= min_chars)
}

fn system_prompt_section(sections: &[Section]) -> Option<String> {
    sections
        .iter()
        .find(|s| s.heading.to_lowercase().contains("system prompt"))
        .map(|s| s.body.clone())
}

fn first_headed_section(sections: &[Section]) -> Option<String> {
    sections
        .iter()
        .find(|s| !s.body.is_empty())
        .map(|s| s.body.clone())
}

/// Content after a `---` metadata separator. A leading front-matter block
/// (`---` on the first line) is closed by the second separator.
fn after_metadata_separator(raw_text: &str) -> Option<String> {
    let lines: Vec<&str> = raw_text.lines().collect();
    let separators: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.trim() == "---")
        .map(|(i, _)| i)
        .collect();

    let start = match separators.as_slice() {
        [] => return None,
        [first, second, ..] if *first == 0 => second + 1,
        [first, ..] => first + 1,
    };
    if start >= lines.len() {
        return None;
    }
    Some(lines[start..].join("\n"))
}

/// Last resort: skip `source:` lines and headings, return everything from
/// the first substantive line onward.
fn heuristic_scan(raw_text: &str) -> Option<String> {
    let lines: Vec<&str> = raw_text.lines().collect();
    let start = lines.iter().position(|line| {
        let t = line.trim();
        !t.is_empty() && !t.to_lowercase().starts_with("source:") && !text::is_heading(t)
    })?;
    Some(lines[start..].join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn cfg() -> ParserConfig {
        ParserConfig::default()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const BODY: &str = "# System Prompt\n\nYou are a helpful assistant. Always answer politely \
                        and clearly, and refuse harmful requests without lecturing the user.\n";

    #[test]
    fn filename_service_model_date() {
        let meta = decompose_filename("anthropic-claude-3.5-sonnet_20240712.md");
        assert_eq!(meta.service, "anthropic");
        assert_eq!(meta.model.as_deref(), Some("claude-3.5-sonnet"));
        assert_eq!(meta.version, None);
        assert_eq!(meta.date, Some(date(2024, 7, 12)));
    }

    #[test]
    fn filename_service_date_only() {
        let meta = decompose_filename("openai_20230315.md");
        assert_eq!(meta.service, "openai");
        assert_eq!(meta.model, None);
        assert_eq!(meta.date, Some(date(2023, 3, 15)));
    }

    #[test]
    fn filename_with_version_suffix() {
        let meta = decompose_filename("mistral-large-v2_20240901.md");
        assert_eq!(meta.service, "mistral");
        assert_eq!(meta.model.as_deref(), Some("large"));
        assert_eq!(meta.version.as_deref(), Some("v2"));
        assert_eq!(meta.date, Some(date(2024, 9, 1)));
    }

    #[test]
    fn filename_fallback_and_bad_dates() {
        // Seven digits is not a date.
        let meta = decompose_filename("cohere-command_2024071.md");
        assert_eq!(meta.service, "cohere");
        assert_eq!(meta.date, None);

        // Eight digits but not a calendar date.
        let meta = decompose_filename("cohere_20241399.md");
        assert_eq!(meta.date, None);

        // No date token at all.
        let meta = decompose_filename("notes.md");
        assert_eq!(meta.service, "notes");
        assert_eq!(meta.date, None);
    }

    #[test]
    fn rejects_documents_under_the_char_floor() {
        let short = "x".repeat(80);
        let err = parse(&short, "tiny_20240101.md", &cfg()).unwrap_err();
        assert!(matches!(err, PromptError::DocumentTooShort { .. }));
    }

    #[test]
    fn size_floors_count_characters_not_bytes() {
        // 80 two-byte characters: 160 bytes, still under the 100-char floor.
        let short = "é".repeat(80);
        let err = parse(&short, "tiny_20240101.md", &cfg()).unwrap_err();
        assert!(matches!(
            err,
            PromptError::DocumentTooShort { length: 80, .. }
        ));

        // 45 two-byte characters of substantive text (90 bytes) padded past
        // the document floor: under the 50-char prompt floor.
        let doc = format!("{}{}", "é".repeat(45), "\n".repeat(60));
        let err = parse(&doc, "short-prompt_20240101.md", &cfg()).unwrap_err();
        assert!(matches!(err, PromptError::NoPromptText { .. }));
    }

    #[test]
    fn extracts_system_prompt_section() {
        let record = parse(BODY, "anthropic_20240712.md", &cfg()).unwrap();
        let prompt = record.prompt_text.unwrap();
        assert!(prompt.starts_with("You are a helpful assistant"));
        assert_eq!(record.sections.len(), 1);
        assert_eq!(record.sections[0].heading, "System Prompt");
    }

    #[test]
    fn source_url_angle_and_markdown_forms() {
        let angle = format!("source: <https://example.com/prompt>\n\n{BODY}");
        let record = parse(&angle, "a_20240101.md", &cfg()).unwrap();
        assert_eq!(
            record.source_url.as_deref(),
            Some("https://example.com/prompt")
        );

        let md = format!("Source: [origin](https://example.com/md)\n\n{BODY}");
        let record = parse(&md, "a_20240101.md", &cfg()).unwrap();
        assert_eq!(record.source_url.as_deref(), Some("https://example.com/md"));
    }

    #[test]
    fn source_marker_beyond_first_ten_lines_is_ignored() {
        let padding = "\n".repeat(12);
        let doc = format!("{BODY}{padding}source: <https://example.com/late>");
        let record = parse(&doc, "a_20240101.md", &cfg()).unwrap();
        assert_eq!(record.source_url, None);
    }

    #[test]
    fn front_matter_separator_extraction() {
        let doc = "---\nservice: demo\ndate: 2024\n---\nYou must always answer in French and \
                   cite your sources when asked about facts.\nKeep answers short.";
        let record = parse(doc, "demo_20240101.md", &cfg()).unwrap();
        let prompt = record.prompt_text.unwrap();
        assert!(prompt.starts_with("You must always answer in French"));
    }

    #[test]
    fn heuristic_scan_skips_source_and_headings() {
        let doc = "source: <https://example.com>\n\nThis prompt line is substantive enough to \
                   be the extracted body of the document record.";
        let record = parse(doc, "misc_20240101.md", &cfg()).unwrap();
        assert!(record
            .prompt_text
            .unwrap()
            .starts_with("This prompt line is substantive"));
    }

    #[test]
    fn rejects_when_no_strategy_yields_enough() {
        // Long enough overall, but nothing substantive after markers.
        let doc = format!("# Heading only\n{}\nsource: <https://example.com>\n", " ".repeat(120));
        let err = parse(&doc, "hollow_20240101.md", &cfg()).unwrap_err();
        assert!(matches!(err, PromptError::NoPromptText { .. }));
    }

    #[test]
    fn sections_accumulate_until_next_heading() {
        let doc = "# One\nfirst body line\nsecond line\n## Two\nother body\n";
        let sections = extract_sections(doc);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].body, "first body line\nsecond line");
        assert_eq!(sections[1].heading, "Two");
    }

    #[test]
    fn batch_parse_skips_bad_documents_and_continues() {
        let docs = vec![
            RawDocument::new("good_20240101.md", BODY),
            RawDocument::new("short.md", "way too short"),
            RawDocument::new("also-good_20240202.md", BODY),
        ];
        let outcome = parse_all(&docs, &cfg());
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.skip_count(), 1);
        assert_eq!(outcome.skipped[0].filename, "short.md");
        // Input order preserved.
        assert_eq!(outcome.records[0].filename, "good_20240101.md");
    }
}
