//! Mechanical rewrite pass driven by an enhancement report.
//!
//! Only two kinds of edits are attempted, both safe to apply blindly: a
//! heading inserted above the first line matching a section trigger when the
//! prompt has none, and a stub section appended for each missing content
//! dimension. Everything else in the report stays advisory. The original
//! record is never mutated.

use crate::error::{PromptError, Result};
use crate::models::{
    DocumentRecord, EnhancementReport, RevisionProposal, SuggestionDimension, SuggestionPriority,
};
use crate::text;

/// Cap on the projected score gain, in points.
const MAX_IMPROVEMENT: f64 = 40.0;
const HIGH_GAIN: f64 = 10.0;
const MEDIUM_GAIN: f64 = 5.0;

/// Heading inserted above the first line containing one of the trigger
/// phrases, checked in order.
const HEADING_TRIGGERS: &[(&str, &[&str])] = &[
    ("# Role", &["you are", "act as", "your role"]),
    ("# Interaction Style", &["respond", "tone", "style"]),
    ("# Safety", &["never", "do not", "refuse", "harmful"]),
];

/// Produce a revised prompt from the report's actionable suggestions.
pub fn revise(record: &DocumentRecord, report: &EnhancementReport) -> Result<RevisionProposal> {
    let prompt = record
        .prompt_text
        .as_deref()
        .ok_or_else(|| PromptError::MissingContent(record.filename.clone()))?;

    let mut revised = prompt.to_string();
    let mut applied = Vec::new();

    let wants_headings = report.suggestions.iter().any(|s| {
        s.dimension == SuggestionDimension::Structure && s.issue.contains("headings")
    });
    if wants_headings {
        if let Some((heading, line_idx)) = first_heading_site(&revised) {
            revised = insert_heading(&revised, heading, line_idx);
            applied.push(format!("inserted {} above the matching line", heading));
        }
    }

    for suggestion in report
        .suggestions
        .iter()
        .filter(|s| s.dimension == SuggestionDimension::Content && s.issue.contains("No "))
    {
        let dimension_name = suggestion
            .issue
            .trim_start_matches("No ")
            .trim_end_matches(" content");
        if dimension_name == "worked examples" {
            continue;
        }
        revised.push_str(&format!(
            "\n\n# {}\n\n{}\n",
            title_case(dimension_name),
            suggestion.example
        ));
        applied.push(format!("appended a {} section stub", dimension_name));
    }

    // The projection covers the whole report, not just the edits applied
    // here; the advisory suggestions count toward it too.
    let gain: f64 = report
        .suggestions
        .iter()
        .map(|s| match s.priority {
            SuggestionPriority::High => HIGH_GAIN,
            SuggestionPriority::Medium => MEDIUM_GAIN,
        })
        .sum();

    Ok(RevisionProposal {
        revised_text: revised,
        applied,
        estimated_improvement: gain.min(MAX_IMPROVEMENT),
    })
}

/// Index of the first line matching any trigger family, with its heading.
fn first_heading_site(prompt: &str) -> Option<(&'static str, usize)> {
    for (heading, triggers) in HEADING_TRIGGERS {
        for (idx, line) in prompt.lines().enumerate() {
            if text::is_heading(line) {
                continue;
            }
            let lower = line.to_lowercase();
            if triggers.iter().any(|t| lower.contains(t)) {
                return Some((*heading, idx));
            }
        }
    }
    None
}

fn insert_heading(prompt: &str, heading: &str, line_idx: usize) -> String {
    let mut out = Vec::new();
    for (idx, line) in prompt.lines().enumerate() {
        if idx == line_idx {
            out.push(heading.to_string());
            out.push(String::new());
        }
        out.push(line.to_string());
    }
    out.join("\n")
}

fn title_case(name: &str) -> String {
    name.split(['_', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
