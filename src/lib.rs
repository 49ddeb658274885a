//! # Promptscope
//!
//! A corpus analysis toolkit for AI system prompts.
//!
//! Promptscope parses collections of prompt documents (markdown or plain
//! text), scores them along content and quality dimensions, compares
//! versions, and produces concrete improvement suggestions with an optional
//! mechanical rewrite.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌─────────────┐
//! │  Parser   │──▶│ Analyzer  │──▶│ Comparator  │
//! │ raw docs  │   │ per-doc + │   │ pairs +     │
//! │ -> record │   │ corpus    │   │ evolution   │
//! └──────────┘   └─────┬─────┘   └─────────────┘
//!                      │
//!                      ▼
//!                ┌──────────┐   ┌──────────┐
//!                │ Enhancer │──▶│ Revision │
//!                │ score +  │   │ rewrite  │
//!                │ suggest  │   │ proposal │
//!                └──────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use promptscope::config::Config;
//! use promptscope::{analyzer, enhancer, parser};
//!
//! # fn main() -> promptscope::error::Result<()> {
//! let cfg = Config::default();
//! let raw = std::fs::read_to_string("anthropic_20240101.md").unwrap();
//! let record = parser::parse(&raw, "anthropic_20240101.md", &cfg.parser)?;
//! let analysis = analyzer::analyze(&record)?;
//! let report = enhancer::suggest(&record, &analysis, &cfg.enhancer)?;
//! println!("{} scored {:.0}", report.filename, report.overall_score);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`parser`] | Document parsing and metadata extraction |
//! | [`analyzer`] | Per-document and corpus analysis |
//! | [`comparator`] | Pairwise comparison and evolution tracking |
//! | [`enhancer`] | Quality scoring and suggestions |
//! | [`revision`] | Mechanical rewrite proposals |
//! | [`similarity`] | Jaccard, cosine, and edit similarity |
//! | [`tfidf`] | Term weighting |
//! | [`categories`] | Content category definitions |
//! | [`lexicon`] | Sentiment lexicon |
//! | [`trend`] | Time-series trend classification |
//! | [`text`] | Tokenization and text utilities |

pub mod analyzer;
pub mod categories;
pub mod comparator;
pub mod config;
pub mod enhancer;
pub mod error;
pub mod lexicon;
pub mod models;
pub mod parser;
pub mod revision;
pub mod similarity;
pub mod text;
pub mod tfidf;
pub mod trend;

pub use error::{PromptError, Result};
pub use models::{
    AnalysisResult, ComparisonResult, CorpusAnalysis, DocumentRecord, EnhancementReport,
    EvolutionReport, RevisionProposal,
};
