//! # Source Ingestion Module
//!
//! ## Purpose
//! Turns heterogeneous source documents into the canonical corpus shape. The
//! per-format parsers share no parsing logic — their only shared contract is
//! the output [`Corpus`] — so each is an independent implementation of one
//! narrow trait, selected by a format tag at the boundary.
//!
//! ## Input/Output Specification
//! - **Input**: source text (file contents or a fetched body), NFC-normalized
//!   before parsing
//! - **Output**: a canonical [`Corpus`], or a `SourceParse` error when the
//!   document yields nothing
//!
//! ## Architecture
//! - `SourceParser` trait: the narrow `parse(text) → Corpus` interface
//! - `sources/plain_lines.rs`: one canonical `"Book C:V text"` line per verse
//! - `sources/chapter_text.rs`: `CHAPTER N` headings with numbered verses
//! - `sources/markdown.rs`: blockquote markdown with section renumbering
//! - `fetch_text`: bounded one-shot download of a source document

pub mod sources;

use crate::corpus::Corpus;
use crate::errors::{PipelineError, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;
use unicode_normalization::UnicodeNormalization;

pub use sources::chapter_text::ChapterTextParser;
pub use sources::markdown::EnochMarkdownParser;
pub use sources::plain_lines::PlainLinesParser;

/// Format tag selecting a parser at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// One canonical `"Book C:V text"` line per verse
    PlainLines,
    /// `CHAPTER N` headings followed by `N. text` verses
    ChapterText,
    /// Blockquote markdown with `Book N` sections and `## Chapter N` headings
    EnochMarkdown,
}

impl FromStr for SourceFormat {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "plain-lines" | "lines" => Ok(SourceFormat::PlainLines),
            "chapter-text" | "text" => Ok(SourceFormat::ChapterText),
            "enoch-markdown" | "markdown" | "md" => Ok(SourceFormat::EnochMarkdown),
            other => Err(crate::config_error!("unknown source format '{}'", other)),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SourceFormat::PlainLines => f.write_str("plain-lines"),
            SourceFormat::ChapterText => f.write_str("chapter-text"),
            SourceFormat::EnochMarkdown => f.write_str("enoch-markdown"),
        }
    }
}

/// Narrow interface every format-specific parser implements
pub trait SourceParser {
    /// Short format name for logging and errors
    fn name(&self) -> &'static str;

    /// Convert one source document into the canonical corpus shape
    fn parse(&self, input: &str) -> Result<Corpus>;
}

/// Select the parser for a format tag
pub fn parser_for(format: SourceFormat) -> Box<dyn SourceParser> {
    match format {
        SourceFormat::PlainLines => Box::new(PlainLinesParser::default()),
        SourceFormat::ChapterText => Box::new(ChapterTextParser::default()),
        SourceFormat::EnochMarkdown => Box::new(EnochMarkdownParser::default()),
    }
}

/// NFC-normalize and parse one source document
pub fn parse_source(format: SourceFormat, input: &str) -> Result<Corpus> {
    let normalized: String = input.nfc().collect();
    let parser = parser_for(format);
    let corpus = parser.parse(&normalized)?;
    info!(
        "Parsed {} source: {} books, {} verses",
        parser.name(),
        corpus.book_count(),
        corpus.verse_count()
    );
    Ok(corpus)
}

/// Fetch a source document with a bounded wait. A failure here means "no
/// input available" — the caller never sees a partial body as a corpus.
pub fn fetch_text(url: &str, timeout: Duration) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PipelineError::Fetch {
            url: url.to_string(),
            details: e.to_string(),
        })?;
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| PipelineError::Fetch {
            url: url.to_string(),
            details: e.to_string(),
        })?;
    let body = response.text().map_err(|e| PipelineError::Fetch {
        url: url.to_string(),
        details: e.to_string(),
    })?;
    info!("Fetched {} bytes from {}", body.len(), url);
    Ok(body.strip_prefix('\u{feff}').unwrap_or(&body).to_string())
}
