//! Parser for the blockquote-markdown Book of Enoch, where each of the five
//! traditional books restarts its chapter numbering at 1. Chapters are
//! renumbered onto the standard 1 Enoch scheme:
//!
//! - Book 1 (Watchers): chapters 1–36
//! - Book 2 (Parables): chapters 37–71
//! - Book 3 (Luminaries): chapters 72–82
//! - Book 4 (Dream Visions): chapters 83–90
//! - Book 5 (Epistle): chapters 91–108
//!
//! The output is padded to the full 108 chapters with empty placeholder
//! entries so downstream structure-preserving passes see the whole book.

use crate::corpus::Corpus;
use crate::errors::{PipelineError, Result};
use crate::ingestion::SourceParser;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static SECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*>\s*Book\s+(\d+)[:\-]").expect("section heading"));
static CHAPTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*##\s+Chapter\s+(\d+)").expect("chapter heading"));
static VERSE_NUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*>\s*(\d+)\s*$").expect("verse number"));
static VERSE_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*>\s+(.+)$").expect("verse text"));

/// Starting chapter on the standard scheme for each section
const SECTION_STARTS: &[(u32, u32)] = &[(1, 1), (2, 37), (3, 72), (4, 83), (5, 91)];

const STANDARD_CHAPTERS: u32 = 108;

#[derive(Debug)]
pub struct EnochMarkdownParser {
    book_name: String,
}

impl Default for EnochMarkdownParser {
    fn default() -> Self {
        Self {
            book_name: "Book of Enoch".to_string(),
        }
    }
}

impl EnochMarkdownParser {
    pub fn new(book_name: impl Into<String>) -> Self {
        Self {
            book_name: book_name.into(),
        }
    }
}

impl SourceParser for EnochMarkdownParser {
    fn name(&self) -> &'static str {
        "enoch-markdown"
    }

    fn parse(&self, input: &str) -> Result<Corpus> {
        let mut corpus = Corpus::new();
        let mut section_start: u32 = 1;
        let mut in_section = false;
        let mut chapter_in_section: Option<u32> = None;
        let mut verse: Option<u32> = None;
        let mut buffer: Vec<String> = Vec::new();

        let mut flush = |corpus: &mut Corpus,
                         section_start: u32,
                         chapter_in_section: Option<u32>,
                         verse: Option<u32>,
                         buffer: &mut Vec<String>| {
            if let (Some(ch), Some(v)) = (chapter_in_section, verse) {
                if !buffer.is_empty() {
                    let global_chapter = section_start + ch - 1;
                    corpus.insert_verse(&self.book_name, global_chapter, v, buffer.join(" "));
                    buffer.clear();
                }
            }
        };

        for line in input.lines() {
            if let Some(caps) = SECTION_RE.captures(line) {
                flush(&mut corpus, section_start, chapter_in_section, verse, &mut buffer);
                let section: u32 = caps[1].parse().unwrap_or(0);
                match SECTION_STARTS.iter().find(|(num, _)| *num == section) {
                    Some((_, start)) => section_start = *start,
                    None => {
                        warn!("Unknown section 'Book {}', keeping current numbering", section);
                    }
                }
                in_section = true;
                chapter_in_section = None;
                verse = None;
                continue;
            }
            if let Some(caps) = CHAPTER_RE.captures(line) {
                flush(&mut corpus, section_start, chapter_in_section, verse, &mut buffer);
                chapter_in_section = caps[1].parse().ok();
                verse = None;
                continue;
            }
            if !in_section || chapter_in_section.is_none() {
                continue;
            }
            if let Some(caps) = VERSE_NUM_RE.captures(line) {
                flush(&mut corpus, section_start, chapter_in_section, verse, &mut buffer);
                // Verse numbers are sometimes zero-padded in the source.
                verse = caps[1].trim_start_matches('0').parse().ok().or(Some(1));
                continue;
            }
            if verse.is_some() {
                if let Some(caps) = VERSE_TEXT_RE.captures(line) {
                    buffer.push(caps[1].trim().to_string());
                }
            }
        }
        flush(&mut corpus, section_start, chapter_in_section, verse, &mut buffer);

        if corpus.verse_count() == 0 {
            return Err(PipelineError::SourceParse {
                format: self.name().to_string(),
                details: "no sections, chapters, or verses found".to_string(),
            });
        }
        for ch in 1..=STANDARD_CHAPTERS {
            corpus.ensure_chapter(&self.book_name, ch);
        }
        Ok(corpus)
    }
}
