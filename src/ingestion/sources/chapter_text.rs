//! Parser for simple chapter/verse text: `CHAPTER N` headings followed by
//! `N. text` (or `N text`, `N: text`) verses, with continuation lines joined
//! into the current verse. Chapters can be padded to a fixed count with
//! empty placeholder entries for books with a known standard extent.

use crate::corpus::Corpus;
use crate::errors::{PipelineError, Result};
use crate::ingestion::SourceParser;
use once_cell::sync::Lazy;
use regex::Regex;

static CHAPTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*CHAPTER\s+(\d{1,3})").expect("chapter heading"));
static VERSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,3})[:.\s]\s*(.*)$").expect("verse heading"));

#[derive(Debug)]
pub struct ChapterTextParser {
    book_name: String,
    /// Pad the book to this many chapters with empty placeholder entries
    pad_chapters: Option<u32>,
}

impl Default for ChapterTextParser {
    fn default() -> Self {
        // The common use is the 108-chapter Book of Enoch; empty chapters are
        // structural entries downstream consumers rely on.
        Self {
            book_name: "Book of Enoch".to_string(),
            pad_chapters: Some(108),
        }
    }
}

impl ChapterTextParser {
    pub fn new(book_name: impl Into<String>, pad_chapters: Option<u32>) -> Self {
        Self {
            book_name: book_name.into(),
            pad_chapters,
        }
    }
}

impl SourceParser for ChapterTextParser {
    fn name(&self) -> &'static str {
        "chapter-text"
    }

    fn parse(&self, input: &str) -> Result<Corpus> {
        let mut corpus = Corpus::new();
        let mut chapter: Option<u32> = None;
        let mut verse: Option<u32> = None;
        let mut buffer: Vec<String> = Vec::new();

        let mut flush =
            |corpus: &mut Corpus, chapter: Option<u32>, verse: Option<u32>, buffer: &mut Vec<String>| {
                if let (Some(ch), Some(v)) = (chapter, verse) {
                    if !buffer.is_empty() {
                        corpus.insert_verse(&self.book_name, ch, v, buffer.join(" "));
                        buffer.clear();
                    }
                }
            };

        for line in input.lines() {
            if let Some(caps) = CHAPTER_RE.captures(line) {
                flush(&mut corpus, chapter, verse, &mut buffer);
                chapter = caps[1].parse().ok();
                verse = None;
                continue;
            }
            if chapter.is_none() {
                continue;
            }
            if let Some(caps) = VERSE_RE.captures(line) {
                flush(&mut corpus, chapter, verse, &mut buffer);
                verse = caps[1].parse().ok();
                let text = caps[2].trim();
                if !text.is_empty() {
                    buffer.push(text.to_string());
                }
            } else if !line.trim().is_empty() && verse.is_some() {
                buffer.push(line.trim().to_string());
            }
        }
        flush(&mut corpus, chapter, verse, &mut buffer);

        if corpus.verse_count() == 0 {
            return Err(PipelineError::SourceParse {
                format: self.name().to_string(),
                details: "no chapters or verses found".to_string(),
            });
        }
        if let Some(total) = self.pad_chapters {
            for ch in 1..=total {
                corpus.ensure_chapter(&self.book_name, ch);
            }
        }
        Ok(corpus)
    }
}
