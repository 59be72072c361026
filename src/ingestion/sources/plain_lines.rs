//! Parser for the canonical line format: one `"Book C:V text"` line per
//! verse. This is the same grammar the pipeline's own text output uses, so
//! it doubles as the reader for previously serialized corpora.

use crate::address;
use crate::corpus::Corpus;
use crate::errors::{PipelineError, Result};
use crate::ingestion::SourceParser;
use tracing::warn;

#[derive(Debug, Default)]
pub struct PlainLinesParser;

impl SourceParser for PlainLinesParser {
    fn name(&self) -> &'static str {
        "plain-lines"
    }

    fn parse(&self, input: &str) -> Result<Corpus> {
        let mut corpus = Corpus::new();
        let mut skipped = 0;
        for line in input.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match address::decode_line(line) {
                Some(verse) => {
                    corpus.insert_verse(&verse.book, verse.chapter, verse.verse, verse.text);
                }
                None => {
                    warn!("Skipping line without a verse address: {}", line);
                    skipped += 1;
                }
            }
        }
        if corpus.verse_count() == 0 {
            return Err(PipelineError::SourceParse {
                format: self.name().to_string(),
                details: format!("no verse lines found ({} lines skipped)", skipped),
            });
        }
        Ok(corpus)
    }
}
