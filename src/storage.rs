//! # Storage Module
//!
//! ## Purpose
//! One-shot file I/O at the pipeline boundary: whole corpora are loaded into
//! memory, processed, and written back in full. Nothing here streams or
//! holds state between runs.
//!
//! ## Input/Output Specification
//! - **Input**: corpus JSON paths (UTF-8, optional BOM tolerated on read)
//! - **Output**: pretty-printed corpus JSON (no BOM), serialized verse-line
//!   text, and the CSV replacement report
//!
//! Outputs are only written after processing completes, so a fatal error can
//! never leave a partially written corpus behind.

use crate::corpus::Corpus;
use crate::errors::{PipelineError, Result};
use crate::pipeline;
use crate::rules::ReplacementReport;
use std::path::Path;
use tracing::info;

/// Load a canonical corpus from a JSON file
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Corpus> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PipelineError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    let corpus: Corpus =
        serde_json::from_str(strip_bom(&content)).map_err(|e| PipelineError::MalformedCorpus {
            details: format!("{:?}: {}", path, e),
        })?;
    info!(
        "Loaded corpus from {:?}: {} books, {} verses",
        path,
        corpus.book_count(),
        corpus.verse_count()
    );
    Ok(corpus)
}

/// Write a corpus as pretty-printed UTF-8 JSON
pub fn save_corpus<P: AsRef<Path>>(path: P, corpus: &Corpus) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(corpus)?;
    std::fs::write(path, json)?;
    info!("Wrote corpus: {:?}", path);
    Ok(())
}

/// Write a corpus as one canonical verse line per row
pub fn save_corpus_lines<P: AsRef<Path>>(path: P, corpus: &Corpus) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let lines = pipeline::flatten_corpus(corpus);
    std::fs::write(path, lines.join("\n"))?;
    info!("Wrote {} verse lines: {:?}", lines.len(), path);
    Ok(())
}

/// Write the replacement report as CSV
pub fn save_report_csv<P: AsRef<Path>>(path: P, report: &ReplacementReport) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    std::fs::write(path, report.to_csv())?;
    info!("Wrote replacement report: {:?}", path);
    Ok(())
}

/// Read a source document as text, tolerating a UTF-8 BOM
pub fn load_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PipelineError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    Ok(strip_bom(&content).to_string())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}
