//! # Corpus Processing Pipeline
//!
//! ## Purpose
//! Orchestrates a full normalization run: flatten the corpus to
//! verse-addressable lines, apply the compiled rules then the verse-scoped
//! overrides to each line in a stable total order, and reassemble the
//! canonical structure, aggregating the replacement report and per-verse
//! diagnostics along the way.
//!
//! ## Input/Output Specification
//! - **Input**: a [`Corpus`], compiled rules, resolved overrides
//! - **Output**: the rewritten corpus plus a [`RunOutcome`] (report and
//!   diagnostics)
//! - **Ordering**: rules are strictly sequential within a verse; different
//!   verses are independent and processed in parallel, with the original
//!   verse order preserved on collection
//!
//! ## Engines
//! - [`process_corpus`]: the line-based engine. Rules see the whole line
//!   (address prefix included), so a rule can corrupt the prefix; such lines
//!   fail the rebuild decode, are dropped, and are counted as
//!   `address_decode_misses` — silent verse loss is the primary correctness
//!   risk of this engine and must always be surfaced.
//! - [`process_corpus_preserving_structure`]: iterates every chapter/verse
//!   key directly and rewrites verse text only. Empty chapters/verses are
//!   preserved exactly and address corruption is impossible by construction.
//!   This is the default engine.

use crate::corpus::Corpus;
use crate::modernize;
use crate::overrides::{LiteralOverrides, OverrideMap};
use crate::rules::{apply_rules, ReplacementReport, Rule};
use crate::{address, errors::Result};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{info, warn};

/// Report and diagnostics for one pipeline run.
///
/// Content-level anomalies accumulate here instead of aborting the run: the
/// pipeline favors a best-effort corpus with a diagnostic report over
/// all-or-nothing failure, while staying strict about config integrity.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Cumulative per-rule match counts, in rule declaration order
    pub report: ReplacementReport,
    /// Verse entries in the input corpus
    pub verses_in: usize,
    /// Verse entries in the rewritten corpus
    pub verses_out: usize,
    /// Lines that no longer matched the verse-address grammar after rule
    /// application and were excluded from the rebuilt corpus. Always zero for
    /// the structure-preserving engine.
    pub address_decode_misses: usize,
    /// Verses that had at least one override action applied
    pub overrides_applied: usize,
    /// Override ids that matched no verse address in this corpus (recorded
    /// no-ops, sorted for stable output)
    pub unmatched_override_ids: Vec<String>,
    /// Processing start time
    pub started_at: DateTime<Utc>,
    /// Processing end time
    pub finished_at: DateTime<Utc>,
}

impl RunOutcome {
    /// True when no verse was lost or left unaddressed
    pub fn is_clean(&self) -> bool {
        self.address_decode_misses == 0 && self.unmatched_override_ids.is_empty()
    }

    /// Log the run summary at the appropriate levels
    pub fn log_summary(&self) {
        info!(
            "Processed {} verses -> {} verses, {} rule matches, {} overrides applied",
            self.verses_in,
            self.verses_out,
            self.report.total_matches(),
            self.overrides_applied,
        );
        if self.address_decode_misses > 0 {
            warn!(
                "{} lines lost their verse address during rule application and were dropped",
                self.address_decode_misses
            );
        }
        for id in &self.unmatched_override_ids {
            warn!("Override id matched no verse in this corpus: {}", id);
        }
    }
}

/// Serialize the corpus to one canonical line per verse. Chapters and verses
/// with empty maps contribute zero lines; use the structure-preserving
/// engine when placeholder entries must survive.
pub fn flatten_corpus(corpus: &Corpus) -> Vec<String> {
    corpus
        .verses()
        .map(|(book, chapter, verse, text)| address::encode_line(book, chapter, verse, text))
        .collect()
}

/// Decode lines back into a fresh corpus. Returns the corpus and the number
/// of lines dropped because they no longer matched the address grammar.
pub fn rebuild_corpus(lines: &[String]) -> (Corpus, usize) {
    let mut corpus = Corpus::new();
    let mut dropped = 0;
    for line in lines {
        match address::decode_line(line) {
            Some(decoded) => {
                corpus.insert_verse(&decoded.book, decoded.chapter, decoded.verse, decoded.text);
            }
            None => {
                warn!("Dropping line with unparseable verse address: {}", line);
                dropped += 1;
            }
        }
    }
    (corpus, dropped)
}

struct LineResult {
    line: String,
    counts: Vec<u64>,
    address: Option<String>,
    override_applied: bool,
}

/// The line-based engine: flatten, rewrite, reassemble.
///
/// Rules apply to the whole line (address prefix included); overrides apply
/// after all rules, keyed by the rewritten line's address. A line count
/// mismatch between input and output signals a rule corrupted an address and
/// is surfaced through `address_decode_misses`.
pub fn process_corpus(
    corpus: &Corpus,
    rules: &[Rule],
    overrides: &OverrideMap,
) -> Result<(Corpus, RunOutcome)> {
    let started_at = Utc::now();
    let lines = flatten_corpus(corpus);
    let verses_in = lines.len();

    // Per-line work is embarrassingly parallel; collection preserves the
    // original verse order.
    let results: Vec<LineResult> = lines
        .par_iter()
        .map(|line| {
            let (rewritten, counts) = apply_rules(line, rules);
            let (rewritten, override_applied) = overrides.apply_to_line(&rewritten);
            let address = address::parse_address_only(&rewritten);
            LineResult {
                line: rewritten,
                counts,
                address,
                override_applied,
            }
        })
        .collect();

    let mut report = ReplacementReport::new(rules);
    let mut seen_addresses = HashSet::new();
    let mut overrides_applied = 0;
    let mut processed_lines = Vec::with_capacity(results.len());
    for result in results {
        report.add_counts(rules, &result.counts);
        if result.override_applied {
            overrides_applied += 1;
        }
        if let Some(addr) = result.address {
            seen_addresses.insert(addr);
        }
        processed_lines.push(result.line);
    }

    let (rebuilt, address_decode_misses) = rebuild_corpus(&processed_lines);
    let outcome = RunOutcome {
        verses_out: rebuilt.verse_count(),
        report,
        verses_in,
        address_decode_misses,
        overrides_applied,
        unmatched_override_ids: unmatched_ids(overrides, &seen_addresses),
        started_at,
        finished_at: Utc::now(),
    };
    outcome.log_summary();
    Ok((rebuilt, outcome))
}

/// The structure-preserving engine: iterate every existing chapter/verse key
/// directly and rewrite each verse's text in place, with the address prefix
/// excluded from rule scope. Optionally applies the literal override
/// substitutions and the modernization pass used by extras processing.
pub fn process_corpus_preserving_structure(
    corpus: &Corpus,
    rules: &[Rule],
    overrides: &OverrideMap,
    literals: &LiteralOverrides,
    modernize_pass: bool,
) -> Result<(Corpus, RunOutcome)> {
    let started_at = Utc::now();
    let mut report = ReplacementReport::new(rules);
    let mut seen_addresses = HashSet::new();
    let mut overrides_applied = 0;

    let (rewritten, _) = corpus.map_verse_texts(|book, chapter, verse, text| {
        let addr = format!("{} {}:{}", address::normalize_book_name(book), chapter, verse);
        let (mut out, counts) = apply_rules(text, rules);
        report.add_counts(rules, &counts);

        let (after_overrides, applied) = overrides.apply_to_text(&addr, &out);
        out = after_overrides;
        if applied {
            overrides_applied += 1;
        }
        seen_addresses.insert(addr);

        if !literals.is_empty() {
            out = literals.apply(&out);
        }
        if modernize_pass {
            out = modernize::modernize_text(&out);
        }
        out
    });

    let verses_in = corpus.verse_count();
    let outcome = RunOutcome {
        report,
        verses_in,
        verses_out: rewritten.verse_count(),
        address_decode_misses: 0,
        overrides_applied,
        unmatched_override_ids: unmatched_ids(overrides, &seen_addresses),
        started_at,
        finished_at: Utc::now(),
    };
    outcome.log_summary();
    Ok((rewritten, outcome))
}

fn unmatched_ids(overrides: &OverrideMap, seen: &HashSet<String>) -> Vec<String> {
    let mut unmatched: Vec<String> = overrides
        .ids()
        .filter(|id| !seen.contains(*id))
        .map(str::to_string)
        .collect();
    unmatched.sort();
    unmatched
}
