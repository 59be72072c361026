//! # Versewright
//!
//! ## Overview
//! A rule-based normalization pipeline for religious texts organized as
//! `book → chapter → verse` corpora. The pipeline restores preferred divine
//! names through ordered regex rules, pins down individual verses through
//! address-keyed overrides, modernizes archaic English diction, and parses
//! heterogeneous source documents into one canonical JSON shape, always
//! preserving corpus structure.
//!
//! ## Architecture
//!
//! ```text
//! source document ──▶ ingestion ──▶ Corpus ──▶ pipeline ──▶ Corpus + report
//!                     (parsers,               (rules, then        │
//!                      fetch)                  overrides,         ▼
//!                                              modernize)      storage
//! ```
//!
//! - [`corpus`]: the canonical three-level structure and its strict key grammar
//! - [`address`]: the `"Book C:V text"` line grammar shared by the flat format
//! - [`rules`] / [`overrides`]: the two rewriting layers, global then
//!   verse-scoped
//! - [`modernize`]: the fixed archaic-English substitution table
//! - [`pipeline`]: the line-based and structure-preserving processing engines
//! - [`ingestion`]: source parsers and the one-shot fetcher
//! - [`storage`]: whole-file corpus, line, and report I/O
//!
//! Configuration integrity is strict (any invalid pattern aborts the run
//! before output is written); content anomalies are diagnostics, collected in
//! the [`pipeline::RunOutcome`].

pub mod address;
pub mod config;
pub mod corpus;
pub mod errors;
pub mod ingestion;
pub mod modernize;
pub mod overrides;
pub mod pipeline;
pub mod rules;
pub mod storage;

pub use corpus::Corpus;
pub use errors::{PipelineError, Result};
pub use pipeline::{process_corpus, process_corpus_preserving_structure, RunOutcome};
pub use rules::{compile_rules, ReplacementReport, Rule};
