//! # Rule Compiler and Application Engine
//!
//! ## Purpose
//! Turns the declarative rule configuration into an ordered list of compiled
//! rewrite rules and applies them to serialized verse lines. Rules execute in
//! declaration order and each rule sees the previous rule's output — that
//! contract is the heart of the pipeline and is enforced by passing the rule
//! list by value into a sequential fold, never through shared mutable state.
//!
//! ## Input/Output Specification
//! - **Input**: [`RuleConfig`] rule specifications; verse lines
//! - **Output**: compiled [`Rule`] lists, rewritten lines, per-rule match
//!   counts, and the cumulative [`ReplacementReport`]
//! - **Counting**: each rule's count reflects matches found on the line just
//!   before that rule's own substitution, not the original input
//!
//! ## Key Features
//! - Atomic compilation: one invalid pattern fails the whole rule set
//! - Case sensitivity per rule via `RegexBuilder`
//! - Report rows in declaration order, zero-count rules included

use crate::config::{RuleConfig, RuleSpec};
use crate::errors::{PipelineError, Result};
use regex::RegexBuilder;
use std::collections::HashMap;
use tracing::debug;

/// A compiled rewrite rule
#[derive(Debug, Clone)]
pub struct Rule {
    regex: regex::Regex,
    replacement: String,
    description: String,
}

impl Rule {
    /// Compile a single rule specification
    pub fn compile(spec: &RuleSpec) -> Result<Self> {
        let regex = RegexBuilder::new(&spec.pattern)
            .case_insensitive(spec.case_insensitive)
            .build()
            .map_err(|e| PipelineError::Pattern {
                pattern: spec.pattern.clone(),
                details: e.to_string(),
            })?;
        let description = spec
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(&spec.pattern)
            .to_string();
        Ok(Self {
            regex,
            replacement: spec.replacement.clone(),
            description,
        })
    }

    /// The rule's report key: its description, or the pattern source when no
    /// description was given
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Count matches in `text` without substituting
    pub fn count_matches(&self, text: &str) -> u64 {
        self.regex.find_iter(text).count() as u64
    }

    /// Substitute all matches, with `$n` capture group references
    pub fn substitute(&self, text: &str) -> String {
        self.regex
            .replace_all(text, self.replacement.as_str())
            .into_owned()
    }
}

/// Compile the whole rule table. Fails atomically: a corpus must never be
/// processed against an incompletely compiled rule set.
pub fn compile_rules(config: &RuleConfig) -> Result<Vec<Rule>> {
    let rules = config
        .rules
        .iter()
        .map(Rule::compile)
        .collect::<Result<Vec<_>>>()?;
    debug!("Compiled {} rewrite rules", rules.len());
    Ok(rules)
}

/// Apply every rule, in order, to one line. Returns the rewritten line and
/// the per-rule match counts (aligned with the rule slice).
pub fn apply_rules(line: &str, rules: &[Rule]) -> (String, Vec<u64>) {
    let mut current = line.to_string();
    let mut counts = Vec::with_capacity(rules.len());
    for rule in rules {
        let count = rule.count_matches(&current);
        if count > 0 {
            debug!("Rule hit: {} :: {}", rule.description(), count);
            current = rule.substitute(&current);
        }
        counts.push(count);
    }
    (current, counts)
}

/// Cumulative match counts per rule for one pipeline run.
///
/// Rows are keyed by rule description and kept in declaration order; rules
/// sharing a description accumulate into the first row. Rules with zero
/// matches still appear.
#[derive(Debug, Clone, Default)]
pub struct ReplacementReport {
    rows: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl ReplacementReport {
    /// Initialize a report with a zero-count row per rule description
    pub fn new(rules: &[Rule]) -> Self {
        let mut report = Self::default();
        for rule in rules {
            report.row_index(rule.description());
        }
        report
    }

    fn row_index(&mut self, description: &str) -> usize {
        if let Some(&idx) = self.index.get(description) {
            return idx;
        }
        self.rows.push((description.to_string(), 0));
        let idx = self.rows.len() - 1;
        self.index.insert(description.to_string(), idx);
        idx
    }

    /// Add per-rule counts (aligned with the rule slice) into the report
    pub fn add_counts(&mut self, rules: &[Rule], counts: &[u64]) {
        for (rule, &count) in rules.iter().zip(counts) {
            let idx = self.row_index(rule.description());
            self.rows[idx].1 += count;
        }
    }

    /// Report rows in declaration order
    pub fn rows(&self) -> &[(String, u64)] {
        &self.rows
    }

    /// Total matches across all rules
    pub fn total_matches(&self) -> u64 {
        self.rows.iter().map(|(_, count)| count).sum()
    }

    /// Render as CSV with the canonical header row
    pub fn to_csv(&self) -> String {
        let mut out = String::from("Rule Description,Matches/Replacements\n");
        for (description, count) in &self.rows {
            out.push_str(&csv_field(description));
            out.push(',');
            out.push_str(&count.to_string());
            out.push('\n');
        }
        out
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str, replacement: &str) -> Rule {
        Rule::compile(&RuleSpec {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
            description: None,
            case_insensitive: false,
        })
        .unwrap()
    }

    #[test]
    fn test_rule_order_is_observable() {
        let forward = vec![rule("a", "b"), rule("b", "c")];
        let (text, _) = apply_rules("a", &forward);
        assert_eq!(text, "c");

        let reverse = vec![rule("b", "c"), rule("a", "b")];
        let (text, _) = apply_rules("a", &reverse);
        assert_eq!(text, "b");
    }

    #[test]
    fn test_counts_reflect_pre_substitution_matches() {
        let rules = vec![rule("a", "b"), rule("b", "c")];
        // Second rule sees the first rule's output: one original "b" plus
        // two produced by the first rule.
        let (text, counts) = apply_rules("aab", &rules);
        assert_eq!(text, "ccc");
        assert_eq!(counts, vec![2, 3]);
    }

    #[test]
    fn test_capture_group_replacement() {
        let rules = vec![rule(r"(\w+) of (\w+)", "$2 of $1")];
        let (text, counts) = apply_rules("king of kings", &rules);
        assert_eq!(text, "kings of king");
        assert_eq!(counts, vec![1]);
    }

    #[test]
    fn test_case_insensitive_flag() {
        let spec = RuleSpec {
            pattern: "lord".to_string(),
            replacement: "Yahuah".to_string(),
            description: None,
            case_insensitive: true,
        };
        let compiled = Rule::compile(&spec).unwrap();
        assert_eq!(compiled.substitute("LORD and Lord"), "Yahuah and Yahuah");
    }

    #[test]
    fn test_invalid_pattern_fails_compilation_atomically() {
        let config: RuleConfig = serde_json::from_str(
            r#"{"rules": [
                {"pattern": "fine", "replacement": "ok"},
                {"pattern": "(unclosed", "replacement": "bad"}
            ]}"#,
        )
        .unwrap();
        let err = compile_rules(&config).unwrap_err();
        assert!(matches!(err, PipelineError::Pattern { .. }));
    }

    #[test]
    fn test_report_includes_zero_count_rules() {
        let rules = vec![rule("God", "Elohiym"), rule("zzz", "never")];
        let mut report = ReplacementReport::new(&rules);
        let (_, counts) = apply_rules("God God created", &rules);
        report.add_counts(&rules, &counts);
        assert_eq!(
            report.rows(),
            &[("God".to_string(), 2), ("zzz".to_string(), 0)]
        );
    }

    #[test]
    fn test_report_csv_escapes_commas() {
        let specs = RuleSpec {
            pattern: "x".to_string(),
            replacement: "y".to_string(),
            description: Some("commas, everywhere".to_string()),
            case_insensitive: false,
        };
        let rules = vec![Rule::compile(&specs).unwrap()];
        let report = ReplacementReport::new(&rules);
        let csv = report.to_csv();
        assert!(csv.starts_with("Rule Description,Matches/Replacements\n"));
        assert!(csv.contains("\"commas, everywhere\",0"));
    }
}
