//! # Override Resolver
//!
//! ## Purpose
//! Verse-scoped edits applied strictly after the global rule pass, keyed by
//! the canonical `"Book C:V"` address. Overrides exist to pin down verses the
//! general rules get wrong; they are expected to target a known historical
//! corpus snapshot, so an id with no matching verse is a recorded no-op,
//! never an error.
//!
//! ## Input/Output Specification
//! - **Input**: [`OverrideConfig`] entries; rule-rewritten verse lines
//! - **Output**: a lookup from verse address to an ordered action list, and
//!   rewritten lines
//! - **Ordering**: duplicate ids append their actions in file order; each
//!   action sees the text already mutated by earlier actions
//!
//! ## Key Features
//! - `replace` actions are compiled regexes; compilation is atomic
//! - `set` actions discard the verse text but re-synthesize the line with the
//!   original address prefix
//! - Unknown action types are dropped at build time (forward compatibility)
//! - The flat `replacements` variant collects ordered literal substitutions
//!   for structure-preserving extras processing

use crate::address;
use crate::config::{OverrideAction, OverrideConfig};
use crate::errors::{PipelineError, Result};
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// An override action with its pattern compiled
#[derive(Debug, Clone)]
enum CompiledAction {
    Replace { regex: Regex, replacement: String },
    Set { text: String },
}

/// Lookup from verse address to its ordered override actions
#[derive(Debug, Clone, Default)]
pub struct OverrideMap {
    actions: HashMap<String, Vec<CompiledAction>>,
}

impl OverrideMap {
    /// Build the lookup from configuration. Entries sharing an id have their
    /// actions appended in the order the entries appear.
    pub fn from_config(config: &OverrideConfig) -> Result<Self> {
        let mut actions: HashMap<String, Vec<CompiledAction>> = HashMap::new();
        for entry in &config.overrides {
            let compiled = actions.entry(entry.id.clone()).or_default();
            for action in &entry.actions {
                match action {
                    OverrideAction::Replace {
                        pattern,
                        replacement,
                    } => {
                        let regex = Regex::new(pattern).map_err(|e| PipelineError::Pattern {
                            pattern: pattern.clone(),
                            details: e.to_string(),
                        })?;
                        compiled.push(CompiledAction::Replace {
                            regex,
                            replacement: replacement.clone(),
                        });
                    }
                    OverrideAction::Set { text } => {
                        compiled.push(CompiledAction::Set { text: text.clone() });
                    }
                    OverrideAction::Unknown => {
                        debug!("Ignoring unknown override action type for id {}", entry.id);
                    }
                }
            }
        }
        Ok(Self { actions })
    }

    /// Number of addresses with at least one action
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterate the verse addresses this map targets
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    /// Apply the actions declared for this line's address, chaining each
    /// action's output into the next. Returns the rewritten line and whether
    /// any action list matched the address.
    pub fn apply_to_line(&self, line: &str) -> (String, bool) {
        let Some(address) = address::parse_address_only(line) else {
            return (line.to_string(), false);
        };
        let Some(actions) = self.actions.get(&address) else {
            return (line.to_string(), false);
        };
        let mut out = line.to_string();
        for action in actions {
            match action {
                CompiledAction::Replace { regex, replacement } => {
                    out = regex.replace_all(&out, replacement.as_str()).into_owned();
                }
                CompiledAction::Set { text } => {
                    // Preserve the address prefix captured from the line
                    // being rewritten; a line whose prefix no longer parses
                    // is left alone.
                    if let Some((prefix, _)) = address::split_address_prefix(&out) {
                        out = format!("{}{}", prefix, text);
                    }
                }
            }
        }
        (out, true)
    }

    /// Apply the actions declared for `address` to bare verse text (no
    /// address prefix in scope). Used by the structure-preserving processor,
    /// where the prefix is never part of the rewritten string.
    pub fn apply_to_text(&self, address: &str, text: &str) -> (String, bool) {
        let Some(actions) = self.actions.get(address) else {
            return (text.to_string(), false);
        };
        let mut out = text.to_string();
        for action in actions {
            match action {
                CompiledAction::Replace { regex, replacement } => {
                    out = regex.replace_all(&out, replacement.as_str()).into_owned();
                }
                CompiledAction::Set { text } => {
                    out = text.clone();
                }
            }
        }
        (out, true)
    }
}

/// Ordered literal substitutions from the flat `replacements` override
/// variant, merged across entries in file order
#[derive(Debug, Clone, Default)]
pub struct LiteralOverrides {
    pairs: Vec<(String, String)>,
}

impl LiteralOverrides {
    pub fn from_config(config: &OverrideConfig) -> Self {
        let pairs = config
            .overrides
            .iter()
            .flat_map(|entry| entry.replacements.iter().cloned())
            .collect();
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Apply every substitution to `text`, in order
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (old, new) in &self.pairs {
            out = out.replace(old, new);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn override_map(json: &str) -> OverrideMap {
        let config: OverrideConfig = serde_json::from_str(json).unwrap();
        OverrideMap::from_config(&config).unwrap()
    }

    #[test]
    fn test_set_preserves_address_prefix() {
        let map = override_map(
            r#"{"overrides": [{"id": "Genesis 1:1", "actions": [
                {"type": "set", "text": "In the beginning"}
            ]}]}"#,
        );
        let (line, applied) = map.apply_to_line("Genesis 1:1 In the start");
        assert!(applied);
        assert_eq!(line, "Genesis 1:1 In the beginning");
    }

    #[test]
    fn test_actions_chain_in_declared_order() {
        let map = override_map(
            r#"{"overrides": [
                {"id": "Job 1:1", "actions": [
                    {"type": "replace", "pattern": "perfect", "replacement": "blameless"}
                ]},
                {"id": "Job 1:1", "actions": [
                    {"type": "replace", "pattern": "blameless", "replacement": "upright"}
                ]}
            ]}"#,
        );
        let (line, _) = map.apply_to_line("Job 1:1 that man was perfect");
        assert_eq!(line, "Job 1:1 that man was upright");
    }

    #[test]
    fn test_line_without_matching_id_unchanged() {
        let map = override_map(
            r#"{"overrides": [{"id": "Genesis 1:1", "actions": [
                {"type": "set", "text": "replaced"}
            ]}]}"#,
        );
        let (line, applied) = map.apply_to_line("Exodus 20:3 You shall have no other");
        assert!(!applied);
        assert_eq!(line, "Exodus 20:3 You shall have no other");
    }

    #[test]
    fn test_unparseable_address_means_no_override() {
        let map = override_map(
            r#"{"overrides": [{"id": "Genesis 1:1", "actions": [
                {"type": "set", "text": "replaced"}
            ]}]}"#,
        );
        let (line, applied) = map.apply_to_line("#### not a verse");
        assert!(!applied);
        assert_eq!(line, "#### not a verse");
    }

    #[test]
    fn test_invalid_override_pattern_is_fatal() {
        let config: OverrideConfig = serde_json::from_str(
            r#"{"overrides": [{"id": "Genesis 1:1", "actions": [
                {"type": "replace", "pattern": "(bad", "replacement": "x"}
            ]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            OverrideMap::from_config(&config),
            Err(PipelineError::Pattern { .. })
        ));
    }

    #[test]
    fn test_literal_overrides_apply_in_order() {
        let config: OverrideConfig = serde_json::from_str(
            r#"{"overrides": [
                {"id": "Enoch", "replacements": {"Lord": "Yahuah", "God": "Elohiym"}}
            ]}"#,
        )
        .unwrap();
        let literals = LiteralOverrides::from_config(&config);
        assert_eq!(literals.apply("the Lord God"), "the Yahuah Elohiym");
    }
}
