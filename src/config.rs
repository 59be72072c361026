//! # Configuration Management Module
//!
//! ## Purpose
//! Declarative rule and override configuration for the normalization
//! pipeline: schema types, JSON loading, and validation. Configuration
//! errors are fatal — a corpus is never processed against a partially
//! loaded rule table.
//!
//! ## Input/Output Specification
//! - **Input**: JSON configuration files (`rules` array, `overrides` array)
//! - **Output**: Validated configuration structs with defaults applied
//! - **Validation**: Required fields enforced by serde; regex validity is
//!   checked later by the rule compiler so that pattern errors carry the
//!   offending pattern
//!
//! ## Key Features
//! - `case_insensitive` defaults to false; `description` is optional
//! - Unknown override action types deserialize to an explicit no-op variant
//!   (forward compatibility must not abort processing)
//! - The flat `replacements` map variant keeps its file order

use crate::errors::{PipelineError, Result};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;

/// Top-level rule configuration: an ordered sequence of rewrite rules
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleConfig {
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// One declarative rewrite rule
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    /// Regular expression over the line text
    pub pattern: String,
    /// Replacement template; may reference captured groups as `$1`, `$2`, ...
    pub replacement: String,
    /// Human-readable description used in the replacement report
    #[serde(default)]
    pub description: Option<String>,
    /// Compile the pattern case-insensitively
    #[serde(default)]
    pub case_insensitive: bool,
}

/// Top-level override configuration: verse-scoped edits applied after rules
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverrideConfig {
    #[serde(default)]
    pub overrides: Vec<OverrideEntry>,
}

/// Overrides for one verse address (or one book, for the flat variant)
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideEntry {
    /// Canonical `"Book C:V"` verse address
    pub id: String,
    /// Ordered actions applied to the addressed line
    #[serde(default)]
    pub actions: Vec<OverrideAction>,
    /// Flat literal substitution variant used by structure-preserving extras
    /// processing; keeps file order
    #[serde(default, deserialize_with = "ordered_string_pairs")]
    pub replacements: Vec<(String, String)>,
}

/// A single override action, tagged by `type`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverrideAction {
    /// Regex replacement within the addressed line
    Replace {
        pattern: String,
        replacement: String,
    },
    /// Replace the verse text in full, preserving the address prefix
    Set {
        #[serde(default)]
        text: String,
    },
    /// Unrecognized action type: a deliberate no-op, never an error
    #[serde(other)]
    Unknown,
}

impl RuleConfig {
    /// Load rule configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: RuleConfig = load_config_json(path.as_ref(), "rule configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Schema validation beyond what serde enforces
    fn validate(&self) -> Result<()> {
        for (idx, rule) in self.rules.iter().enumerate() {
            if rule.pattern.is_empty() {
                return Err(PipelineError::Config {
                    message: format!("rule #{} has an empty pattern", idx + 1),
                });
            }
        }
        Ok(())
    }
}

impl OverrideConfig {
    /// Load override configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: OverrideConfig = load_config_json(path.as_ref(), "override configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (idx, entry) in self.overrides.iter().enumerate() {
            if entry.id.trim().is_empty() {
                return Err(PipelineError::Config {
                    message: format!("override entry #{} has an empty id", idx + 1),
                });
            }
        }
        Ok(())
    }
}

/// Read and parse one JSON configuration file, mapping failures to the
/// fatal configuration error class
fn load_config_json<T: for<'de> Deserialize<'de>>(path: &Path, what: &str) -> Result<T> {
    if !path.exists() {
        return Err(PipelineError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| PipelineError::Config {
        message: format!("failed to read {} {:?}: {}", what, path, e),
    })?;
    serde_json::from_str(&content).map_err(|e| PipelineError::Config {
        message: format!("failed to parse {} {:?}: {}", what, path, e),
    })
}

/// Deserialize a JSON object into ordered `(key, value)` pairs. A plain map
/// type would lose the file order the substitution pass depends on.
fn ordered_string_pairs<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairsVisitor;

    impl<'de> Visitor<'de> for PairsVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of old substring to new substring")
        }

        fn visit_map<A: MapAccess<'de>>(
            self,
            mut access: A,
        ) -> std::result::Result<Self::Value, A::Error> {
            let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, value)) = access.next_entry::<String, String>()? {
                pairs.push((key, value));
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(PairsVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_config_defaults() {
        let config: RuleConfig = serde_json::from_str(
            r#"{"rules": [{"pattern": "God", "replacement": "Elohiym"}]}"#,
        )
        .unwrap();
        let rule = &config.rules[0];
        assert!(!rule.case_insensitive);
        assert!(rule.description.is_none());
    }

    #[test]
    fn test_missing_required_field_fails() {
        let result: std::result::Result<RuleConfig, _> =
            serde_json::from_str(r#"{"rules": [{"pattern": "God"}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_override_actions_parse_in_order() {
        let config: OverrideConfig = serde_json::from_str(
            r#"{"overrides": [{"id": "Genesis 1:1", "actions": [
                {"type": "replace", "pattern": "a", "replacement": "b"},
                {"type": "set", "text": "final"}
            ]}]}"#,
        )
        .unwrap();
        let actions = &config.overrides[0].actions;
        assert!(matches!(actions[0], OverrideAction::Replace { .. }));
        assert!(matches!(actions[1], OverrideAction::Set { .. }));
    }

    #[test]
    fn test_unknown_action_type_is_noop_not_error() {
        let config: OverrideConfig = serde_json::from_str(
            r#"{"overrides": [{"id": "Genesis 1:1", "actions": [
                {"type": "annotate", "note": "future extension"}
            ]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            config.overrides[0].actions[0],
            OverrideAction::Unknown
        ));
    }

    #[test]
    fn test_replacements_keep_file_order() {
        let config: OverrideConfig = serde_json::from_str(
            r#"{"overrides": [{"id": "Enoch", "replacements": {
                "zeta": "z", "alpha": "a", "mu": "m"
            }}]}"#,
        )
        .unwrap();
        let keys: Vec<&str> = config.overrides[0]
            .replacements
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mu"]);
    }

    #[test]
    fn test_empty_pattern_rejected_by_validation() {
        let config: RuleConfig =
            serde_json::from_str(r#"{"rules": [{"pattern": "", "replacement": "x"}]}"#).unwrap();
        assert!(config.validate().is_err());
    }
}
