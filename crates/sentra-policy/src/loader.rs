//! Rule file loading.
//!
//! Rule sets live in TOML files with a top-level `rules` array:
//!
//! ```toml
//! [[rules]]
//! name = "direct_manager_access"
//! priority = 80
//! effect = "ALLOW"
//! conditions = [{ type = "relationship_patterns", any_of = ["manages"] }]
//! ```
//!
//! Loading never takes the engine down: a missing or malformed file
//! degrades to a single terminal default-deny rule with a warning, matching
//! the error-handling contract for configuration problems.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{PolicyError, Result};
use crate::rule::PolicyRule;

#[derive(Debug, Deserialize)]
struct RuleFile {
    rules: Vec<PolicyRule>,
}

/// Loads rules from a TOML file, failing loudly.
pub fn try_load_rules(path: &Path) -> Result<Vec<PolicyRule>> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path.to_path_buf()).format(config::FileFormat::Toml))
        .build()
        .map_err(|e| PolicyError::LoadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let file: RuleFile = settings
        .try_deserialize()
        .map_err(|e| PolicyError::LoadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    for rule in &file.rules {
        if rule.name.is_empty() {
            return Err(PolicyError::InvalidRule {
                name: "<unnamed>".to_string(),
                message: "rule name must be non-empty".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&rule.confidence_boost) {
            return Err(PolicyError::InvalidRule {
                name: rule.name.clone(),
                message: format!(
                    "confidence_boost {} outside [0.0, 1.0]",
                    rule.confidence_boost
                ),
            });
        }
    }

    info!(path = %path.display(), rule_count = file.rules.len(), "rules loaded");
    Ok(file.rules)
}

/// Loads rules, degrading to a lone default-deny rule on any failure.
pub fn load_rules(path: &Path) -> Vec<PolicyRule> {
    match try_load_rules(path) {
        Ok(rules) => rules,
        Err(e) => {
            warn!(error = %e, "rule load failed; falling back to default deny");
            vec![PolicyRule::default_deny()]
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::rule::{Condition, Effect};

    fn write_toml(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("create temp rule file");
        file.write_all(content.as_bytes()).expect("write rules");
        file
    }

    #[test]
    fn test_load_valid_rule_file() {
        let file = write_toml(
            r#"
[[rules]]
name = "ceo_full_access"
description = "CEO sees everything"
priority = 100
effect = "ALLOW"
confidence_boost = 0.95
conditions = [{ type = "hierarchy_level", any_of = ["ceo"] }]

[[rules]]
name = "default_deny"
priority = 1
effect = "DENY"
confidence_boost = 0.9
"#,
        );

        let rules = try_load_rules(file.path()).expect("rules should parse");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name, "ceo_full_access");
        assert_eq!(rules[0].effect, Effect::Allow);
        assert!(matches!(
            rules[0].conditions[0],
            Condition::HierarchyLevel { .. }
        ));
        assert!(rules[1].conditions.is_empty());
    }

    #[test]
    fn test_missing_file_falls_back_to_default_deny() {
        let rules = load_rules(Path::new("/nonexistent/rules.toml"));
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "default_deny");
        assert_eq!(rules[0].effect, Effect::Deny);
        assert!((rules[0].confidence_boost - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_out_of_range_confidence_rejected() {
        let file = write_toml(
            r#"
[[rules]]
name = "over_confident"
priority = 5
effect = "ALLOW"
confidence_boost = 1.5
"#,
        );
        let err = try_load_rules(file.path()).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidRule { .. }), "got {err}");
    }

    #[test]
    fn test_malformed_toml_degrades() {
        let file = write_toml("rules = not-a-list");
        let rules = load_rules(file.path());
        assert_eq!(rules.len(), 1, "malformed file must degrade, not panic");
        assert_eq!(rules[0].name, "default_deny");
    }
}
