//! Policy evaluation engine.
//!
//! Evaluates a fact record against a priority-ordered rule snapshot. The
//! first rule whose conditions are all satisfied wins; lower-priority rules
//! are never consulted once a match fires, even if they would have added
//! clarifying factors.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::facts::Facts;
use crate::rule::{Condition, Effect, PolicyRule, RelationKind, SharedKind};

// ============================================================================
// Decision
// ============================================================================

/// The result of one policy evaluation.
///
/// Produced once per request and never retried in place; callers wanting a
/// fresh outcome re-invoke evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub effect: Effect,
    /// Human-readable explanation of why this decision was made.
    pub reason: String,
    /// Confidence in `[0, 1]`, averaged over the applied rules' boosts.
    pub confidence: f64,
    /// Matched-signal tags justifying the outcome, for audit.
    pub factors: Vec<String>,
    /// Names of the rules that fired (normally exactly one).
    pub rules_applied: Vec<String>,
    /// Wall-clock time spent evaluating.
    pub response_time: Duration,
    /// Set when the facts came from the degraded fallback path.
    pub degraded_mode: bool,
}

impl Decision {
    /// The hard-failure decision for an unresolvable requester or target.
    pub fn entity_not_found(entity_id: &str) -> Self {
        Decision {
            effect: Effect::Deny,
            reason: format!("entity '{entity_id}' could not be resolved"),
            confidence: 1.0,
            factors: vec!["entity_not_found".to_string()],
            rules_applied: Vec::new(),
            response_time: Duration::ZERO,
            degraded_mode: false,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.effect == Effect::Allow
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Evaluates `facts` against a rule snapshot sorted by descending priority.
///
/// The snapshot comes from [`RuleStore::snapshot`](crate::RuleStore::snapshot)
/// and is already ordered; this function performs no sorting of its own so
/// an evaluation can never observe a mid-reload ordering.
pub fn evaluate(rules: &[PolicyRule], facts: &Facts) -> Decision {
    let started = Instant::now();

    for rule in rules {
        if !matches_rule(rule, facts) {
            continue;
        }

        let mut factors = extract_factors(rule, facts);
        if facts.degraded_mode {
            factors.push("degraded_mode".to_string());
        }

        let rules_applied = vec![rule.name.clone()];
        let confidence = (rule.confidence_boost / rules_applied.len() as f64).min(1.0);

        debug!(
            rule = %rule.name,
            priority = rule.priority,
            effect = ?rule.effect,
            "rule matched"
        );

        return Decision {
            effect: rule.effect,
            reason: if rule.description.is_empty() {
                format!("matched rule '{}' (priority {})", rule.name, rule.priority)
            } else {
                rule.description.clone()
            },
            confidence,
            factors,
            rules_applied,
            response_time: started.elapsed(),
            degraded_mode: facts.degraded_mode,
        };
    }

    // A well-formed rule set ends in an unconditional deny, so reaching
    // this point means the set was empty or every rule had conditions.
    Decision {
        effect: Effect::Deny,
        reason: "no rule matched".to_string(),
        confidence: 0.5,
        factors: if facts.degraded_mode {
            vec!["degraded_mode".to_string()]
        } else {
            Vec::new()
        },
        rules_applied: Vec::new(),
        response_time: started.elapsed(),
        degraded_mode: facts.degraded_mode,
    }
}

// ============================================================================
// Rule matching
// ============================================================================

fn matches_rule(rule: &PolicyRule, facts: &Facts) -> bool {
    // Emergency gating short-circuits: a rule that requires emergency mode
    // is rejected outright while the flag is down, regardless of whatever
    // else would have matched.
    if rule
        .conditions
        .iter()
        .any(|c| matches!(c, Condition::EmergencyMode))
        && !facts.emergency_mode
    {
        return false;
    }

    rule.conditions.iter().all(|c| matches_condition(c, facts))
}

fn matches_condition(condition: &Condition, facts: &Facts) -> bool {
    match condition {
        Condition::EmergencyMode => facts.emergency_mode,

        Condition::HierarchyLevel { any_of } => any_of.iter().any(|label| {
            if label.requires_ceo() {
                facts.is_ceo
            } else if label.requires_executive() {
                facts.is_executive
            } else {
                // Manager-family labels: anyone with reports qualifies.
                facts.direct_reports > 0
            }
        }),

        Condition::MinDirectReports { count } => facts.direct_reports >= *count,

        Condition::RelationshipPatterns { any_of } => {
            any_of.iter().any(|pattern| match pattern.kind() {
                RelationKind::ManagerOf => {
                    facts.is_direct_manager || facts.is_skip_level_manager
                }
                RelationKind::ReportOf => facts.is_direct_report,
                RelationKind::ActingAs => facts.has_acting_role && facts.acting_role_valid,
            })
        }

        Condition::SharedContext { any_of } => any_of.iter().any(|ctx| match ctx.kind() {
            SharedKind::Department => facts.same_department.is_some(),
            SharedKind::Team => facts.same_team,
            SharedKind::Project => facts.shared_projects > 0,
        }),

        Condition::RequesterTypeRestricted { types } => types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&facts.requester_type)),

        Condition::BusinessHoursOnly => facts.in_business_hours,

        Condition::Equals { key, value } => match facts.scalar(key) {
            Some(actual) => actual == *value,
            None => {
                warn!(key = %key, "unknown fact key in equality condition; rule skipped");
                false
            }
        },
    }
}

// ============================================================================
// Factor extraction
// ============================================================================

/// Collects the audit tags naming which facts justified the match.
fn extract_factors(rule: &PolicyRule, facts: &Facts) -> Vec<String> {
    let mut factors = vec![format!("policy:{}", rule.name)];

    if facts.is_ceo {
        factors.push("ceo_access".to_string());
    } else if facts.is_executive {
        factors.push("executive_access".to_string());
    }
    if facts.is_direct_manager {
        factors.push("direct_manager".to_string());
    }
    if facts.is_skip_level_manager {
        factors.push(format!("skip_level:{}", facts.skip_levels));
    }
    if facts.has_acting_role && facts.acting_role_valid {
        factors.push("acting_role".to_string());
    }
    if let Some(dept) = &facts.same_department {
        factors.push(format!("same_dept:{dept}"));
    }
    if facts.same_team {
        factors.push("same_team".to_string());
    }
    if facts.shared_projects > 0 {
        factors.push(format!("shared_projects:{}", facts.shared_projects));
    }
    if facts.contract_expired
        && rule
            .conditions
            .iter()
            .any(|c| matches!(c, Condition::RequesterTypeRestricted { .. }))
    {
        factors.push("expired_contract".to_string());
    }
    if facts.emergency_mode {
        factors.push("emergency_mode".to_string());
    }

    factors
}
