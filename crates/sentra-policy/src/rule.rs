//! Policy rule definitions.
//!
//! A rule is a named set of typed conditions mapped to an ALLOW/DENY effect
//! with a priority and a confidence contribution. Conditions are tagged
//! variants per category rather than a stringly-typed map, so the matcher
//! in `evaluator.rs` is exhaustive.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

// ============================================================================
// Effect
// ============================================================================

/// The outcome a rule produces when it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Effect {
    Allow,
    /// Deny is the default: absence of an explicit grant means no access.
    #[default]
    Deny,
}

// ============================================================================
// Condition vocabulary
// ============================================================================

/// Hierarchy labels a rule can require of the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyLabel {
    Ceo,
    ChiefExecutive,
    Executive,
    CLevel,
    Vp,
    VicePresident,
    Manager,
    SeniorManager,
}

impl HierarchyLabel {
    /// Whether the label is satisfied only by the CEO facts.
    pub fn requires_ceo(self) -> bool {
        matches!(self, HierarchyLabel::Ceo | HierarchyLabel::ChiefExecutive)
    }

    /// Whether the label is satisfied by any executive-level requester.
    pub fn requires_executive(self) -> bool {
        matches!(
            self,
            HierarchyLabel::Executive
                | HierarchyLabel::CLevel
                | HierarchyLabel::Vp
                | HierarchyLabel::VicePresident
        )
    }
}

/// Relationship wording a rule can require between requester and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipPattern {
    Manages,
    Supervises,
    Leads,
    Oversees,
    ReportsTo,
    ManagedBy,
    SupervisedBy,
    ActingFor,
    InterimFor,
    CoveringFor,
}

/// The semantic group a relationship pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Requester sits above the target (direct or skip-level manager).
    ManagerOf,
    /// Requester sits below the target.
    ReportOf,
    /// Requester holds a validated acting role for the target.
    ActingAs,
}

impl RelationshipPattern {
    pub fn kind(self) -> RelationKind {
        match self {
            RelationshipPattern::Manages
            | RelationshipPattern::Supervises
            | RelationshipPattern::Leads
            | RelationshipPattern::Oversees => RelationKind::ManagerOf,
            RelationshipPattern::ReportsTo
            | RelationshipPattern::ManagedBy
            | RelationshipPattern::SupervisedBy => RelationKind::ReportOf,
            RelationshipPattern::ActingFor
            | RelationshipPattern::InterimFor
            | RelationshipPattern::CoveringFor => RelationKind::ActingAs,
        }
    }
}

/// Shared organizational context a rule can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharedContextKind {
    Department,
    Division,
    Unit,
    Team,
    Squad,
    Group,
    Project,
    Initiative,
    Task,
    Workstream,
}

/// The fact family a shared-context kind maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedKind {
    Department,
    Team,
    Project,
}

impl SharedContextKind {
    pub fn kind(self) -> SharedKind {
        match self {
            SharedContextKind::Department | SharedContextKind::Division | SharedContextKind::Unit => {
                SharedKind::Department
            }
            SharedContextKind::Team | SharedContextKind::Squad | SharedContextKind::Group => {
                SharedKind::Team
            }
            SharedContextKind::Project
            | SharedContextKind::Initiative
            | SharedContextKind::Task
            | SharedContextKind::Workstream => SharedKind::Project,
        }
    }
}

// ============================================================================
// Conditions
// ============================================================================

/// A single typed condition inside a rule.
///
/// Every condition in a rule must hold for the rule to match; a rule with
/// no conditions matches unconditionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Matches only while the facts report an active emergency. Checked
    /// before anything else: a rule requiring emergency mode is rejected
    /// outright when the flag is down.
    EmergencyMode,

    /// Requester must satisfy at least one of the given hierarchy labels.
    HierarchyLevel { any_of: Vec<HierarchyLabel> },

    /// Requester must have at least this many direct reports.
    MinDirectReports { count: u32 },

    /// Requester must stand in at least one of these relationships to the
    /// target. Acting patterns require the acting role to have validated.
    RelationshipPatterns { any_of: Vec<RelationshipPattern> },

    /// Requester and target must share at least one of these contexts.
    SharedContext { any_of: Vec<SharedContextKind> },

    /// Triggers when the requester's employment type appears in the
    /// restricted list. Typically paired with a DENY effect; an expired
    /// contract strengthens the match.
    RequesterTypeRestricted { types: Vec<String> },

    /// Rejects the rule outside business hours.
    BusinessHoursOnly,

    /// Direct equality against a named scalar fact. Unknown keys make the
    /// rule non-matching (logged as a configuration warning, never an
    /// error).
    Equals {
        key: String,
        value: serde_json::Value,
    },
}

impl Condition {
    /// Convenience for the common "requester manages target" condition.
    pub fn relationship_manages() -> Self {
        Condition::RelationshipPatterns {
            any_of: vec![RelationshipPattern::Manages],
        }
    }

    /// Convenience for the common "same team" condition.
    pub fn shared_team() -> Self {
        Condition::SharedContext {
            any_of: vec![SharedContextKind::Team],
        }
    }
}

// ============================================================================
// PolicyRule
// ============================================================================

/// A declarative access rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Higher priorities are evaluated first; ties keep load order.
    pub priority: u32,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub effect: Effect,
    /// Contribution to decision confidence when this rule fires.
    #[serde(default = "default_confidence_boost")]
    pub confidence_boost: f64,
}

fn default_confidence_boost() -> f64 {
    0.5
}

impl PolicyRule {
    pub fn new(name: &str, effect: Effect, priority: u32) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            priority,
            conditions: Vec::new(),
            effect,
            confidence_boost: default_confidence_boost(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_confidence_boost(mut self, boost: f64) -> Self {
        self.confidence_boost = boost;
        self
    }

    /// The terminal catch-all: empty conditions, lowest useful priority,
    /// deny with high confidence. Every rule set should end with one.
    pub fn default_deny() -> Self {
        PolicyRule::new("default_deny", Effect::Deny, 1)
            .with_description("No explicit grant matched")
            .with_confidence_boost(0.9)
    }
}

// ============================================================================
// RuleStore
// ============================================================================

/// Priority-ordered rule set with atomic snapshot reload.
///
/// Rules are stable-sorted by descending priority at load time, so ties
/// keep their original order. Evaluation works over an `Arc` snapshot;
/// `replace` swaps the snapshot under a short write lock and never mutates
/// a set an in-flight evaluation is reading.
pub struct RuleStore {
    rules: RwLock<Arc<[PolicyRule]>>,
}

impl RuleStore {
    pub fn new(mut rules: Vec<PolicyRule>) -> Self {
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self {
            rules: RwLock::new(rules.into()),
        }
    }

    /// The current immutable rule snapshot.
    pub fn snapshot(&self) -> Arc<[PolicyRule]> {
        self.rules
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Atomically replaces the rule set.
    pub fn replace(&self, mut rules: Vec<PolicyRule>) {
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        let count = rules.len();
        *self
            .rules
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = rules.into();
        tracing::info!(rule_count = count, "rule set replaced");
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// A baseline rule set mirroring common org policy: executives see
    /// broadly, managers see their chains, teams collaborate, contractors
    /// are fenced off sensitive resources, and everything else is denied.
    pub fn baseline() -> Self {
        RuleStore::new(vec![
            PolicyRule::new("ceo_full_access", Effect::Allow, 100)
                .with_description("CEO may access any organizational resource")
                .with_condition(Condition::HierarchyLevel {
                    any_of: vec![HierarchyLabel::Ceo, HierarchyLabel::ChiefExecutive],
                })
                .with_confidence_boost(0.95),
            PolicyRule::new("executive_access", Effect::Allow, 90)
                .with_description("Executives may access department-level resources")
                .with_condition(Condition::HierarchyLevel {
                    any_of: vec![HierarchyLabel::Executive, HierarchyLabel::Vp],
                })
                .with_confidence_boost(0.85),
            PolicyRule::new("direct_manager_access", Effect::Allow, 80)
                .with_description("Managers may access their reports' resources")
                .with_condition(Condition::RelationshipPatterns {
                    any_of: vec![
                        RelationshipPattern::Manages,
                        RelationshipPattern::Supervises,
                    ],
                })
                .with_confidence_boost(0.8),
            PolicyRule::new("contractor_restriction", Effect::Deny, 70)
                .with_description("External workers are denied restricted resources")
                .with_condition(Condition::RequesterTypeRestricted {
                    types: vec![
                        "contractor".to_string(),
                        "vendor".to_string(),
                        "consultant".to_string(),
                        "freelancer".to_string(),
                    ],
                })
                .with_confidence_boost(0.85),
            PolicyRule::new("same_team_collaboration", Effect::Allow, 60)
                .with_description("Team members may access shared team resources")
                .with_condition(Condition::shared_team())
                .with_confidence_boost(0.7),
            PolicyRule::new("business_hours_department", Effect::Allow, 50)
                .with_description("Department colleagues during business hours")
                .with_condition(Condition::SharedContext {
                    any_of: vec![SharedContextKind::Department],
                })
                .with_condition(Condition::BusinessHoursOnly)
                .with_confidence_boost(0.6),
            PolicyRule::default_deny(),
        ])
    }
}
