//! The normalized fact record rules are matched against.

use serde::{Deserialize, Serialize};
use sentra_types::Classification;

/// How the requester's hierarchy level compares to the resource owner's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyRelationship {
    /// Requester outranks the owner.
    Downward,
    /// Same level.
    Lateral,
    /// Owner outranks the requester.
    Upward,
}

impl HierarchyRelationship {
    /// Classifies requester level against owner level.
    pub fn from_levels(requester: u8, owner: u8) -> Self {
        use std::cmp::Ordering;
        match requester.cmp(&owner) {
            Ordering::Greater => HierarchyRelationship::Downward,
            Ordering::Equal => HierarchyRelationship::Lateral,
            Ordering::Less => HierarchyRelationship::Upward,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HierarchyRelationship::Downward => "downward",
            HierarchyRelationship::Lateral => "lateral",
            HierarchyRelationship::Upward => "upward",
        }
    }
}

/// Derived signals about one requester/target pair.
///
/// Produced fresh per request by the fact resolver and never mutated after
/// evaluation begins. This is a closed record: every signal a condition can
/// reference is a named field, so the matcher stays exhaustive. The
/// [`scalar`](Facts::scalar) accessor exposes the subset reachable by
/// direct-equality conditions under stable string keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facts {
    pub requester_id: String,
    pub target_id: String,

    // Requester standing.
    pub requester_type: String,
    pub hierarchy_level: u8,
    pub is_ceo: bool,
    pub is_executive: bool,
    pub direct_reports: u32,
    pub department: Option<String>,

    // Relationship to the target.
    pub is_direct_manager: bool,
    pub is_skip_level_manager: bool,
    /// Levels between requester and target when a skip-level chain exists.
    pub skip_levels: u32,
    pub is_direct_report: bool,

    // Acting role state.
    pub has_acting_role: bool,
    pub acting_role_valid: bool,
    pub acting_role_expired: bool,

    // Shared context.
    pub same_department: Option<String>,
    pub same_team: bool,
    pub shared_projects: u32,

    // Contract and clearance.
    pub contract_expired: bool,
    pub insufficient_clearance: bool,

    // Temporal state.
    pub in_business_hours: bool,
    pub emergency_mode: bool,

    // Resource-variant additions.
    pub hierarchy_relationship: Option<HierarchyRelationship>,
    pub resource_classification: Option<Classification>,

    /// Set when the provider chain fell back to conservative defaults.
    pub degraded_mode: bool,
}

impl Facts {
    /// An empty fact record for a requester/target pair. All signals start
    /// at their most conservative value.
    pub fn for_pair(requester_id: &str, target_id: &str) -> Self {
        Self {
            requester_id: requester_id.to_string(),
            target_id: target_id.to_string(),
            requester_type: "employee".to_string(),
            hierarchy_level: 1,
            is_ceo: false,
            is_executive: false,
            direct_reports: 0,
            department: None,
            is_direct_manager: false,
            is_skip_level_manager: false,
            skip_levels: 0,
            is_direct_report: false,
            has_acting_role: false,
            acting_role_valid: false,
            acting_role_expired: false,
            same_department: None,
            same_team: false,
            shared_projects: 0,
            contract_expired: false,
            insufficient_clearance: false,
            in_business_hours: true,
            emergency_mode: false,
            hierarchy_relationship: None,
            resource_classification: None,
            degraded_mode: false,
        }
    }

    /// The conservative fallback record used when every provider failed:
    /// unknown standing, no relationships, flagged as degraded.
    pub fn degraded(requester_id: &str, target_id: &str) -> Self {
        let mut facts = Facts::for_pair(requester_id, target_id);
        facts.degraded_mode = true;
        facts.in_business_hours = false;
        facts
    }

    /// Scalar view of a fact by key, for direct-equality conditions.
    ///
    /// Returns `None` for keys outside the permitted set; the evaluator
    /// treats that as a non-match and logs a configuration warning.
    pub fn scalar(&self, key: &str) -> Option<serde_json::Value> {
        use serde_json::{Value, json};
        let value: Value = match key {
            "requester_type" => json!(self.requester_type),
            "hierarchy_level" => json!(self.hierarchy_level),
            "direct_reports" => json!(self.direct_reports),
            "department" => json!(self.department),
            "same_team" => json!(self.same_team),
            "shared_projects" => json!(self.shared_projects),
            "in_business_hours" => json!(self.in_business_hours),
            "emergency_mode" => json!(self.emergency_mode),
            "insufficient_clearance" => json!(self.insufficient_clearance),
            "contract_expired" => json!(self.contract_expired),
            "degraded_mode" => json!(self.degraded_mode),
            "hierarchy_relationship" => {
                json!(self.hierarchy_relationship.map(HierarchyRelationship::as_str))
            }
            "resource_classification" => {
                json!(self.resource_classification.map(Classification::as_str))
            }
            _ => return None,
        };
        Some(value)
    }
}
