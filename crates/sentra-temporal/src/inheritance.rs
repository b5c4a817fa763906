//! The temporal role inheritance table.
//!
//! Each temporal role names the base roles eligible to assume it, the roles
//! it inherits permissions from, the permissions it adds, and the longest
//! grant it should ever carry. The table is fixed at compile time; changing
//! it is a policy decision, not a runtime configuration.

use chrono::Duration;
use sentra_types::TemporalRole;

/// Inheritance constraints for one temporal role.
#[derive(Debug, Clone)]
pub struct InheritanceRule {
    /// Base roles allowed to assume this temporal role.
    pub eligible_base_roles: &'static [&'static str],
    /// Roles whose permissions are inherited, in chain order. The literal
    /// `"base_role"` stands for whatever base role the grant names.
    pub inherits_from: &'static [&'static str],
    /// Permissions this role adds beyond its inherited set.
    pub granted_permissions: &'static [&'static str],
    /// Longest grant this role should carry.
    pub max_duration: Duration,
}

/// The constraint row for `role`.
pub fn inheritance_rule(role: TemporalRole) -> InheritanceRule {
    match role {
        TemporalRole::OncallLow => InheritanceRule {
            eligible_base_roles: &["nurse", "resident", "technician", "physician_assistant"],
            inherits_from: &["base_role"],
            granted_permissions: &["view_oncall_schedule", "acknowledge_pages"],
            max_duration: Duration::hours(12),
        },
        TemporalRole::OncallMedium => InheritanceRule {
            eligible_base_roles: &[
                "nurse",
                "resident",
                "attending_physician",
                "physician_assistant",
            ],
            inherits_from: &["base_role", "oncall_low"],
            granted_permissions: &["respond_to_incidents", "access_patient_summaries"],
            max_duration: Duration::hours(12),
        },
        TemporalRole::OncallHigh => InheritanceRule {
            eligible_base_roles: &["attending_physician", "department_head", "senior_resident"],
            inherits_from: &["base_role", "oncall_low", "oncall_medium"],
            granted_permissions: &["authorize_treatments", "access_full_records"],
            max_duration: Duration::hours(12),
        },
        TemporalRole::OncallCritical => InheritanceRule {
            eligible_base_roles: &[
                "attending_physician",
                "department_head",
                "chief_medical_officer",
            ],
            inherits_from: &["base_role", "oncall_low", "oncall_medium", "oncall_high"],
            granted_permissions: &["emergency_overrides", "cross_department_access"],
            max_duration: Duration::hours(8),
        },
        TemporalRole::ActingManager => InheritanceRule {
            eligible_base_roles: &["senior_analyst", "team_lead", "supervisor", "senior_staff"],
            inherits_from: &["base_role", "target_manager_role"],
            granted_permissions: &["approve_requests", "view_team_records"],
            max_duration: Duration::hours(168),
        },
        TemporalRole::ActingSupervisor => InheritanceRule {
            eligible_base_roles: &["senior_analyst", "team_lead", "specialist"],
            inherits_from: &["base_role", "target_supervisor_role"],
            granted_permissions: &["assign_work", "review_output"],
            max_duration: Duration::hours(168),
        },
        TemporalRole::ActingDepartmentHead => InheritanceRule {
            eligible_base_roles: &["manager", "supervisor", "senior_manager"],
            inherits_from: &["base_role", "target_department_head_role"],
            granted_permissions: &["department_budget_access", "org_restructuring"],
            max_duration: Duration::hours(720),
        },
        TemporalRole::IncidentResponder => InheritanceRule {
            eligible_base_roles: &[
                "security_analyst",
                "system_administrator",
                "senior_engineer",
            ],
            inherits_from: &["base_role"],
            granted_permissions: &["access_incident_data", "isolate_systems"],
            max_duration: Duration::hours(24),
        },
        TemporalRole::SecurityIncidentLead => InheritanceRule {
            eligible_base_roles: &[
                "security_manager",
                "senior_security_analyst",
                "incident_commander",
            ],
            inherits_from: &["base_role", "incident_responder"],
            granted_permissions: &["coordinate_response", "external_communication"],
            max_duration: Duration::hours(72),
        },
    }
}

/// The inheritance chain a grant for `role` on top of `base_role` should
/// record: the base role first, then the declared inherited roles in order,
/// with the `"base_role"` placeholder and duplicates removed.
pub fn expected_chain(base_role: &str, role: TemporalRole) -> Vec<String> {
    let mut chain = vec![base_role.to_string()];
    for inherited in inheritance_rule(role).inherits_from {
        if *inherited == "base_role" {
            continue;
        }
        if !chain.iter().any(|c| c == inherited) {
            chain.push((*inherited).to_string());
        }
    }
    chain
}
