//! Turns directory records into the normalized fact record rules match on.
//!
//! Resolution is one pass per request: fetch the requester (and target,
//! when the target is a person), derive relationship signals, and fold in
//! the request's temporal envelope. Directory trouble never fails the
//! request; the resolver hands back a degraded record and lets policy
//! decide what degraded mode is allowed to do.

use std::time::Duration;

use chrono::{Datelike, Timelike, Weekday};
use tracing::{debug, warn};

use sentra_policy::{Facts, HierarchyRelationship};
use sentra_types::{Classification, TargetKind, TemporalContext};

use crate::chain::ProviderChain;
use crate::error::{ProviderError, ResolveError};
use crate::provider::{ChainLink, Deadline, EmployeeContext};

/// Hierarchy level assigned to a department-level target.
const DEPARTMENT_LEVEL: u8 = 3;
/// Hierarchy level assigned to a team-level target.
const TEAM_LEVEL: u8 = 2;

const DEPARTMENT_KEYWORDS: [&str; 8] = [
    "engineering",
    "product",
    "finance",
    "operations",
    "marketing",
    "sales",
    "hr",
    "human resources",
];

const TEAM_KEYWORDS: [&str; 7] = [
    "backend",
    "frontend",
    "mobile",
    "infrastructure",
    "data",
    "analytics",
    "design",
];

/// Classifies a target identifier when it carries no explicit type.
///
/// `emp-` prefixed ids are employees; ids naming a department or team
/// resolve to the org unit; anything else is treated as an employee id and
/// must exist in the directory.
pub fn classify_target(target_id: &str) -> TargetKind {
    if target_id.starts_with("emp-") {
        return TargetKind::Employee;
    }
    let lowered = target_id.to_lowercase();
    if DEPARTMENT_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return TargetKind::Department;
    }
    if TEAM_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return TargetKind::Team;
    }
    TargetKind::Employee
}

/// Outcome of one resolution pass.
#[derive(Debug, Clone, PartialEq)]
pub enum FactOutcome {
    /// All required directory lookups succeeded.
    Resolved(Facts),
    /// Directory trouble; conservative defaults substituted.
    Degraded(Facts),
}

impl FactOutcome {
    pub fn facts(&self) -> &Facts {
        match self {
            FactOutcome::Resolved(facts) | FactOutcome::Degraded(facts) => facts,
        }
    }

    pub fn into_facts(self) -> Facts {
        match self {
            FactOutcome::Resolved(facts) | FactOutcome::Degraded(facts) => facts,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, FactOutcome::Degraded(_))
    }
}

/// Resolves requester/target pairs into [`Facts`].
pub struct FactResolver {
    chain: ProviderChain,
    budget: Duration,
}

impl FactResolver {
    /// Default wall-clock budget for one resolution pass.
    pub const DEFAULT_BUDGET: Duration = Duration::from_secs(2);

    pub fn new(chain: ProviderChain) -> Self {
        Self {
            chain,
            budget: Self::DEFAULT_BUDGET,
        }
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Resolves the fact record for one access request.
    ///
    /// # Errors
    ///
    /// [`ResolveError::EntityNotFound`] when the directory authoritatively
    /// reports the requester (or an employee target) does not exist.
    /// Transient directory failures degrade instead of erroring.
    pub fn resolve(
        &self,
        requester_id: &str,
        target_id: &str,
        temporal: &TemporalContext,
        resource_classification: Option<Classification>,
    ) -> Result<FactOutcome, ResolveError> {
        let deadline = Deadline::within(self.budget);

        let requester = match self.chain.employee_context(requester_id, &deadline) {
            Ok(record) => record,
            Err(ProviderError::NotFound(id)) => return Err(ResolveError::EntityNotFound(id)),
            Err(err) => {
                warn!(requester_id, error = %err, "requester lookup degraded");
                return Ok(FactOutcome::Degraded(self.degraded_facts(
                    requester_id,
                    target_id,
                    temporal,
                    resource_classification,
                )));
            }
        };

        let kind = classify_target(target_id);
        let target = match kind {
            TargetKind::Employee => match self.chain.employee_context(target_id, &deadline) {
                Ok(record) => Some(record),
                Err(ProviderError::NotFound(id)) => {
                    return Err(ResolveError::EntityNotFound(id));
                }
                Err(err) => {
                    warn!(target_id, error = %err, "target lookup degraded");
                    return Ok(FactOutcome::Degraded(self.degraded_facts(
                        requester_id,
                        target_id,
                        temporal,
                        resource_classification,
                    )));
                }
            },
            TargetKind::Department | TargetKind::Team => None,
        };

        let facts = self.build_facts(
            &requester,
            target.as_ref(),
            target_id,
            kind,
            temporal,
            resource_classification,
            &deadline,
        );

        debug!(
            requester_id,
            target_id,
            target_kind = %kind,
            hierarchy_level = facts.hierarchy_level,
            direct_manager = facts.is_direct_manager,
            "facts resolved"
        );
        Ok(FactOutcome::Resolved(facts))
    }

    #[allow(clippy::too_many_arguments)]
    fn build_facts(
        &self,
        requester: &EmployeeContext,
        target: Option<&EmployeeContext>,
        target_id: &str,
        kind: TargetKind,
        temporal: &TemporalContext,
        resource_classification: Option<Classification>,
        deadline: &Deadline,
    ) -> Facts {
        let mut facts = Facts::for_pair(&requester.employee_id, target_id);

        facts.requester_type = requester.employee_type.to_lowercase();
        facts.hierarchy_level = requester.hierarchy_level();
        facts.is_ceo = requester.is_ceo();
        facts.is_executive = requester.is_executive();
        facts.direct_reports = requester.direct_reports.len() as u32;
        facts.department = requester.department.clone();

        let target_level = match (kind, target) {
            (TargetKind::Employee, Some(record)) => record.hierarchy_level(),
            (TargetKind::Department, _) => DEPARTMENT_LEVEL,
            (TargetKind::Team, _) => TEAM_LEVEL,
            (TargetKind::Employee, None) => 1,
        };
        facts.hierarchy_relationship = Some(HierarchyRelationship::from_levels(
            facts.hierarchy_level,
            target_level,
        ));

        match target {
            Some(record) => self.fill_relationship(&mut facts, requester, record, deadline),
            None => self.fill_org_unit(&mut facts, requester, target_id, kind),
        }

        let role = temporal.temporal_role;
        facts.has_acting_role = role.is_some_and(sentra_types::TemporalRole::is_acting);
        if facts.has_acting_role {
            facts.acting_role_expired = temporal.role_expired(temporal.timestamp);
            facts.acting_role_valid =
                !facts.acting_role_expired && temporal.authorization_source.is_some();
        }
        // The directory's recorded acting window can grant the role on its
        // own and bounds any role the request claims.
        if let Some(active) = requester.acting_window_active(temporal.timestamp) {
            if active {
                if !facts.has_acting_role {
                    facts.has_acting_role = true;
                    facts.acting_role_valid = true;
                }
            } else if facts.has_acting_role {
                facts.acting_role_valid = false;
                facts.acting_role_expired = true;
            }
        }

        facts.contract_expired = requester.contract_expired(temporal.timestamp);
        facts.insufficient_clearance =
            resource_classification.is_some_and(|c| !requester.clearance.satisfies(c));

        // Personal working hours, when the directory records them, replace
        // the org-wide window; weekends stay off-hours either way.
        facts.in_business_hours =
            match requester.within_working_hours(temporal.timestamp.hour()) {
                Some(inside) => {
                    inside
                        && !matches!(
                            temporal.timestamp.weekday(),
                            Weekday::Sat | Weekday::Sun
                        )
                }
                None => temporal.business_hours,
            };
        facts.emergency_mode = temporal.in_emergency_context();
        facts.resource_classification = resource_classification;

        facts
    }

    /// Person-to-person relationship signals.
    fn fill_relationship(
        &self,
        facts: &mut Facts,
        requester: &EmployeeContext,
        target: &EmployeeContext,
        deadline: &Deadline,
    ) {
        facts.is_direct_manager = target.manager_id.as_deref()
            == Some(requester.employee_id.as_str())
            || requester.direct_reports.contains(&target.employee_id);
        facts.is_direct_report =
            requester.manager_id.as_deref() == Some(target.employee_id.as_str());

        if !facts.is_direct_manager {
            let link = self
                .chain
                .management_chain(&requester.employee_id, &target.employee_id, deadline)
                .unwrap_or_else(|err| {
                    warn!(error = %err, "management chain lookup failed, assuming no chain");
                    ChainLink::NONE
                });
            if link.in_chain && link.levels >= 2 {
                facts.is_skip_level_manager = true;
                facts.skip_levels = link.levels;
            }
        }

        facts.same_department = match (&requester.department, &target.department) {
            (Some(a), Some(b)) if a.eq_ignore_ascii_case(b) => Some(a.clone()),
            _ => None,
        };
        facts.same_team = matches!(
            (&requester.team, &target.team),
            (Some(a), Some(b)) if a.eq_ignore_ascii_case(b)
        );
        facts.shared_projects = requester
            .projects
            .iter()
            .filter(|p| target.projects.contains(p))
            .count() as u32;
    }

    /// Membership signals against a department or team target.
    fn fill_org_unit(
        &self,
        facts: &mut Facts,
        requester: &EmployeeContext,
        target_id: &str,
        kind: TargetKind,
    ) {
        let target = target_id.to_lowercase();
        match kind {
            TargetKind::Department => {
                if let Some(dept) = &requester.department {
                    let dept_lower = dept.to_lowercase();
                    if target.contains(&dept_lower) || dept_lower.contains(&target) {
                        facts.same_department = Some(dept.clone());
                    }
                }
            }
            TargetKind::Team => {
                facts.same_team = requester.team.as_ref().is_some_and(|team| {
                    let team_lower = team.to_lowercase();
                    target.contains(&team_lower) || team_lower.contains(&target)
                });
            }
            TargetKind::Employee => {}
        }
    }

    /// The conservative record used when providers are down: temporal
    /// signals still come from the request, everything directory-derived
    /// takes its safest value.
    fn degraded_facts(
        &self,
        requester_id: &str,
        target_id: &str,
        temporal: &TemporalContext,
        resource_classification: Option<Classification>,
    ) -> Facts {
        let mut facts = Facts::degraded(requester_id, target_id);
        facts.emergency_mode = temporal.in_emergency_context();
        facts.resource_classification = resource_classification;
        // Unknown clearance cannot satisfy a classified resource.
        facts.insufficient_clearance = resource_classification
            .is_some_and(|c| c.required_clearance() > sentra_types::Clearance::Basic);
        facts
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    use sentra_types::{Clearance, TemporalRole};

    use crate::provider::FactProvider;
    use crate::snapshot::OrgSnapshot;

    use super::*;

    fn monday_noon() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    fn org() -> OrgSnapshot {
        OrgSnapshot::new("test-org")
            .with_employee(
                EmployeeContext::new("emp-ceo", "CEO")
                    .with_department("executive")
                    .with_reports(&["emp-vp"])
                    .with_clearance(Clearance::Executive),
            )
            .with_employee(
                EmployeeContext::new("emp-vp", "VP of Engineering")
                    .with_department("engineering")
                    .with_manager("emp-ceo")
                    .with_reports(&["emp-mgr"])
                    .with_clearance(Clearance::TopSecret),
            )
            .with_employee(
                EmployeeContext::new("emp-mgr", "Engineering Manager")
                    .with_department("engineering")
                    .with_team("backend")
                    .with_manager("emp-vp")
                    .with_reports(&["emp-ic", "emp-ic2"])
                    .with_clearance(Clearance::Elevated),
            )
            .with_employee(
                EmployeeContext::new("emp-ic", "Software Engineer")
                    .with_department("engineering")
                    .with_team("backend")
                    .with_manager("emp-mgr")
                    .with_projects(&["atlas", "borealis"])
                    .with_clearance(Clearance::Standard),
            )
            .with_employee(
                EmployeeContext::new("emp-ic2", "Software Engineer")
                    .with_department("engineering")
                    .with_team("backend")
                    .with_manager("emp-mgr")
                    .with_projects(&["atlas"])
                    .with_clearance(Clearance::Standard),
            )
            .with_employee(
                EmployeeContext::new("emp-ext", "Consultant")
                    .with_employee_type("contractor")
                    .with_department("engineering")
                    .with_contract_end(monday_noon() - ChronoDuration::days(3)),
            )
    }

    fn resolver() -> FactResolver {
        FactResolver::new(ProviderChain::new().with_provider(Box::new(org())))
    }

    #[test]
    fn test_classify_target() {
        assert_eq!(classify_target("emp-104"), TargetKind::Employee);
        assert_eq!(classify_target("engineering"), TargetKind::Department);
        assert_eq!(classify_target("human resources"), TargetKind::Department);
        assert_eq!(classify_target("backend"), TargetKind::Team);
        assert_eq!(classify_target("alice"), TargetKind::Employee);
    }

    #[test]
    fn test_direct_manager_signals() {
        let outcome = resolver()
            .resolve("emp-mgr", "emp-ic", &TemporalContext::at(monday_noon()), None)
            .unwrap();
        let facts = outcome.facts();
        assert!(facts.is_direct_manager);
        assert!(!facts.is_skip_level_manager);
        assert_eq!(facts.hierarchy_level, 2);
        assert_eq!(facts.same_department.as_deref(), Some("engineering"));
        assert!(facts.same_team);
        assert!(!outcome.is_degraded());
    }

    #[test]
    fn test_skip_level_chain() {
        let outcome = resolver()
            .resolve("emp-ceo", "emp-ic", &TemporalContext::at(monday_noon()), None)
            .unwrap();
        let facts = outcome.facts();
        assert!(!facts.is_direct_manager);
        assert!(facts.is_skip_level_manager);
        assert_eq!(facts.skip_levels, 3);
        assert!(facts.is_ceo);
        assert_eq!(
            facts.hierarchy_relationship,
            Some(HierarchyRelationship::Downward)
        );
    }

    #[test]
    fn test_peer_shared_projects() {
        let outcome = resolver()
            .resolve("emp-ic", "emp-ic2", &TemporalContext::at(monday_noon()), None)
            .unwrap();
        let facts = outcome.facts();
        assert_eq!(facts.shared_projects, 1, "only atlas is shared");
        assert!(facts.same_team);
        assert!(facts.is_direct_report || !facts.is_direct_manager);
        assert_eq!(
            facts.hierarchy_relationship,
            Some(HierarchyRelationship::Lateral)
        );
    }

    #[test]
    fn test_department_target_membership() {
        let outcome = resolver()
            .resolve(
                "emp-ic",
                "engineering",
                &TemporalContext::at(monday_noon()),
                None,
            )
            .unwrap();
        let facts = outcome.facts();
        assert_eq!(facts.same_department.as_deref(), Some("engineering"));
        assert_eq!(
            facts.hierarchy_relationship,
            Some(HierarchyRelationship::Upward),
            "IC at level 1 looks up at a level-3 department"
        );
    }

    #[test]
    fn test_unknown_requester_is_hard_error() {
        let err = resolver()
            .resolve("emp-ghost", "emp-ic", &TemporalContext::at(monday_noon()), None)
            .unwrap_err();
        assert_eq!(err, ResolveError::EntityNotFound("emp-ghost".to_string()));
    }

    #[test]
    fn test_contractor_expiry_and_clearance() {
        let outcome = resolver()
            .resolve(
                "emp-ext",
                "emp-ic",
                &TemporalContext::at(monday_noon()),
                Some(Classification::Restricted),
            )
            .unwrap();
        let facts = outcome.facts();
        assert_eq!(facts.requester_type, "contractor");
        assert!(facts.contract_expired);
        assert!(
            facts.insufficient_clearance,
            "basic clearance cannot reach restricted data"
        );
    }

    #[test]
    fn test_acting_role_state() {
        let temporal = TemporalContext::at(monday_noon())
            .with_temporal_role(TemporalRole::ActingManager, "team_lead")
            .with_authorization_source("delegation_system")
            .with_valid_until(monday_noon() + ChronoDuration::hours(48));
        let outcome = resolver()
            .resolve("emp-ic", "emp-ic2", &temporal, None)
            .unwrap();
        let facts = outcome.facts();
        assert!(facts.has_acting_role);
        assert!(facts.acting_role_valid);
        assert!(!facts.acting_role_expired);
    }

    #[test]
    fn test_directory_acting_window_grants_role() {
        let org = org().with_employee(
            EmployeeContext::new("emp-cover", "Software Engineer")
                .with_department("engineering")
                .with_acting_window(
                    monday_noon() - ChronoDuration::hours(1),
                    monday_noon() + ChronoDuration::hours(7),
                ),
        );
        let resolver = FactResolver::new(ProviderChain::new().with_provider(Box::new(org)));

        // No role claimed on the request; the directory window alone grants it.
        let outcome = resolver
            .resolve("emp-cover", "emp-ic", &TemporalContext::at(monday_noon()), None)
            .unwrap();
        let facts = outcome.facts();
        assert!(facts.has_acting_role);
        assert!(facts.acting_role_valid);
    }

    #[test]
    fn test_lapsed_directory_window_invalidates_claimed_role() {
        let org = org().with_employee(
            EmployeeContext::new("emp-cover", "Software Engineer")
                .with_department("engineering")
                .with_acting_window(
                    monday_noon() - ChronoDuration::days(3),
                    monday_noon() - ChronoDuration::days(1),
                ),
        );
        let resolver = FactResolver::new(ProviderChain::new().with_provider(Box::new(org)));

        // The request claims a still-valid grant, but the directory window
        // has lapsed.
        let temporal = TemporalContext::at(monday_noon())
            .with_temporal_role(TemporalRole::ActingManager, "team_lead")
            .with_authorization_source("delegation_system")
            .with_valid_until(monday_noon() + ChronoDuration::hours(8));
        let outcome = resolver.resolve("emp-cover", "emp-ic", &temporal, None).unwrap();
        let facts = outcome.facts();
        assert!(facts.has_acting_role);
        assert!(!facts.acting_role_valid, "the directory window wins");
        assert!(facts.acting_role_expired);
    }

    #[test]
    fn test_personal_working_hours_override_org_window() {
        let org = org().with_employee(
            EmployeeContext::new("emp-late", "Software Engineer")
                .with_department("engineering")
                .with_working_hours(14, 22),
        );
        let resolver = FactResolver::new(ProviderChain::new().with_provider(Box::new(org)));

        // Monday noon is inside the org window but before this shift starts.
        let outcome = resolver
            .resolve("emp-late", "emp-ic", &TemporalContext::at(monday_noon()), None)
            .unwrap();
        assert!(!outcome.facts().in_business_hours);

        // 20:00 is off-hours for the org but inside the shift.
        let evening = TemporalContext::at(monday_noon() + ChronoDuration::hours(8));
        let outcome = resolver.resolve("emp-late", "emp-ic", &evening, None).unwrap();
        assert!(outcome.facts().in_business_hours);
    }

    #[test]
    fn test_all_providers_down_degrades() {
        struct Down;
        impl FactProvider for Down {
            fn name(&self) -> &str {
                "down"
            }
            fn employee_context(
                &self,
                _id: &str,
                _deadline: &Deadline,
            ) -> Result<EmployeeContext, ProviderError> {
                Err(ProviderError::Unavailable {
                    provider: "down".to_string(),
                    message: "maintenance window".to_string(),
                })
            }
            fn management_chain(
                &self,
                _upper: &str,
                _lower: &str,
                _deadline: &Deadline,
            ) -> Result<ChainLink, ProviderError> {
                Err(ProviderError::Unavailable {
                    provider: "down".to_string(),
                    message: "maintenance window".to_string(),
                })
            }
        }

        let resolver = FactResolver::new(ProviderChain::new().with_provider(Box::new(Down)));
        let temporal = TemporalContext::at(monday_noon()).with_emergency_override();
        let outcome = resolver
            .resolve("emp-1", "emp-2", &temporal, Some(Classification::Confidential))
            .unwrap();

        assert!(outcome.is_degraded());
        let facts = outcome.facts();
        assert!(facts.degraded_mode);
        assert!(!facts.in_business_hours, "degraded mode is conservative");
        assert!(facts.emergency_mode, "request-side signals survive degradation");
        assert!(facts.insufficient_clearance);
    }
}
