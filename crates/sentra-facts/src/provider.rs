//! The fact provider contract and the directory records it serves.
//!
//! A provider is one source of organizational truth (HR system, LDAP
//! mirror, cached snapshot). Providers answer two questions: who is this
//! employee, and does a management chain link these two people. Everything
//! else the resolver derives from the answers.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sentra_types::{Classification, Clearance};

use crate::error::ProviderError;

/// Requester types treated as external workforce.
pub const CONTRACTOR_TYPES: [&str; 4] = ["contractor", "vendor", "consultant", "freelancer"];

/// Data classification a department's resources carry by default.
///
/// HR, finance, and legal hold personnel and money records; the executive
/// office holds board material; everything else is ordinary internal data.
pub fn department_classification(department: &str) -> Classification {
    let lowered = department.to_lowercase();
    if ["hr", "human resources", "finance", "legal"]
        .iter()
        .any(|d| lowered.contains(d))
    {
        Classification::Confidential
    } else if lowered.contains("executive") {
        Classification::Restricted
    } else {
        Classification::Internal
    }
}

/// Directory record for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeContext {
    pub employee_id: String,
    pub role: String,
    #[serde(default = "default_employee_type")]
    pub employee_type: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub direct_reports: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub clearance: Clearance,
    /// End of contract for external workforce. Absent means open-ended.
    #[serde(default)]
    pub contract_end: Option<DateTime<Utc>>,
    /// Start of a directory-recorded acting role delegation.
    #[serde(default)]
    pub acting_role_start: Option<DateTime<Utc>>,
    /// End of a directory-recorded acting role delegation.
    #[serde(default)]
    pub acting_role_end: Option<DateTime<Utc>>,
    /// Personal working hours as `(start_hour, end_hour)`, overriding the
    /// org-wide window when set.
    #[serde(default)]
    pub working_hours: Option<(u32, u32)>,
    /// IANA timezone name from the directory, informational only.
    #[serde(default)]
    pub timezone: Option<String>,
}

fn default_employee_type() -> String {
    "employee".to_string()
}

impl EmployeeContext {
    /// Minimal record for an internal employee.
    pub fn new(employee_id: &str, role: &str) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            role: role.to_string(),
            employee_type: default_employee_type(),
            department: None,
            team: None,
            manager_id: None,
            direct_reports: Vec::new(),
            projects: Vec::new(),
            clearance: Clearance::default(),
            contract_end: None,
            acting_role_start: None,
            acting_role_end: None,
            working_hours: None,
            timezone: None,
        }
    }

    pub fn with_department(mut self, department: &str) -> Self {
        self.department = Some(department.to_string());
        self
    }

    pub fn with_team(mut self, team: &str) -> Self {
        self.team = Some(team.to_string());
        self
    }

    pub fn with_manager(mut self, manager_id: &str) -> Self {
        self.manager_id = Some(manager_id.to_string());
        self
    }

    pub fn with_reports(mut self, reports: &[&str]) -> Self {
        self.direct_reports = reports.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_projects(mut self, projects: &[&str]) -> Self {
        self.projects = projects.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_clearance(mut self, clearance: Clearance) -> Self {
        self.clearance = clearance;
        self
    }

    pub fn with_employee_type(mut self, employee_type: &str) -> Self {
        self.employee_type = employee_type.to_lowercase();
        self
    }

    pub fn with_contract_end(mut self, end: DateTime<Utc>) -> Self {
        self.contract_end = Some(end);
        self
    }

    pub fn with_acting_window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.acting_role_start = Some(start);
        self.acting_role_end = Some(end);
        self
    }

    pub fn with_working_hours(mut self, start_hour: u32, end_hour: u32) -> Self {
        self.working_hours = Some((start_hour, end_hour));
        self
    }

    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.timezone = Some(timezone.to_string());
        self
    }

    /// Whether this record describes external workforce.
    pub fn is_contractor(&self) -> bool {
        CONTRACTOR_TYPES
            .iter()
            .any(|t| self.employee_type.eq_ignore_ascii_case(t))
    }

    /// Contract validity at `now`. Internal employees and open-ended
    /// contracts always read as valid.
    pub fn contract_expired(&self, now: DateTime<Utc>) -> bool {
        self.is_contractor() && self.contract_end.is_some_and(|end| now > end)
    }

    /// Whether the directory-recorded acting window covers `now`.
    ///
    /// `None` when the record carries no window at all; a half-bounded
    /// window checks only the bound it has. The end is exclusive, matching
    /// the time-window convention elsewhere.
    pub fn acting_window_active(&self, now: DateTime<Utc>) -> Option<bool> {
        match (self.acting_role_start, self.acting_role_end) {
            (None, None) => None,
            (start, end) => Some(
                start.is_none_or(|s| now >= s) && end.is_none_or(|e| now < e),
            ),
        }
    }

    /// Whether `hour` falls inside this employee's personal working hours.
    ///
    /// `None` when the record declares no personal window, in which case
    /// the org-wide business hours apply.
    pub fn within_working_hours(&self, hour: u32) -> Option<bool> {
        self.working_hours
            .map(|(start, end)| (start..end).contains(&hour))
    }

    /// Organizational seniority derived from role title and span of control.
    ///
    /// 5 = chief executive, 4 = C-suite/VP, 3 = director or 10+ reports,
    /// 2 = manager/lead or 3+ reports, 1 = individual contributor.
    pub fn hierarchy_level(&self) -> u8 {
        let role = self.role.to_lowercase();
        let reports = self.direct_reports.len();

        if role.contains("ceo") || role.contains("founder") || role.contains("chief executive") {
            5
        } else if role.contains("cto")
            || role.contains("cfo")
            || role.contains("coo")
            || role.contains("vp")
            || role.contains("vice president")
            || role.contains("chief")
        {
            4
        } else if role.contains("director") || role.contains("head") || reports >= 10 {
            3
        } else if role.contains("manager") || role.contains("lead") || reports >= 3 {
            2
        } else {
            1
        }
    }

    pub fn is_ceo(&self) -> bool {
        let role = self.role.to_lowercase();
        role.contains("ceo") || role.contains("chief executive")
    }

    /// Executive standing: C-suite title or a wide span of control.
    pub fn is_executive(&self) -> bool {
        let role = self.role.to_lowercase();
        self.is_ceo()
            || role.contains("cto")
            || role.contains("cfo")
            || role.contains("coo")
            || role.contains("chief")
            || role.contains("vp")
            || role.contains("vice president")
            || self.direct_reports.len() >= 5
    }
}

/// A shared department between two employees, with the classification its
/// resources carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentMatch {
    pub department: String,
    pub classification: Classification,
}

/// A project two employees both work on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedProject {
    pub project: String,
    /// Scope label of the project's data, from the shared department's
    /// classification when the pair shares one.
    pub data_scope: String,
}

/// Result of a management chain lookup between two employees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    /// Whether the first employee sits somewhere above the second.
    pub in_chain: bool,
    /// Management levels between them when `in_chain` holds (1 = direct).
    pub levels: u32,
}

impl ChainLink {
    pub const NONE: ChainLink = ChainLink {
        in_chain: false,
        levels: 0,
    };
}

/// Wall-clock budget for one resolution pass.
///
/// Every provider call checks the deadline before starting; an expired
/// deadline reads as a transient `Cancelled` so the chain can degrade
/// instead of blocking the request.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    pub fn within(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now() + budget,
        }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub fn check(&self) -> Result<(), ProviderError> {
        if self.expired() {
            return Err(ProviderError::Cancelled);
        }
        Ok(())
    }
}

/// One source of organizational facts.
pub trait FactProvider: Send + Sync {
    /// Stable name for logs and error messages.
    fn name(&self) -> &str;

    /// Fetches the directory record for an employee.
    fn employee_context(
        &self,
        employee_id: &str,
        deadline: &Deadline,
    ) -> Result<EmployeeContext, ProviderError>;

    /// Whether `upper` appears in `lower`'s management chain, and how far up.
    fn management_chain(
        &self,
        upper: &str,
        lower: &str,
        deadline: &Deadline,
    ) -> Result<ChainLink, ProviderError>;

    /// Whether `report_id` reports directly to `manager_id`. The default
    /// implementation cross-checks both records so a one-sided directory
    /// entry still answers correctly.
    fn check_direct_report(
        &self,
        manager_id: &str,
        report_id: &str,
        deadline: &Deadline,
    ) -> Result<bool, ProviderError> {
        let manager = self.employee_context(manager_id, deadline)?;
        if manager.direct_reports.iter().any(|r| r == report_id) {
            return Ok(true);
        }
        let report = self.employee_context(report_id, deadline)?;
        Ok(report.manager_id.as_deref() == Some(manager_id))
    }

    /// The department two employees share, with its data classification, or
    /// `None` when they sit in different departments.
    fn check_same_department(
        &self,
        id_a: &str,
        id_b: &str,
        deadline: &Deadline,
    ) -> Result<Option<DepartmentMatch>, ProviderError> {
        let a = self.employee_context(id_a, deadline)?;
        let b = self.employee_context(id_b, deadline)?;
        match (&a.department, &b.department) {
            (Some(x), Some(y)) if x.eq_ignore_ascii_case(y) => Ok(Some(DepartmentMatch {
                department: x.clone(),
                classification: department_classification(x),
            })),
            _ => Ok(None),
        }
    }

    /// Whether two employees sit on the same team.
    fn check_same_team(
        &self,
        id_a: &str,
        id_b: &str,
        deadline: &Deadline,
    ) -> Result<bool, ProviderError> {
        let a = self.employee_context(id_a, deadline)?;
        let b = self.employee_context(id_b, deadline)?;
        Ok(matches!(
            (&a.team, &b.team),
            (Some(x), Some(y)) if x.eq_ignore_ascii_case(y)
        ))
    }

    /// The projects two employees both work on.
    fn check_shared_project(
        &self,
        id_a: &str,
        id_b: &str,
        deadline: &Deadline,
    ) -> Result<Vec<SharedProject>, ProviderError> {
        let a = self.employee_context(id_a, deadline)?;
        let b = self.employee_context(id_b, deadline)?;
        let scope = match (&a.department, &b.department) {
            (Some(x), Some(y)) if x.eq_ignore_ascii_case(y) => {
                department_classification(x).as_str()
            }
            _ => Classification::Internal.as_str(),
        };
        Ok(a.projects
            .iter()
            .filter(|p| b.projects.contains(p))
            .map(|p| SharedProject {
                project: p.clone(),
                data_scope: scope.to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, Utc};

    use super::*;

    #[test]
    fn test_hierarchy_level_from_title() {
        assert_eq!(EmployeeContext::new("emp-1", "CEO").hierarchy_level(), 5);
        assert_eq!(
            EmployeeContext::new("emp-2", "VP of Engineering").hierarchy_level(),
            4
        );
        assert_eq!(
            EmployeeContext::new("emp-3", "Engineering Director").hierarchy_level(),
            3
        );
        assert_eq!(
            EmployeeContext::new("emp-4", "Team Lead").hierarchy_level(),
            2
        );
        assert_eq!(
            EmployeeContext::new("emp-5", "Software Engineer").hierarchy_level(),
            1
        );
    }

    #[test]
    fn test_hierarchy_level_from_span_of_control() {
        let wide = EmployeeContext::new("emp-6", "Engineer").with_reports(&[
            "a", "b", "c", "d", "e", "f", "g", "h", "i", "j",
        ]);
        assert_eq!(wide.hierarchy_level(), 3, "10 reports reads as director");

        let small = EmployeeContext::new("emp-7", "Engineer").with_reports(&["a", "b", "c"]);
        assert_eq!(small.hierarchy_level(), 2, "3 reports reads as manager");
    }

    #[test]
    fn test_executive_standing() {
        assert!(EmployeeContext::new("emp-1", "Chief Technology Officer").is_executive());
        assert!(!EmployeeContext::new("emp-1", "CTO").is_ceo());
        let broad = EmployeeContext::new("emp-2", "Senior Engineer")
            .with_reports(&["a", "b", "c", "d", "e"]);
        assert!(broad.is_executive(), "5+ reports grants executive standing");
    }

    #[test]
    fn test_contract_expiry() {
        let now = Utc::now();
        let expired = EmployeeContext::new("emp-8", "Consultant")
            .with_employee_type("contractor")
            .with_contract_end(now - ChronoDuration::days(1));
        assert!(expired.contract_expired(now));

        let open_ended = EmployeeContext::new("emp-9", "Consultant")
            .with_employee_type("contractor");
        assert!(
            !open_ended.contract_expired(now),
            "missing contract end reads as valid"
        );

        let internal = EmployeeContext::new("emp-10", "Engineer")
            .with_contract_end(now - ChronoDuration::days(1));
        assert!(
            !internal.contract_expired(now),
            "contract end is ignored for internal employees"
        );
    }

    #[test]
    fn test_acting_window_states() {
        let now = Utc::now();
        let none = EmployeeContext::new("emp-1", "Engineer");
        assert_eq!(none.acting_window_active(now), None);

        let active = EmployeeContext::new("emp-2", "Engineer")
            .with_acting_window(now - ChronoDuration::hours(1), now + ChronoDuration::hours(1));
        assert_eq!(active.acting_window_active(now), Some(true));

        let lapsed = EmployeeContext::new("emp-3", "Engineer")
            .with_acting_window(now - ChronoDuration::days(2), now - ChronoDuration::days(1));
        assert_eq!(lapsed.acting_window_active(now), Some(false));
    }

    #[test]
    fn test_personal_working_hours() {
        let record = EmployeeContext::new("emp-1", "Engineer").with_working_hours(13, 21);
        assert_eq!(record.within_working_hours(12), Some(false));
        assert_eq!(record.within_working_hours(13), Some(true));
        assert_eq!(record.within_working_hours(21), Some(false), "end is exclusive");

        let default = EmployeeContext::new("emp-2", "Engineer");
        assert_eq!(default.within_working_hours(12), None);
    }

    #[test]
    fn test_department_classification_keywords() {
        assert_eq!(
            department_classification("Human Resources"),
            Classification::Confidential
        );
        assert_eq!(department_classification("finance"), Classification::Confidential);
        assert_eq!(department_classification("executive"), Classification::Restricted);
        assert_eq!(department_classification("engineering"), Classification::Internal);
    }

    #[test]
    fn test_deadline_expires() {
        let deadline = Deadline::within(Duration::ZERO);
        assert!(deadline.expired());
        assert_eq!(deadline.check(), Err(ProviderError::Cancelled));

        let generous = Deadline::within(Duration::from_secs(60));
        assert!(generous.check().is_ok());
    }
}
