//! In-memory org directory snapshot.
//!
//! The snapshot is the reference [`FactProvider`]: a map of employee
//! records loaded at startup (or built in code) and queried without IO.
//! Deployments typically put it last in the provider chain as the
//! always-available fallback behind live directory connectors.

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use crate::error::ProviderError;
use crate::provider::{ChainLink, Deadline, EmployeeContext, FactProvider};

/// Upper bound on management chain walks; deeper org charts indicate a
/// reporting cycle in the data.
const MAX_CHAIN_DEPTH: u32 = 16;

/// Immutable in-memory directory.
#[derive(Debug, Clone, Default)]
pub struct OrgSnapshot {
    name: String,
    employees: HashMap<String, EmployeeContext>,
}

impl OrgSnapshot {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            employees: HashMap::new(),
        }
    }

    /// Adds one employee record; replaces any existing record with the
    /// same id.
    pub fn with_employee(mut self, employee: EmployeeContext) -> Self {
        self.employees.insert(employee.employee_id.clone(), employee);
        self
    }

    /// Loads a snapshot from a JSON array of employee records.
    pub fn load(name: &str, path: &Path) -> Result<Self, ProviderError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ProviderError::Unavailable {
            provider: name.to_string(),
            message: format!("read {}: {e}", path.display()),
        })?;
        let records: Vec<EmployeeContext> =
            serde_json::from_str(&raw).map_err(|e| ProviderError::Unavailable {
                provider: name.to_string(),
                message: format!("parse {}: {e}", path.display()),
            })?;

        info!(provider = name, employees = records.len(), "org snapshot loaded");

        let mut snapshot = Self::new(name);
        for record in records {
            snapshot.employees.insert(record.employee_id.clone(), record);
        }
        Ok(snapshot)
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

impl FactProvider for OrgSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn employee_context(
        &self,
        employee_id: &str,
        deadline: &Deadline,
    ) -> Result<EmployeeContext, ProviderError> {
        deadline.check()?;
        self.employees
            .get(employee_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(employee_id.to_string()))
    }

    fn management_chain(
        &self,
        upper: &str,
        lower: &str,
        deadline: &Deadline,
    ) -> Result<ChainLink, ProviderError> {
        deadline.check()?;

        // Walk up from the lower employee through manager links.
        let mut current = self
            .employees
            .get(lower)
            .ok_or_else(|| ProviderError::NotFound(lower.to_string()))?;
        let mut levels = 0;

        while let Some(manager_id) = current.manager_id.as_deref() {
            levels += 1;
            if levels > MAX_CHAIN_DEPTH {
                return Ok(ChainLink::NONE);
            }
            if manager_id == upper {
                return Ok(ChainLink {
                    in_chain: true,
                    levels,
                });
            }
            match self.employees.get(manager_id) {
                Some(next) => current = next,
                None => return Ok(ChainLink::NONE),
            }
        }

        Ok(ChainLink::NONE)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;

    fn chart() -> OrgSnapshot {
        OrgSnapshot::new("test-chart")
            .with_employee(
                EmployeeContext::new("emp-ceo", "CEO").with_reports(&["emp-vp"]),
            )
            .with_employee(
                EmployeeContext::new("emp-vp", "VP of Engineering")
                    .with_manager("emp-ceo")
                    .with_reports(&["emp-mgr"]),
            )
            .with_employee(
                EmployeeContext::new("emp-mgr", "Engineering Manager")
                    .with_manager("emp-vp")
                    .with_reports(&["emp-ic"]),
            )
            .with_employee(
                EmployeeContext::new("emp-ic", "Software Engineer").with_manager("emp-mgr"),
            )
    }

    fn deadline() -> Deadline {
        Deadline::within(Duration::from_secs(5))
    }

    #[test]
    fn test_lookup_hit_and_miss() {
        let chart = chart();
        assert!(chart.employee_context("emp-vp", &deadline()).is_ok());
        assert_eq!(
            chart.employee_context("emp-ghost", &deadline()),
            Err(ProviderError::NotFound("emp-ghost".to_string()))
        );
    }

    #[test]
    fn test_management_chain_levels() {
        let chart = chart();
        let direct = chart
            .management_chain("emp-mgr", "emp-ic", &deadline())
            .unwrap();
        assert_eq!(direct, ChainLink { in_chain: true, levels: 1 });

        let skip = chart
            .management_chain("emp-ceo", "emp-ic", &deadline())
            .unwrap();
        assert_eq!(skip, ChainLink { in_chain: true, levels: 3 });

        let reversed = chart
            .management_chain("emp-ic", "emp-ceo", &deadline())
            .unwrap();
        assert!(!reversed.in_chain, "chains only run upward");
    }

    #[test]
    fn test_chain_stops_on_reporting_cycle() {
        let cyclic = OrgSnapshot::new("cyclic")
            .with_employee(EmployeeContext::new("emp-a", "Engineer").with_manager("emp-b"))
            .with_employee(EmployeeContext::new("emp-b", "Engineer").with_manager("emp-a"));
        let link = cyclic
            .management_chain("emp-x", "emp-a", &deadline())
            .unwrap();
        assert!(!link.in_chain, "cycle must terminate without a match");
    }

    #[test]
    fn test_relationship_checks() {
        let org = OrgSnapshot::new("hr")
            .with_employee(
                EmployeeContext::new("emp-lead", "Team Lead")
                    .with_department("Human Resources")
                    .with_team("people-ops")
                    .with_reports(&["emp-gen"])
                    .with_projects(&["onboarding", "payroll"]),
            )
            .with_employee(
                EmployeeContext::new("emp-gen", "HR Generalist")
                    .with_department("Human Resources")
                    .with_team("people-ops")
                    .with_manager("emp-lead")
                    .with_projects(&["payroll"]),
            )
            .with_employee(
                EmployeeContext::new("emp-eng", "Engineer").with_department("engineering"),
            );

        assert!(org.check_direct_report("emp-lead", "emp-gen", &deadline()).unwrap());
        assert!(!org.check_direct_report("emp-gen", "emp-lead", &deadline()).unwrap());

        let dept = org
            .check_same_department("emp-lead", "emp-gen", &deadline())
            .unwrap()
            .expect("same department");
        assert_eq!(dept.department, "Human Resources");
        assert_eq!(
            dept.classification,
            sentra_types::Classification::Confidential,
            "HR data is confidential by default"
        );
        assert!(
            org.check_same_department("emp-lead", "emp-eng", &deadline())
                .unwrap()
                .is_none()
        );

        assert!(org.check_same_team("emp-lead", "emp-gen", &deadline()).unwrap());

        let shared = org
            .check_shared_project("emp-lead", "emp-gen", &deadline())
            .unwrap();
        assert_eq!(shared.len(), 1, "only payroll is shared");
        assert_eq!(shared[0].project, "payroll");
        assert_eq!(shared[0].data_scope, "confidential");
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .unwrap();
        write!(
            file,
            r#"[
                {{"employee_id": "emp-1", "role": "CEO"}},
                {{"employee_id": "emp-2", "role": "Engineer", "manager_id": "emp-1",
                  "department": "engineering", "clearance": "elevated"}}
            ]"#
        )
        .unwrap();

        let snapshot = OrgSnapshot::load("hr-export", file.path()).unwrap();
        assert_eq!(snapshot.len(), 2);
        let engineer = snapshot.employee_context("emp-2", &deadline()).unwrap();
        assert_eq!(engineer.department.as_deref(), Some("engineering"));
        assert_eq!(engineer.employee_type, "employee", "type defaults to employee");
    }

    #[test]
    fn test_load_missing_file_is_unavailable() {
        let err = OrgSnapshot::load("hr-export", Path::new("/nonexistent/org.json")).unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable { .. }));
        assert!(err.is_transient());
    }
}
