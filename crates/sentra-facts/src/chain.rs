//! Ordered provider fallback.
//!
//! Providers are tried in registration order. A transient failure moves to
//! the next provider; an authoritative `NotFound` stops the chain
//! immediately, since a healthy directory saying "no such employee" must
//! not be second-guessed by a stale fallback.

use tracing::warn;

use crate::error::ProviderError;
use crate::provider::{
    ChainLink, Deadline, DepartmentMatch, EmployeeContext, FactProvider, SharedProject,
};

/// A prioritized list of fact providers queried with fallback.
pub struct ProviderChain {
    providers: Vec<Box<dyn FactProvider>>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Appends a provider at the lowest priority so far.
    pub fn with_provider(mut self, provider: Box<dyn FactProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Fetches an employee record, falling through transient failures.
    ///
    /// Returns the first success, the first `NotFound`, or the last
    /// transient error once every provider has failed.
    pub fn employee_context(
        &self,
        employee_id: &str,
        deadline: &Deadline,
    ) -> Result<EmployeeContext, ProviderError> {
        self.query(deadline, |provider| {
            provider.employee_context(employee_id, deadline)
        })
    }

    /// Management chain lookup with the same fallback semantics.
    pub fn management_chain(
        &self,
        upper: &str,
        lower: &str,
        deadline: &Deadline,
    ) -> Result<ChainLink, ProviderError> {
        self.query(deadline, |provider| {
            provider.management_chain(upper, lower, deadline)
        })
    }

    pub fn check_direct_report(
        &self,
        manager_id: &str,
        report_id: &str,
        deadline: &Deadline,
    ) -> Result<bool, ProviderError> {
        self.query(deadline, |provider| {
            provider.check_direct_report(manager_id, report_id, deadline)
        })
    }

    pub fn check_same_department(
        &self,
        id_a: &str,
        id_b: &str,
        deadline: &Deadline,
    ) -> Result<Option<DepartmentMatch>, ProviderError> {
        self.query(deadline, |provider| {
            provider.check_same_department(id_a, id_b, deadline)
        })
    }

    pub fn check_same_team(
        &self,
        id_a: &str,
        id_b: &str,
        deadline: &Deadline,
    ) -> Result<bool, ProviderError> {
        self.query(deadline, |provider| {
            provider.check_same_team(id_a, id_b, deadline)
        })
    }

    pub fn check_shared_project(
        &self,
        id_a: &str,
        id_b: &str,
        deadline: &Deadline,
    ) -> Result<Vec<SharedProject>, ProviderError> {
        self.query(deadline, |provider| {
            provider.check_shared_project(id_a, id_b, deadline)
        })
    }

    fn query<T>(
        &self,
        deadline: &Deadline,
        mut call: impl FnMut(&dyn FactProvider) -> Result<T, ProviderError>,
    ) -> Result<T, ProviderError> {
        let mut last_error = ProviderError::Cancelled;

        for provider in &self.providers {
            deadline.check()?;
            match call(provider.as_ref()) {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() => {
                    warn!(provider = provider.name(), error = %err, "provider failed, falling through");
                    last_error = err;
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error)
    }
}

impl Default for ProviderChain {
    fn default() -> Self {
        Self::new()
    }
}
