//! Typed decision cache over the generic TTL store.
//!
//! Four independent caches, one per lookup category, each with its own TTL
//! and capacity. Keys are hashed composites, so an employee-scoped
//! invalidation keeps a side index from employee id to the hashed keys
//! that mentioned it.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use sentra_cache::{CacheCategory, CacheStats, TtlCache};
use sentra_facts::{ChainLink, Deadline, EmployeeContext, FactProvider, ProviderChain, ProviderError};
use sentra_policy::{Decision, Facts};

/// Per-category stats snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheReport {
    pub employee: CacheStats,
    pub policy: CacheStats,
    pub relationship: CacheStats,
    pub resource: CacheStats,
}

impl CacheReport {
    pub fn total_hits(&self) -> u64 {
        self.employee.hits + self.policy.hits + self.relationship.hits + self.resource.hits
    }

    pub fn total_size(&self) -> usize {
        self.employee.size + self.policy.size + self.relationship.size + self.resource.size
    }
}

/// The engine's cache: employee records, resolved facts, and decisions.
pub struct DecisionCache {
    employees: Mutex<TtlCache<String, EmployeeContext>>,
    decisions: Mutex<TtlCache<String, Decision>>,
    relationships: Mutex<TtlCache<String, Facts>>,
    resources: Mutex<TtlCache<String, Decision>>,
    /// Employee id → hashed keys that involved this employee.
    index: Mutex<HashMap<String, HashSet<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl DecisionCache {
    /// Creates a cache with `capacity` entries per category.
    pub fn new(capacity: usize) -> Self {
        Self {
            employees: Mutex::new(TtlCache::new(capacity)),
            decisions: Mutex::new(TtlCache::new(capacity)),
            relationships: Mutex::new(TtlCache::new(capacity)),
            resources: Mutex::new(TtlCache::new(capacity)),
            index: Mutex::new(HashMap::new()),
        }
    }

    // ------------------------------------------------------------------
    // Employee records
    // ------------------------------------------------------------------

    pub fn get_employee(&self, employee_id: &str) -> Option<EmployeeContext> {
        lock(&self.employees).get(&employee_id.to_string())
    }

    pub fn put_employee(&self, record: &EmployeeContext) {
        lock(&self.employees).set(
            record.employee_id.clone(),
            record.clone(),
            CacheCategory::EmployeeContext.ttl(),
        );
    }

    // ------------------------------------------------------------------
    // Resolved facts
    // ------------------------------------------------------------------

    pub fn get_facts(&self, key: &str) -> Option<Facts> {
        lock(&self.relationships).get(&key.to_string())
    }

    pub fn put_facts(&self, key: &str, facts: &Facts, touched: &[&str]) {
        lock(&self.relationships).set(
            key.to_string(),
            facts.clone(),
            CacheCategory::Relationship.ttl(),
        );
        self.index_key(key, touched);
    }

    // ------------------------------------------------------------------
    // Decisions
    // ------------------------------------------------------------------

    pub fn get_decision(&self, key: &str) -> Option<Decision> {
        lock(&self.decisions).get(&key.to_string())
    }

    pub fn put_decision(&self, key: &str, decision: &Decision, touched: &[&str]) {
        lock(&self.decisions).set(
            key.to_string(),
            decision.clone(),
            CacheCategory::PolicyResult.ttl(),
        );
        self.index_key(key, touched);
    }

    pub fn get_resource_decision(&self, key: &str) -> Option<Decision> {
        lock(&self.resources).get(&key.to_string())
    }

    pub fn put_resource_decision(&self, key: &str, decision: &Decision, touched: &[&str]) {
        lock(&self.resources).set(
            key.to_string(),
            decision.clone(),
            CacheCategory::ResourceAccess.ttl(),
        );
        self.index_key(key, touched);
    }

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Drops every cached entry that involved `employee_id`, returning how
    /// many entries were removed.
    pub fn invalidate_employee(&self, employee_id: &str) -> usize {
        let mut removed = usize::from(lock(&self.employees).remove(&employee_id.to_string()));

        let keys = lock(&self.index).remove(employee_id).unwrap_or_default();
        for key in keys {
            removed += usize::from(lock(&self.decisions).remove(&key));
            removed += usize::from(lock(&self.relationships).remove(&key));
            removed += usize::from(lock(&self.resources).remove(&key));
        }

        debug!(employee_id, removed, "employee cache entries invalidated");
        removed
    }

    /// Sweeps expired entries across all categories.
    pub fn cleanup_expired(&self) -> usize {
        lock(&self.employees).cleanup_expired()
            + lock(&self.decisions).cleanup_expired()
            + lock(&self.relationships).cleanup_expired()
            + lock(&self.resources).cleanup_expired()
    }

    pub fn stats(&self) -> CacheReport {
        CacheReport {
            employee: lock(&self.employees).stats(),
            policy: lock(&self.decisions).stats(),
            relationship: lock(&self.relationships).stats(),
            resource: lock(&self.resources).stats(),
        }
    }

    fn index_key(&self, key: &str, touched: &[&str]) {
        let mut index = lock(&self.index);
        for employee_id in touched {
            index
                .entry((*employee_id).to_string())
                .or_default()
                .insert(key.to_string());
        }
    }
}

/// Provider wrapper that serves employee records from the cache.
///
/// Management chain lookups pass through uncached: chains are cheap against
/// the snapshot and directional, so caching them buys little.
pub struct CachingProvider {
    inner: ProviderChain,
    cache: Arc<DecisionCache>,
}

impl CachingProvider {
    pub fn new(inner: ProviderChain, cache: Arc<DecisionCache>) -> Self {
        Self { inner, cache }
    }
}

impl FactProvider for CachingProvider {
    fn name(&self) -> &str {
        "caching-directory"
    }

    fn employee_context(
        &self,
        employee_id: &str,
        deadline: &Deadline,
    ) -> Result<EmployeeContext, ProviderError> {
        if let Some(record) = self.cache.get_employee(employee_id) {
            return Ok(record);
        }
        let record = self.inner.employee_context(employee_id, deadline)?;
        self.cache.put_employee(&record);
        Ok(record)
    }

    fn management_chain(
        &self,
        upper: &str,
        lower: &str,
        deadline: &Deadline,
    ) -> Result<ChainLink, ProviderError> {
        self.inner.management_chain(upper, lower, deadline)
    }
}
