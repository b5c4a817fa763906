//! The access decision engine.
//!
//! One evaluation pass per request: check the decision cache, resolve
//! facts for the requester/target pair, run contradiction precedence when
//! a mission phase is declared, then evaluate the rule set. Every decision
//! carries its reason, audit factors, and timing.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Datelike, Utc, Weekday};
use tracing::{debug, info, warn};

use sentra_cache::composite_key;
use sentra_facts::{FactResolver, ProviderChain, ResolveError};
use sentra_policy::{
    ContradictionResolver, ContradictionType, Decision, Resolution, RuleStore, TimePeriod,
    evaluate, try_load_rules,
};
use sentra_temporal::{RiskAssessment, RiskScorer, RoleValidator, ValidationReport};
use sentra_types::{AccessContext, Classification, TemporalContext, TemporalRole};

use crate::cache::{CacheReport, CachingProvider, DecisionCache};
use crate::config::EngineConfig;
use crate::error::EngineError;

// ============================================================================
// Request
// ============================================================================

/// One access request as presented to the engine.
#[derive(Debug, Clone)]
pub struct AccessRequest {
    pub requester_id: String,
    pub target_id: String,
    pub resource_type: String,
    pub action: String,
    pub classification: Option<Classification>,
    /// Declared operational phase; engages contradiction precedence.
    pub mission_phase: Option<String>,
    pub temporal: TemporalContext,
}

impl AccessRequest {
    pub fn new(requester_id: &str, target_id: &str, resource_type: &str, action: &str) -> Self {
        Self {
            requester_id: requester_id.to_string(),
            target_id: target_id.to_string(),
            resource_type: resource_type.to_string(),
            action: action.to_string(),
            classification: None,
            mission_phase: None,
            temporal: TemporalContext::now(),
        }
    }

    /// Evaluates the request as of a fixed timestamp instead of now.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.temporal = TemporalContext::at(timestamp);
        self
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = Some(classification);
        self
    }

    pub fn with_mission_phase(mut self, phase: &str) -> Self {
        self.mission_phase = Some(phase.to_string());
        self
    }

    pub fn with_temporal(mut self, temporal: TemporalContext) -> Self {
        self.temporal = temporal;
        self
    }
}

/// Buckets a temporal context into the restriction table's time periods.
fn time_period(temporal: &TemporalContext) -> TimePeriod {
    match temporal.timestamp.weekday() {
        Weekday::Sat | Weekday::Sun => TimePeriod::Weekend,
        _ if temporal.business_hours => TimePeriod::BusinessHours,
        _ => TimePeriod::OffHours,
    }
}

/// Temporal-role key parts shared by the decision and facts keys.
///
/// A request holding an acting or oncall grant must never share a cache
/// entry with the same pair carrying no grant, so the role name, its
/// validity bound, and authorization presence all go into the key.
fn role_key_parts(temporal: &TemporalContext) -> [String; 3] {
    [
        temporal
            .temporal_role
            .map_or("-", TemporalRole::as_str)
            .to_string(),
        temporal
            .temporal_role_valid_until
            .map_or_else(|| "-".to_string(), |until| until.timestamp().to_string()),
        if temporal.authorization_source.is_some() {
            "auth".to_string()
        } else {
            "-".to_string()
        },
    ]
}

/// Cache key for a full decision: every evaluation argument, canonically
/// ordered.
fn decision_key(request: &AccessRequest, period: TimePeriod) -> String {
    let temporal = &request.temporal;
    let [role, valid_until, authorized] = role_key_parts(temporal);
    composite_key(&[
        &request.requester_id,
        &request.target_id,
        &request.resource_type,
        &request.action,
        request.classification.map_or("-", Classification::as_str),
        request.mission_phase.as_deref().unwrap_or("-"),
        period.as_str(),
        if temporal.in_emergency_context() { "em" } else { "-" },
        if temporal.emergency_override { "ov" } else { "-" },
        &role,
        &valid_until,
        &authorized,
    ])
}

/// Cache key for resolved facts: everything fact derivation reads.
fn facts_key(request: &AccessRequest) -> String {
    let temporal = &request.temporal;
    let [role, valid_until, authorized] = role_key_parts(temporal);
    composite_key(&[
        &request.requester_id,
        &request.target_id,
        request.classification.map_or("-", Classification::as_str),
        if temporal.business_hours { "bh" } else { "-" },
        if temporal.in_emergency_context() { "em" } else { "-" },
        &role,
        &valid_until,
        &authorized,
    ])
}

// ============================================================================
// Engine
// ============================================================================

/// Context-aware access decision engine.
///
/// Holds the fact resolver, the rule store, the contradiction tables, the
/// temporal role validator, and the decision cache. `Send + Sync`; one
/// instance serves a whole process.
pub struct AccessEngine {
    resolver: FactResolver,
    rules: RuleStore,
    contradictions: ContradictionResolver,
    validator: RoleValidator,
    scorer: RiskScorer,
    cache: Arc<DecisionCache>,
}

impl AccessEngine {
    /// Builds an engine over the given provider chain.
    ///
    /// Loads the rule file named by the config, or falls back to the
    /// baseline rule set when none is configured.
    ///
    /// # Errors
    ///
    /// [`EngineError::Policy`] when a configured rule file fails to load or
    /// validate.
    pub fn new(providers: ProviderChain, config: EngineConfig) -> Result<Self, EngineError> {
        let rules = match &config.rules_path {
            Some(path) => RuleStore::new(try_load_rules(path)?),
            None => RuleStore::baseline(),
        };

        let cache = Arc::new(DecisionCache::new(config.max_cache_entries));
        let caching = CachingProvider::new(providers, Arc::clone(&cache));
        let resolver = FactResolver::new(ProviderChain::new().with_provider(Box::new(caching)))
            .with_budget(config.provider_budget);

        info!(
            rules = rules.snapshot().len(),
            cache_capacity = config.max_cache_entries,
            "access engine initialized"
        );

        Ok(Self {
            resolver,
            rules,
            contradictions: ContradictionResolver::standard(),
            validator: RoleValidator::new(),
            scorer: RiskScorer::new(),
            cache,
        })
    }

    /// Replaces the contradiction tables.
    pub fn with_contradictions(mut self, contradictions: ContradictionResolver) -> Self {
        self.contradictions = contradictions;
        self
    }

    /// Replaces the temporal role validator.
    pub fn with_validator(mut self, validator: RoleValidator) -> Self {
        self.validator = validator;
        self
    }

    // ------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------

    /// Decides one access request.
    ///
    /// Never fails: unresolvable entities produce a hard deny decision and
    /// directory outages produce degraded-mode decisions.
    pub fn evaluate_access(&self, request: &AccessRequest) -> Decision {
        let started = Instant::now();
        let temporal = &request.temporal;
        let period = time_period(temporal);

        let decision_key = decision_key(request, period);
        if let Some(hit) = self.cache.get_decision(&decision_key) {
            debug!(requester = %request.requester_id, target = %request.target_id, "decision served from cache");
            return hit;
        }
        // Contradiction outcomes also land in the resource-access cache,
        // which outlives the policy TTL.
        if request.mission_phase.is_some() {
            if let Some(hit) = self.cache.get_resource_decision(&decision_key) {
                debug!(requester = %request.requester_id, target = %request.target_id, "decision served from resource cache");
                return hit;
            }
        }

        // Resolve facts, consulting the relationship cache first.
        let facts_key = facts_key(request);
        let facts = match self.cache.get_facts(&facts_key) {
            Some(facts) => facts,
            None => {
                let outcome = match self.resolver.resolve(
                    &request.requester_id,
                    &request.target_id,
                    temporal,
                    request.classification,
                ) {
                    Ok(outcome) => outcome,
                    Err(ResolveError::EntityNotFound(id)) => {
                        warn!(entity = %id, "access denied for unresolvable entity");
                        return Decision::entity_not_found(&id);
                    }
                };
                let degraded = outcome.is_degraded();
                let facts = outcome.into_facts();
                if !degraded {
                    self.cache.put_facts(
                        &facts_key,
                        &facts,
                        &[&request.requester_id, &request.target_id],
                    );
                }
                facts
            }
        };

        // A declared mission phase engages contradiction precedence; only
        // an all-clear falls through to relationship rules.
        if let Some(phase) = &request.mission_phase {
            let classification = request.classification.unwrap_or_default();
            let resolution = self.contradictions.resolve(
                !facts.insufficient_clearance,
                classification,
                phase,
                period,
                temporal.emergency_override,
            );
            if resolution.contradiction != ContradictionType::None {
                let decision =
                    decision_from_resolution(&resolution, facts.degraded_mode, started);
                if !facts.degraded_mode {
                    self.cache.put_resource_decision(
                        &decision_key,
                        &decision,
                        &[&request.requester_id, &request.target_id],
                    );
                    self.cache.put_decision(
                        &decision_key,
                        &decision,
                        &[&request.requester_id, &request.target_id],
                    );
                }
                return decision;
            }
        }

        let decision = evaluate(&self.rules.snapshot(), &facts);
        debug!(
            requester = %request.requester_id,
            target = %request.target_id,
            effect = ?decision.effect,
            reason = %decision.reason,
            "access evaluated"
        );

        if !decision.degraded_mode {
            self.cache.put_decision(
                &decision_key,
                &decision,
                &[&request.requester_id, &request.target_id],
            );
        }
        decision
    }

    /// Validates the temporal role grant on a context, as of the context's
    /// own timestamp.
    pub fn validate_temporal_role(&self, ctx: &AccessContext) -> ValidationReport {
        self.validator
            .validate(&ctx.temporal_context, ctx.temporal_context.timestamp)
    }

    /// Scores an access context's risk as of its own timestamp.
    pub fn assess_risk(&self, ctx: &AccessContext) -> RiskAssessment {
        self.scorer.assess(ctx, ctx.temporal_context.timestamp)
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    /// Replaces the active rule set from a file.
    ///
    /// Cached decisions made under the old rules age out within the policy
    /// cache TTL; nothing is retroactively revoked.
    pub fn reload_rules(&self, path: &Path) -> Result<usize, EngineError> {
        let rules = try_load_rules(path)?;
        let count = rules.len();
        self.rules.replace(rules);
        info!(count, path = %path.display(), "rule set reloaded");
        Ok(count)
    }

    /// Drops every cached entry involving an employee, for use when the
    /// directory pushes an org change.
    pub fn invalidate_employee(&self, employee_id: &str) -> usize {
        self.cache.invalidate_employee(employee_id)
    }

    pub fn cleanup_cache(&self) -> usize {
        self.cache.cleanup_expired()
    }

    pub fn cache_stats(&self) -> CacheReport {
        self.cache.stats()
    }
}

/// Maps a contradiction resolution onto the decision vocabulary.
fn decision_from_resolution(
    resolution: &Resolution,
    degraded_mode: bool,
    started: Instant,
) -> Decision {
    let confidence = match resolution.contradiction {
        ContradictionType::EmergencyOverride | ContradictionType::Override => 0.95,
        _ => 0.9,
    };
    let mut factors = vec![format!("contradiction:{}", resolution.contradiction.as_str())];
    if resolution.signals.clearance_sufficient {
        factors.push("clearance_sufficient".to_string());
    }
    if resolution.signals.emergency_phase {
        factors.push("emergency_phase".to_string());
    }

    Decision {
        effect: resolution.effect,
        reason: resolution.reason.clone(),
        confidence,
        factors,
        rules_applied: Vec::new(),
        response_time: started.elapsed(),
        degraded_mode,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, TimeZone};

    use sentra_facts::{EmployeeContext, OrgSnapshot};
    use sentra_policy::Effect;

    use super::*;

    #[test]
    fn test_time_period_buckets() {
        // Monday noon.
        let weekday = TemporalContext::at(Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap());
        assert_eq!(time_period(&weekday), TimePeriod::BusinessHours);

        // Monday 22:00.
        let night = TemporalContext::at(Utc.with_ymd_and_hms(2026, 3, 2, 22, 0, 0).unwrap());
        assert_eq!(time_period(&night), TimePeriod::OffHours);

        // Saturday noon.
        let saturday = TemporalContext::at(Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap());
        assert_eq!(time_period(&saturday), TimePeriod::Weekend);
    }

    #[test]
    fn test_keys_separate_temporal_role_state() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        let plain = AccessRequest::new("emp-1", "emp-2", "employee_record", "read").at(at);
        let granted = AccessRequest::new("emp-1", "emp-2", "employee_record", "read")
            .with_temporal(
                TemporalContext::at(at)
                    .with_temporal_role(TemporalRole::ActingManager, "team_lead")
                    .with_authorization_source("delegation_system")
                    .with_valid_until(at + ChronoDuration::hours(8)),
            );

        let period = time_period(&plain.temporal);
        assert_ne!(
            decision_key(&plain, period),
            decision_key(&granted, period),
            "an acting-role grant must not share a decision entry"
        );
        assert_ne!(
            facts_key(&plain),
            facts_key(&granted),
            "role-dependent facts must not share a relationship entry"
        );
    }

    #[test]
    fn test_resource_cache_serves_contradiction_decision() {
        let org = OrgSnapshot::new("unit")
            .with_employee(EmployeeContext::new("emp-vp", "VP of Engineering"))
            .with_employee(EmployeeContext::new("emp-ic", "Software Engineer"));
        let chain = sentra_facts::ProviderChain::new().with_provider(Box::new(org));
        let engine = AccessEngine::new(chain, EngineConfig::default()).unwrap();

        let request = AccessRequest::new("emp-vp", "emp-ic", "employee_record", "read")
            .at(Utc.with_ymd_and_hms(2026, 3, 2, 22, 0, 0).unwrap())
            .with_classification(Classification::Confidential)
            .with_mission_phase("pre_deployment");
        let key = decision_key(&request, time_period(&request.temporal));

        let seeded = Decision {
            effect: Effect::Deny,
            reason: "seeded resource entry".to_string(),
            confidence: 0.9,
            factors: vec!["contradiction:time_restriction".to_string()],
            rules_applied: Vec::new(),
            response_time: std::time::Duration::ZERO,
            degraded_mode: false,
        };
        engine
            .cache
            .put_resource_decision(&key, &seeded, &["emp-vp", "emp-ic"]);

        let decision = engine.evaluate_access(&request);
        assert_eq!(decision, seeded, "resource entry must short-circuit evaluation");
        assert_eq!(engine.cache_stats().resource.hits, 1);
    }

    #[test]
    fn test_request_builder() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        let request = AccessRequest::new("emp-1", "emp-2", "employee_record", "read")
            .at(at)
            .with_classification(Classification::Confidential)
            .with_mission_phase("routine");
        assert_eq!(request.temporal.timestamp, at);
        assert!(request.temporal.business_hours);
        assert_eq!(request.classification, Some(Classification::Confidential));
        assert_eq!(request.mission_phase.as_deref(), Some("routine"));
    }
}
