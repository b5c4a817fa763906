//! Temporal role inheritance validation.
//!
//! Per-evaluation state machine: `NoRole → Checking → Valid | Invalid`.
//! Nothing is persisted; every call starts fresh from the supplied context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sentra_types::{TemporalContext, TemporalRole};

use crate::inheritance::{expected_chain, inheritance_rule};

/// Grants longer than this draw a non-blocking warning.
const RECOMMENDED_GRANT_HOURS: i64 = 8;

// ============================================================================
// Report
// ============================================================================

/// Where the validation state machine ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    /// No temporal role present; nothing to check.
    NoRole,
    /// Mid-validation. Never escapes this module.
    Checking,
    Valid,
    Invalid,
}

/// Structured outcome of one validation run.
///
/// Errors block (the grant must not be honored); warnings never do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub state: ValidationState,
    pub validation_errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Best-effort organizational context attached by the enricher.
    pub org_context: Option<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        matches!(self.state, ValidationState::NoRole | ValidationState::Valid)
    }
}

// ============================================================================
// Extension points
// ============================================================================

/// Scope predicate for acting-manager grants.
///
/// Extension point: production deployments plug in a check against the
/// delegated team's actual resources. The default accepts everything.
pub trait ScopeCheck {
    fn within_scope(&self, ctx: &TemporalContext) -> bool;
}

/// Default scope check that accepts all acting-manager usage.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveScope;

impl ScopeCheck for PermissiveScope {
    fn within_scope(&self, _ctx: &TemporalContext) -> bool {
        true
    }
}

/// Best-effort organizational enrichment.
///
/// Failures are logged and swallowed; enrichment can never change the
/// validation outcome.
pub trait OrgEnricher {
    fn organizational_context(&self, base_role: &str) -> Result<String, String>;
}

// ============================================================================
// Validator
// ============================================================================

/// Validates temporal role grants against the inheritance table.
pub struct RoleValidator {
    scope: Box<dyn ScopeCheck + Send + Sync>,
    enricher: Option<Box<dyn OrgEnricher + Send + Sync>>,
}

impl Default for RoleValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleValidator {
    pub fn new() -> Self {
        Self {
            scope: Box::new(PermissiveScope),
            enricher: None,
        }
    }

    pub fn with_scope_check(mut self, scope: impl ScopeCheck + Send + Sync + 'static) -> Self {
        self.scope = Box::new(scope);
        self
    }

    pub fn with_enricher(mut self, enricher: impl OrgEnricher + Send + Sync + 'static) -> Self {
        self.enricher = Some(Box::new(enricher));
        self
    }

    /// Runs the full check list against `ctx` as of `now`.
    pub fn validate(&self, ctx: &TemporalContext, now: DateTime<Utc>) -> ValidationReport {
        let Some(role) = ctx.temporal_role else {
            return ValidationReport {
                state: ValidationState::NoRole,
                validation_errors: Vec::new(),
                warnings: vec!["no temporal role to validate".to_string()],
                org_context: None,
            };
        };

        let mut report = ValidationReport {
            state: ValidationState::Checking,
            validation_errors: Vec::new(),
            warnings: Vec::new(),
            org_context: None,
        };

        self.check_expiry(ctx, role, now, &mut report);
        self.check_eligibility(ctx, role, &mut report);
        self.check_chain(ctx, role, &mut report);
        if role.is_oncall() {
            self.check_oncall(ctx, role, &mut report);
        }
        if role.is_acting() {
            self.check_acting(ctx, role, &mut report);
        }
        self.check_duration(ctx, role, &mut report);
        self.enrich(ctx, &mut report);

        report.state = if report.validation_errors.is_empty() {
            ValidationState::Valid
        } else {
            ValidationState::Invalid
        };
        debug!(
            role = %role,
            state = ?report.state,
            errors = report.validation_errors.len(),
            "temporal role validated"
        );
        report
    }

    fn check_expiry(
        &self,
        ctx: &TemporalContext,
        role: TemporalRole,
        now: DateTime<Utc>,
        report: &mut ValidationReport,
    ) {
        if let Some(until) = ctx.temporal_role_valid_until
            && now > until
        {
            report
                .validation_errors
                .push(format!("temporal role '{role}' expired at {until}"));
        }
    }

    fn check_eligibility(
        &self,
        ctx: &TemporalContext,
        role: TemporalRole,
        report: &mut ValidationReport,
    ) {
        let Some(base_role) = &ctx.base_role else {
            report
                .validation_errors
                .push(format!("temporal role '{role}' has no base role"));
            return;
        };
        let rule = inheritance_rule(role);
        if !rule
            .eligible_base_roles
            .iter()
            .any(|eligible| eligible.eq_ignore_ascii_case(base_role))
        {
            report.validation_errors.push(format!(
                "base role '{base_role}' is not eligible for temporal role '{role}'"
            ));
        }
    }

    fn check_chain(&self, ctx: &TemporalContext, role: TemporalRole, report: &mut ValidationReport) {
        if ctx.permission_inheritance_chain.is_empty() {
            return;
        }
        let Some(base_role) = &ctx.base_role else {
            return;
        };
        let expected = expected_chain(base_role, role);
        if ctx.permission_inheritance_chain != expected {
            report.validation_errors.push(format!(
                "inheritance chain {:?} does not match expected {:?}",
                ctx.permission_inheritance_chain, expected
            ));
        }
    }

    fn check_oncall(
        &self,
        ctx: &TemporalContext,
        role: TemporalRole,
        report: &mut ValidationReport,
    ) {
        if !ctx.in_emergency_context() {
            report.validation_errors.push(format!(
                "oncall role '{role}' used outside an emergency context"
            ));
        }
        if ctx
            .emergency_authorization_id
            .as_deref()
            .is_none_or(str::is_empty)
        {
            report.validation_errors.push(format!(
                "oncall role '{role}' requires an emergency authorization id"
            ));
        }
        // Tier hierarchy: a higher tier's recorded chain carries every
        // lower tier. The exact-equality chain check already guarantees
        // this when a chain is supplied; this names the missing tier when
        // the chain was built by hand.
        if !ctx.permission_inheritance_chain.is_empty() {
            for lower in lower_oncall_tiers(role) {
                if !ctx
                    .permission_inheritance_chain
                    .iter()
                    .any(|c| c == lower)
                {
                    report.validation_errors.push(format!(
                        "oncall chain for '{role}' is missing lower tier '{lower}'"
                    ));
                }
            }
        }
    }

    fn check_acting(
        &self,
        ctx: &TemporalContext,
        role: TemporalRole,
        report: &mut ValidationReport,
    ) {
        if ctx
            .authorization_source
            .as_deref()
            .is_none_or(str::is_empty)
        {
            report.validation_errors.push(format!(
                "acting role '{role}' requires an authorization source"
            ));
        }
        if ctx.temporal_role_valid_until.is_none() {
            report.validation_errors.push(format!(
                "acting role '{role}' requires a bounded validity period"
            ));
        }
        if role == TemporalRole::ActingManager && !self.scope.within_scope(ctx) {
            report.validation_errors.push(
                "acting_manager grant used outside its delegated scope".to_string(),
            );
        }
    }

    fn check_duration(
        &self,
        ctx: &TemporalContext,
        role: TemporalRole,
        report: &mut ValidationReport,
    ) {
        let Some(until) = ctx.temporal_role_valid_until else {
            return;
        };
        let duration = until - ctx.timestamp;
        let rule = inheritance_rule(role);
        if duration > rule.max_duration {
            report.validation_errors.push(format!(
                "grant duration {}h exceeds the {}h maximum for '{role}'",
                duration.num_hours(),
                rule.max_duration.num_hours()
            ));
        } else if duration > chrono::Duration::hours(RECOMMENDED_GRANT_HOURS)
            && !role.is_acting()
        {
            report.warnings.push(format!(
                "grant duration {}h exceeds the recommended {RECOMMENDED_GRANT_HOURS}h ceiling",
                duration.num_hours()
            ));
        }
    }

    fn enrich(&self, ctx: &TemporalContext, report: &mut ValidationReport) {
        let Some(enricher) = &self.enricher else {
            return;
        };
        let Some(base_role) = &ctx.base_role else {
            return;
        };
        match enricher.organizational_context(base_role) {
            Ok(org_context) => report.org_context = Some(org_context),
            Err(e) => {
                // Enrichment is best-effort and must never fail validation.
                warn!(error = %e, "org enrichment failed");
            }
        }
    }
}

/// Oncall tiers strictly below `role`, in escalation order.
fn lower_oncall_tiers(role: TemporalRole) -> &'static [&'static str] {
    match role {
        TemporalRole::OncallMedium => &["oncall_low"],
        TemporalRole::OncallHigh => &["oncall_low", "oncall_medium"],
        TemporalRole::OncallCritical => &["oncall_low", "oncall_medium", "oncall_high"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use sentra_types::Situation;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap()
    }

    fn emergency_oncall(base: &str, role: TemporalRole) -> TemporalContext {
        TemporalContext::at(now())
            .with_situation(Situation::Emergency)
            .with_temporal_role(role, base)
            .with_emergency_authorization("EMRG-2210")
            .with_valid_until(now() + Duration::hours(6))
    }

    #[test]
    fn test_no_role_is_valid_with_warning() {
        let report = RoleValidator::new().validate(&TemporalContext::at(now()), now());
        assert_eq!(report.state, ValidationState::NoRole);
        assert!(report.is_valid());
        assert_eq!(report.warnings, vec!["no temporal role to validate"]);
    }

    #[test]
    fn test_nurse_cannot_hold_oncall_critical() {
        let ctx = emergency_oncall("nurse", TemporalRole::OncallCritical);
        let report = RoleValidator::new().validate(&ctx, now());
        assert_eq!(report.state, ValidationState::Invalid);
        assert!(
            report
                .validation_errors
                .iter()
                .any(|e| e.contains("not eligible")),
            "expected eligibility error, got {:?}",
            report.validation_errors
        );
    }

    #[test]
    fn test_attending_physician_oncall_critical_valid() {
        let ctx = emergency_oncall("attending_physician", TemporalRole::OncallCritical)
            .with_inheritance_chain(vec![
                "attending_physician".to_string(),
                "oncall_low".to_string(),
                "oncall_medium".to_string(),
                "oncall_high".to_string(),
            ]);
        let report = RoleValidator::new().validate(&ctx, now());
        assert!(
            report.is_valid(),
            "expected valid, errors: {:?}",
            report.validation_errors
        );
        assert_eq!(report.state, ValidationState::Valid);
    }

    #[test]
    fn test_expired_role_is_invalid() {
        let mut ctx = emergency_oncall("attending_physician", TemporalRole::OncallHigh);
        ctx.temporal_role_valid_until = Some(now() - Duration::hours(1));
        let report = RoleValidator::new().validate(&ctx, now());
        assert!(
            report
                .validation_errors
                .iter()
                .any(|e| e.contains("expired")),
            "got {:?}",
            report.validation_errors
        );
    }

    #[test]
    fn test_chain_mismatch_is_order_sensitive() {
        let ctx = emergency_oncall("attending_physician", TemporalRole::OncallHigh)
            .with_inheritance_chain(vec![
                "attending_physician".to_string(),
                "oncall_medium".to_string(),
                "oncall_low".to_string(),
            ]);
        let report = RoleValidator::new().validate(&ctx, now());
        assert!(
            report
                .validation_errors
                .iter()
                .any(|e| e.contains("does not match expected")),
            "reordered chain must fail: {:?}",
            report.validation_errors
        );
    }

    #[test]
    fn test_oncall_outside_emergency_context_rejected() {
        let ctx = TemporalContext::at(now())
            .with_temporal_role(TemporalRole::OncallLow, "nurse")
            .with_valid_until(now() + Duration::hours(4));
        let report = RoleValidator::new().validate(&ctx, now());
        assert!(report.validation_errors.iter().any(|e| e.contains("outside an emergency")));
        assert!(report.validation_errors.iter().any(|e| e.contains("authorization id")));
    }

    #[test]
    fn test_acting_role_requires_provenance_and_bound() {
        let ctx = TemporalContext::at(now())
            .with_temporal_role(TemporalRole::ActingManager, "team_lead");
        let report = RoleValidator::new().validate(&ctx, now());
        assert!(report.validation_errors.iter().any(|e| e.contains("authorization source")));
        assert!(report.validation_errors.iter().any(|e| e.contains("bounded validity")));
    }

    #[test]
    fn test_valid_acting_manager() {
        let ctx = TemporalContext::at(now())
            .with_temporal_role(TemporalRole::ActingManager, "team_lead")
            .with_authorization_source("hr_delegation_system")
            .with_valid_until(now() + Duration::hours(72));
        let report = RoleValidator::new().validate(&ctx, now());
        assert!(report.is_valid(), "errors: {:?}", report.validation_errors);
    }

    #[test]
    fn test_scope_check_blocks_acting_manager() {
        struct DenyAll;
        impl ScopeCheck for DenyAll {
            fn within_scope(&self, _ctx: &TemporalContext) -> bool {
                false
            }
        }

        let ctx = TemporalContext::at(now())
            .with_temporal_role(TemporalRole::ActingManager, "team_lead")
            .with_authorization_source("hr_delegation_system")
            .with_valid_until(now() + Duration::hours(24));
        let report = RoleValidator::new()
            .with_scope_check(DenyAll)
            .validate(&ctx, now());
        assert!(report.validation_errors.iter().any(|e| e.contains("delegated scope")));
    }

    #[test]
    fn test_long_oncall_grant_warns_but_passes() {
        let ctx = emergency_oncall("attending_physician", TemporalRole::OncallHigh)
            .with_valid_until(now() + Duration::hours(11));
        let report = RoleValidator::new().validate(&ctx, now());
        assert!(report.is_valid(), "errors: {:?}", report.validation_errors);
        assert!(
            report.warnings.iter().any(|w| w.contains("recommended")),
            "11h grant should warn: {:?}",
            report.warnings
        );
    }

    #[test]
    fn test_grant_beyond_table_maximum_fails() {
        let ctx = emergency_oncall("attending_physician", TemporalRole::OncallCritical)
            .with_valid_until(now() + Duration::hours(20));
        let report = RoleValidator::new().validate(&ctx, now());
        assert!(
            report.validation_errors.iter().any(|e| e.contains("maximum")),
            "20h exceeds the 8h cap for oncall_critical: {:?}",
            report.validation_errors
        );
    }

    #[test]
    fn test_enrichment_failure_is_swallowed() {
        struct FailingEnricher;
        impl OrgEnricher for FailingEnricher {
            fn organizational_context(&self, _base_role: &str) -> Result<String, String> {
                Err("directory unavailable".to_string())
            }
        }

        let ctx = emergency_oncall("attending_physician", TemporalRole::OncallHigh);
        let report = RoleValidator::new()
            .with_enricher(FailingEnricher)
            .validate(&ctx, now());
        assert!(report.is_valid(), "enrichment failure must not invalidate");
        assert_eq!(report.org_context, None);
    }

    #[test]
    fn test_enrichment_attaches_context() {
        struct StaticEnricher;
        impl OrgEnricher for StaticEnricher {
            fn organizational_context(&self, base_role: &str) -> Result<String, String> {
                Ok(format!("{base_role}: cardiology, day shift"))
            }
        }

        let ctx = emergency_oncall("attending_physician", TemporalRole::OncallHigh);
        let report = RoleValidator::new()
            .with_enricher(StaticEnricher)
            .validate(&ctx, now());
        assert_eq!(
            report.org_context.as_deref(),
            Some("attending_physician: cardiology, day shift")
        );
    }
}
