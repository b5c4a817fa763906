//! Risk scoring over an access context.
//!
//! Pure function of the record: a bounded score in `[0, 1]` plus an
//! indicator count. The indicator count maps to an expected risk level
//! which is compared against the declared one; a mismatch is a consistency
//! finding for the caller, never a hard error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use sentra_types::{AccessContext, Classification, RiskLevel, Situation, TemporalContext, TemporalRole};

/// Data types oncall roles are expected to touch.
const ONCALL_DATA_TYPES: [&str; 4] = [
    "incident_data",
    "system_logs",
    "emergency_contacts",
    "critical_systems",
];

/// Data types reserved to department heads among the acting roles.
const HEAD_ONLY_DATA_TYPES: [&str; 2] = ["confidential_hr", "financial_records"];

/// Outcome of one scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Clamped to `[0, 1]`.
    pub risk_score: f64,
    pub indicator_count: u32,
    pub declared_level: RiskLevel,
    /// Level the indicator count maps to.
    pub expected_level: RiskLevel,
}

impl RiskAssessment {
    /// Whether the declared level agrees with the indicators.
    pub fn is_consistent(&self) -> bool {
        self.declared_level == self.expected_level
    }
}

/// Computes risk scores and indicator counts for access contexts.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer;

impl RiskScorer {
    pub fn new() -> Self {
        Self
    }

    /// Scores `ctx` as of `now`.
    pub fn assess(&self, ctx: &AccessContext, now: DateTime<Utc>) -> RiskAssessment {
        let risk_score = self.score(ctx);
        let indicator_count = self.count_indicators(ctx, now);
        let expected_level = RiskLevel::from_indicators(indicator_count);

        debug!(
            node_id = %ctx.node_id,
            risk_score,
            indicator_count,
            declared = %ctx.risk_level,
            expected = %expected_level,
            "risk assessed"
        );

        RiskAssessment {
            risk_score,
            indicator_count,
            declared_level: ctx.risk_level,
            expected_level,
        }
    }

    /// The bounded score: declared base, classification and temporal
    /// adjustments, clamped to `[0, 1]`.
    fn score(&self, ctx: &AccessContext) -> f64 {
        let mut score = ctx.risk_level.base_score();

        score += match ctx.data_classification {
            Classification::Restricted | Classification::Secret | Classification::TopSecret => 0.2,
            Classification::Confidential => 0.1,
            Classification::Public => -0.1,
            Classification::Internal => 0.0,
        };

        if ctx.temporal_context.emergency_override {
            score += 0.15;
        }
        if !ctx.temporal_context.business_hours {
            score += 0.1;
        }

        score.clamp(0.0, 1.0)
    }

    fn count_indicators(&self, ctx: &AccessContext, now: DateTime<Utc>) -> u32 {
        let mut indicators: u32 = 0;

        indicators += match ctx.data_classification {
            Classification::Confidential
            | Classification::Restricted
            | Classification::Secret
            | Classification::TopSecret => 2,
            Classification::Internal => 1,
            Classification::Public => 0,
        };

        if ctx.temporal_context.emergency_override {
            indicators += 2;
        }
        if !ctx.temporal_context.business_hours {
            indicators += 1;
        }
        if ctx.temporal_context.situation == Situation::Emergency {
            indicators += 1;
        }
        if ctx.data_staleness(now).is_some_and(|ratio| ratio > 0.5) {
            indicators += 1;
        }
        if ctx.temporal_context.temporal_role.is_some() {
            indicators += self.temporal_role_indicators(ctx, now);
        }

        indicators
    }

    /// Elevation-driven indicators, floored at zero.
    fn temporal_role_indicators(&self, ctx: &AccessContext, now: DateTime<Utc>) -> u32 {
        let tc = &ctx.temporal_context;
        let Some(role) = tc.temporal_role else {
            return 0;
        };

        let mut adjustment: i32 = match role {
            TemporalRole::OncallLow => 1,
            TemporalRole::OncallMedium => 2,
            TemporalRole::OncallHigh => 3,
            TemporalRole::OncallCritical => 4,
            TemporalRole::ActingManager | TemporalRole::ActingSupervisor => 2,
            TemporalRole::ActingDepartmentHead => 3,
            TemporalRole::IncidentResponder => 1,
            TemporalRole::SecurityIncidentLead => 2,
        };

        if properly_authorized(tc, now) {
            adjustment -= 1;
        } else {
            adjustment += 3;
        }
        if exceeds_scope(ctx) {
            adjustment += 5;
        }
        if tc.role_expired(now) {
            adjustment += 4;
        }

        adjustment.max(0) as u32
    }
}

/// Whether the temporal role grant carries sound provenance.
fn properly_authorized(tc: &TemporalContext, now: DateTime<Utc>) -> bool {
    let Some(role) = tc.temporal_role else {
        return false;
    };
    if tc.authorization_source.as_deref().is_none_or(str::is_empty) {
        return false;
    }
    if role.is_oncall() && tc.emergency_authorization_id.is_none() {
        return false;
    }
    if !tc.permission_inheritance_chain.is_empty() {
        if tc.permission_inheritance_chain.len() < 2 {
            return false;
        }
        // A recorded chain must terminate at the granted role.
        if tc
            .permission_inheritance_chain
            .last()
            .is_none_or(|last| last != role.as_str())
        {
            return false;
        }
    }
    !tc.role_expired(now)
}

/// Whether the temporal role is being used beyond its intended data scope.
fn exceeds_scope(ctx: &AccessContext) -> bool {
    let Some(role) = ctx.temporal_context.temporal_role else {
        return false;
    };

    if role.is_oncall() {
        return !ONCALL_DATA_TYPES.contains(&ctx.data_type.as_str());
    }
    if role.is_acting() && role != TemporalRole::ActingDepartmentHead {
        return HEAD_ONLY_DATA_TYPES.contains(&ctx.data_type.as_str());
    }
    if role.is_incident() {
        let principle = ctx.transmission_principle.to_lowercase();
        return !principle.contains("incident") && !principle.contains("emergency");
    }
    false
}
