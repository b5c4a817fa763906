//! Contradiction resolution across competing restriction classes.
//!
//! A request can be governed by several independently-true signals at once:
//! the requester's clearance says allow, the off-hours rule says deny, the
//! mission phase says deny, an emergency says allow. Resolution applies a
//! fixed precedence order rather than an unordered rule bag:
//!
//! 1. Emergency mission phase — always ALLOW
//! 2. Explicit override permission — ALLOW
//! 3. Time-based restriction — DENY, tagged `ClearanceVsTime` when the
//!    requester's clearance would otherwise have sufficed
//! 4. Insufficient clearance — DENY
//! 5. Mission-phase restriction for the classification — DENY
//! 6. Otherwise ALLOW
//!
//! The order is a behavioral invariant: reordering the checks changes the
//! system's answers, so they are written as an explicit sequence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use sentra_types::Classification;

use crate::rule::Effect;

// ============================================================================
// Vocabulary
// ============================================================================

/// Which contradiction (if any) the resolution encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionType {
    None,
    /// Clearance sufficed but a time restriction denied anyway.
    ClearanceVsTime,
    ClearanceInsufficient,
    TimeRestriction,
    Override,
    EmergencyOverride,
    EmergencyDenied,
}

impl ContradictionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContradictionType::None => "none",
            ContradictionType::ClearanceVsTime => "clearance_vs_time",
            ContradictionType::ClearanceInsufficient => "clearance_insufficient",
            ContradictionType::TimeRestriction => "time_restriction",
            ContradictionType::Override => "override",
            ContradictionType::EmergencyOverride => "emergency_override",
            ContradictionType::EmergencyDenied => "emergency_denied",
        }
    }
}

/// What a phase or time table says about a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhaseAccess {
    Allow,
    AllowWithClearance,
    /// Unknown phases and classifications resolve here.
    #[default]
    Block,
}

impl PhaseAccess {
    fn permits(self) -> bool {
        matches!(self, PhaseAccess::Allow | PhaseAccess::AllowWithClearance)
    }
}

/// Coarse time-of-day buckets restrictions are keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePeriod {
    BusinessHours,
    OffHours,
    Weekend,
}

impl TimePeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            TimePeriod::BusinessHours => "business_hours",
            TimePeriod::OffHours => "off_hours",
            TimePeriod::Weekend => "weekend",
        }
    }
}

/// The independently-evaluated signals feeding precedence resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSet {
    pub clearance_sufficient: bool,
    pub mission_phase_allows: bool,
    pub time_allows: bool,
    pub override_applies: bool,
    pub emergency_phase: bool,
}

/// Outcome of contradiction resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub effect: Effect,
    pub reason: String,
    pub contradiction: ContradictionType,
    pub signals: SignalSet,
}

impl Resolution {
    pub fn is_allowed(&self) -> bool {
        self.effect == Effect::Allow
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Restriction tables plus the precedence logic that resolves them.
///
/// Tables are keyed by mission phase name (free-form, config-driven) and
/// classification; anything not present resolves to `Block`, so an
/// unconfigured phase can never grant by accident.
pub struct ContradictionResolver {
    phase_rules: BTreeMap<(String, Classification), PhaseAccess>,
    time_rules: BTreeMap<(Classification, TimePeriod), PhaseAccess>,
}

impl Default for ContradictionResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ContradictionResolver {
    /// An empty resolver: every phase and time lookup blocks.
    pub fn new() -> Self {
        Self {
            phase_rules: BTreeMap::new(),
            time_rules: BTreeMap::new(),
        }
    }

    pub fn with_phase_rule(
        mut self,
        phase: &str,
        classification: Classification,
        access: PhaseAccess,
    ) -> Self {
        self.phase_rules
            .insert((phase.to_string(), classification), access);
        self
    }

    pub fn with_time_rule(
        mut self,
        classification: Classification,
        period: TimePeriod,
        access: PhaseAccess,
    ) -> Self {
        self.time_rules.insert((classification, period), access);
        self
    }

    /// A populated resolver with conventional defaults: everything is open
    /// during business hours, internal data stays open around the clock,
    /// sensitive tiers close outside business hours and in pre-deployment.
    pub fn standard() -> Self {
        let open_classes = [Classification::Public, Classification::Internal];
        let sensitive = [
            Classification::Confidential,
            Classification::Restricted,
            Classification::Secret,
        ];

        let mut resolver = Self::new();
        for class in open_classes {
            for period in [TimePeriod::BusinessHours, TimePeriod::OffHours, TimePeriod::Weekend] {
                resolver = resolver.with_time_rule(class, period, PhaseAccess::Allow);
            }
            for phase in ["routine", "pre_deployment", "deployment"] {
                resolver = resolver.with_phase_rule(phase, class, PhaseAccess::Allow);
            }
        }
        for class in sensitive {
            resolver = resolver
                .with_time_rule(class, TimePeriod::BusinessHours, PhaseAccess::AllowWithClearance)
                .with_phase_rule("routine", class, PhaseAccess::AllowWithClearance)
                .with_phase_rule("deployment", class, PhaseAccess::AllowWithClearance);
            // Off-hours, weekends, and pre_deployment stay blocked for
            // sensitive tiers by table absence.
        }
        resolver
    }

    /// What the phase table says; unknown combinations block.
    pub fn phase_access(&self, phase: &str, classification: Classification) -> PhaseAccess {
        self.phase_rules
            .get(&(phase.to_string(), classification))
            .copied()
            .unwrap_or_default()
    }

    /// What the time table says; unknown combinations block.
    pub fn time_access(&self, classification: Classification, period: TimePeriod) -> PhaseAccess {
        self.time_rules
            .get(&(classification, period))
            .copied()
            .unwrap_or_default()
    }

    /// Resolves the competing signals for one request.
    pub fn resolve(
        &self,
        clearance_sufficient: bool,
        classification: Classification,
        mission_phase: &str,
        period: TimePeriod,
        override_permission: bool,
    ) -> Resolution {
        let signals = SignalSet {
            clearance_sufficient,
            mission_phase_allows: self.phase_access(mission_phase, classification).permits(),
            time_allows: self.time_access(classification, period).permits(),
            override_applies: override_permission || mission_phase == "emergency",
            emergency_phase: mission_phase == "emergency",
        };
        debug!(?signals, classification = %classification, phase = %mission_phase, "resolving contradiction");

        apply_precedence(signals, classification, mission_phase, period)
    }
}

/// The fixed precedence order. Each arm returns immediately; nothing below
/// a satisfied arm is ever consulted.
fn apply_precedence(
    signals: SignalSet,
    classification: Classification,
    mission_phase: &str,
    period: TimePeriod,
) -> Resolution {
    if signals.emergency_phase {
        return Resolution {
            effect: Effect::Allow,
            reason: "access granted: emergency phase overrides all restrictions".to_string(),
            contradiction: ContradictionType::EmergencyOverride,
            signals,
        };
    }

    if signals.override_applies {
        return Resolution {
            effect: Effect::Allow,
            reason: "access granted: explicit override permission".to_string(),
            contradiction: ContradictionType::Override,
            signals,
        };
    }

    if !signals.time_allows {
        if signals.clearance_sufficient {
            return Resolution {
                effect: Effect::Deny,
                reason: format!(
                    "blocked due to {} restriction despite sufficient clearance",
                    period.as_str()
                ),
                contradiction: ContradictionType::ClearanceVsTime,
                signals,
            };
        }
        return Resolution {
            effect: Effect::Deny,
            reason: format!("access denied: {} restrictions apply", period.as_str()),
            contradiction: ContradictionType::TimeRestriction,
            signals,
        };
    }

    if !signals.clearance_sufficient {
        return Resolution {
            effect: Effect::Deny,
            reason: format!("access denied: insufficient clearance for {classification} data"),
            contradiction: ContradictionType::ClearanceInsufficient,
            signals,
        };
    }

    if !signals.mission_phase_allows {
        return Resolution {
            effect: Effect::Deny,
            reason: format!("access denied: {mission_phase} phase restrictions"),
            contradiction: ContradictionType::TimeRestriction,
            signals,
        };
    }

    Resolution {
        effect: Effect::Allow,
        reason: "access granted: all policy requirements satisfied".to_string(),
        contradiction: ContradictionType::None,
        signals,
    }
}
