//! Temporal context: time windows, temporal roles, and the per-request
//! temporal envelope.
//!
//! A temporal role is a time-bounded elevation of a base role. The role
//! enum only names the roles; eligibility, inheritance, and duration rules
//! live in the validator crate so this crate stays dependency-light.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Time Windows
// ============================================================================

/// Category of a declared time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    BusinessHours,
    Emergency,
    AccessWindow,
    Maintenance,
    Holiday,
}

/// Error constructing a [`TimeWindow`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeWindowError {
    #[error("time window end ({end}) must be after start ({start})")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// A half-open interval `[start, end)` with a declared purpose.
///
/// Construction enforces `end > start`; a window can never be empty or
/// inverted once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    window_type: WindowType,
}

impl TimeWindow {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        window_type: WindowType,
    ) -> Result<Self, TimeWindowError> {
        if end <= start {
            return Err(TimeWindowError::EndBeforeStart { start, end });
        }
        Ok(Self {
            start,
            end,
            window_type,
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    /// Whether `at` falls inside the window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

// ============================================================================
// Temporal Roles
// ============================================================================

/// A time-bounded role elevation.
///
/// Three families:
/// - **Oncall tiers** (`low < medium < high < critical`): emergency
///   escalation; require an emergency authorization id and an active
///   emergency context.
/// - **Acting roles**: planned delegation (manager, supervisor, department
///   head); require an authorization source and a bounded validity.
/// - **Incident roles**: responder and lead for security incidents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalRole {
    OncallLow,
    OncallMedium,
    OncallHigh,
    OncallCritical,
    ActingManager,
    ActingSupervisor,
    ActingDepartmentHead,
    IncidentResponder,
    SecurityIncidentLead,
}

impl TemporalRole {
    pub fn as_str(self) -> &'static str {
        match self {
            TemporalRole::OncallLow => "oncall_low",
            TemporalRole::OncallMedium => "oncall_medium",
            TemporalRole::OncallHigh => "oncall_high",
            TemporalRole::OncallCritical => "oncall_critical",
            TemporalRole::ActingManager => "acting_manager",
            TemporalRole::ActingSupervisor => "acting_supervisor",
            TemporalRole::ActingDepartmentHead => "acting_department_head",
            TemporalRole::IncidentResponder => "incident_responder",
            TemporalRole::SecurityIncidentLead => "security_incident_lead",
        }
    }

    pub fn is_oncall(self) -> bool {
        matches!(
            self,
            TemporalRole::OncallLow
                | TemporalRole::OncallMedium
                | TemporalRole::OncallHigh
                | TemporalRole::OncallCritical
        )
    }

    pub fn is_acting(self) -> bool {
        matches!(
            self,
            TemporalRole::ActingManager
                | TemporalRole::ActingSupervisor
                | TemporalRole::ActingDepartmentHead
        )
    }

    pub fn is_incident(self) -> bool {
        matches!(
            self,
            TemporalRole::IncidentResponder | TemporalRole::SecurityIncidentLead
        )
    }

    /// Oncall tier, 1 (low) through 4 (critical). `None` for non-oncall roles.
    pub fn oncall_tier(self) -> Option<u8> {
        match self {
            TemporalRole::OncallLow => Some(1),
            TemporalRole::OncallMedium => Some(2),
            TemporalRole::OncallHigh => Some(3),
            TemporalRole::OncallCritical => Some(4),
            _ => None,
        }
    }
}

impl std::fmt::Display for TemporalRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Temporal Context
// ============================================================================

/// The temporal envelope of an access request.
///
/// Carries the evaluation timestamp plus everything needed to judge a
/// temporal role grant: the base role it derives from, the inheritance
/// chain that was recorded when it was granted, its validity bound, and
/// the provenance fields (`authorization_source`,
/// `emergency_authorization_id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalContext {
    pub timestamp: DateTime<Utc>,
    /// IANA timezone name of the requester, informational only.
    pub timezone: String,
    pub business_hours: bool,
    pub emergency_override: bool,
    pub situation: crate::Situation,
    pub temporal_role: Option<TemporalRole>,
    pub base_role: Option<String>,
    pub inherited_permissions: Vec<String>,
    pub permission_inheritance_chain: Vec<String>,
    pub temporal_role_valid_until: Option<DateTime<Utc>>,
    pub authorization_source: Option<String>,
    pub emergency_authorization_id: Option<String>,
}

impl TemporalContext {
    /// Creates a context at `timestamp` with business hours derived from it
    /// (weekdays 09:00–17:00 UTC) and no temporal role.
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            timezone: "UTC".to_string(),
            business_hours: in_business_hours(timestamp),
            emergency_override: false,
            situation: crate::Situation::Normal,
            temporal_role: None,
            base_role: None,
            inherited_permissions: Vec::new(),
            permission_inheritance_chain: Vec::new(),
            temporal_role_valid_until: None,
            authorization_source: None,
            emergency_authorization_id: None,
        }
    }

    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn with_situation(mut self, situation: crate::Situation) -> Self {
        self.situation = situation;
        self
    }

    pub fn with_emergency_override(mut self) -> Self {
        self.emergency_override = true;
        self
    }

    pub fn with_temporal_role(mut self, role: TemporalRole, base_role: &str) -> Self {
        self.temporal_role = Some(role);
        self.base_role = Some(base_role.to_string());
        self
    }

    pub fn with_inheritance_chain(mut self, chain: Vec<String>) -> Self {
        self.permission_inheritance_chain = chain;
        self
    }

    pub fn with_valid_until(mut self, until: DateTime<Utc>) -> Self {
        self.temporal_role_valid_until = Some(until);
        self
    }

    pub fn with_authorization_source(mut self, source: &str) -> Self {
        self.authorization_source = Some(source.to_string());
        self
    }

    pub fn with_emergency_authorization(mut self, id: &str) -> Self {
        self.emergency_authorization_id = Some(id.to_string());
        self
    }

    /// Whether emergency-specific validation applies to this context.
    pub fn in_emergency_context(&self) -> bool {
        self.emergency_override
            || self.situation == crate::Situation::Emergency
            || self.emergency_authorization_id.is_some()
    }

    /// Whether the temporal role has expired relative to `now`.
    pub fn role_expired(&self, now: DateTime<Utc>) -> bool {
        self.temporal_role_valid_until
            .is_some_and(|until| now > until)
    }
}

/// Business hours: weekdays 09:00–17:00 UTC (inclusive start, exclusive end).
pub fn in_business_hours(at: DateTime<Utc>) -> bool {
    let weekday = at.weekday().number_from_monday() <= 5;
    weekday && (9..17).contains(&at.hour())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_time_window_rejects_inverted_bounds() {
        let start = utc(2026, 3, 2, 12, 0);
        let end = utc(2026, 3, 2, 9, 0);
        let err = TimeWindow::new(start, end, WindowType::AccessWindow).unwrap_err();
        assert_eq!(err, TimeWindowError::EndBeforeStart { start, end });
    }

    #[test]
    fn test_time_window_contains_is_half_open() {
        let window = TimeWindow::new(
            utc(2026, 3, 2, 9, 0),
            utc(2026, 3, 2, 17, 0),
            WindowType::BusinessHours,
        )
        .unwrap();
        assert!(window.contains(utc(2026, 3, 2, 9, 0)), "start is inclusive");
        assert!(!window.contains(utc(2026, 3, 2, 17, 0)), "end is exclusive");
    }

    #[test]
    fn test_business_hours_boundaries() {
        // Monday 2026-03-02.
        assert!(in_business_hours(utc(2026, 3, 2, 9, 0)));
        assert!(in_business_hours(utc(2026, 3, 2, 16, 59)));
        assert!(!in_business_hours(utc(2026, 3, 2, 17, 0)));
        assert!(!in_business_hours(utc(2026, 3, 2, 8, 59)));
        // Saturday 2026-03-07.
        assert!(!in_business_hours(utc(2026, 3, 7, 11, 0)));
    }

    #[test]
    fn test_oncall_tiers_strictly_increase() {
        let tiers: Vec<u8> = [
            TemporalRole::OncallLow,
            TemporalRole::OncallMedium,
            TemporalRole::OncallHigh,
            TemporalRole::OncallCritical,
        ]
        .iter()
        .map(|r| r.oncall_tier().unwrap())
        .collect();
        assert_eq!(tiers, vec![1, 2, 3, 4]);
        assert_eq!(TemporalRole::ActingManager.oncall_tier(), None);
    }

    #[test]
    fn test_emergency_context_detection() {
        let base = TemporalContext::at(utc(2026, 3, 2, 10, 0));
        assert!(!base.in_emergency_context());

        let overridden = base.clone().with_emergency_override();
        assert!(overridden.in_emergency_context());

        let situational = base
            .clone()
            .with_situation(crate::Situation::Emergency);
        assert!(situational.in_emergency_context());

        let authorized = base.with_emergency_authorization("EMRG-77");
        assert!(authorized.in_emergency_context());
    }

    #[test]
    fn test_role_expiry() {
        let now = utc(2026, 3, 2, 10, 0);
        let ctx = TemporalContext::at(now)
            .with_temporal_role(TemporalRole::OncallLow, "nurse")
            .with_valid_until(utc(2026, 3, 2, 9, 0));
        assert!(ctx.role_expired(now), "past bound should read as expired");
        assert!(!ctx.role_expired(utc(2026, 3, 2, 8, 0)));
    }
}
