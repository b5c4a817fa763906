//! The six-attribute access context record.
//!
//! An [`AccessContext`] captures a single flow of data between parties:
//! what is flowing (`data_type`), whom it is about (`data_subject`), who is
//! sending and receiving it, under what principle, and in what temporal
//! situation. The record is immutable once built; re-evaluation means
//! building a fresh one.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{Classification, ComplianceTag, RiskLevel, TemporalContext};

/// Maximum acceptable age of supporting data before it counts as fully stale.
const MAX_DATA_AGE_HOURS: i64 = 24;

/// Error building an [`AccessContext`].
#[derive(Debug, Error, PartialEq)]
pub enum ContextError {
    #[error("CRITICAL risk level requires audit_required = true")]
    CriticalWithoutAudit,
    #[error("decision confidence {0} outside [0.0, 1.0]")]
    ConfidenceOutOfRange(f64),
}

/// The 6-tuple access record plus its evaluation metadata.
///
/// Invariants enforced at construction:
/// - `risk_level == Critical` implies `audit_required`
/// - `decision_confidence`, when present, lies in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessContext {
    // The six core attributes.
    pub data_type: String,
    pub data_subject: String,
    pub data_sender: String,
    pub data_recipient: String,
    pub transmission_principle: String,
    pub temporal_context: TemporalContext,

    // Generated identity and lifecycle.
    pub node_id: Uuid,
    pub request_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,

    // Risk and compliance metadata.
    pub risk_level: RiskLevel,
    pub audit_required: bool,
    pub compliance_tags: Vec<ComplianceTag>,
    pub data_classification: Classification,
    pub decision_confidence: Option<f64>,
    pub data_freshness_timestamp: Option<DateTime<Utc>>,
}

impl AccessContext {
    /// Starts a builder over the six core attributes.
    pub fn builder(
        data_type: &str,
        data_subject: &str,
        data_sender: &str,
        data_recipient: &str,
        transmission_principle: &str,
        temporal_context: TemporalContext,
    ) -> AccessContextBuilder {
        AccessContextBuilder {
            inner: AccessContext {
                data_type: data_type.to_string(),
                data_subject: data_subject.to_string(),
                data_sender: data_sender.to_string(),
                data_recipient: data_recipient.to_string(),
                transmission_principle: transmission_principle.to_string(),
                temporal_context,
                node_id: Uuid::new_v4(),
                request_id: Uuid::new_v4(),
                created_at: Utc::now(),
                processed_at: None,
                risk_level: RiskLevel::Low,
                audit_required: false,
                compliance_tags: Vec::new(),
                data_classification: Classification::Internal,
                decision_confidence: None,
                data_freshness_timestamp: None,
            },
        }
    }

    /// Staleness of supporting data as a ratio of the 24h ceiling.
    ///
    /// `0.0` = fresh, `1.0` = exactly at the ceiling, `> 1.0` = beyond it.
    /// `None` when no freshness timestamp was recorded.
    pub fn data_staleness(&self, now: DateTime<Utc>) -> Option<f64> {
        let ts = self.data_freshness_timestamp?;
        let age = (now - ts).num_seconds() as f64;
        let max_age = Duration::hours(MAX_DATA_AGE_HOURS).num_seconds() as f64;
        Some(age / max_age)
    }

    /// Non-structural consistency checks, returned as human-readable
    /// messages rather than raised, so a caller can log or surface them
    /// without aborting the request.
    pub fn validation_warnings(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(ts) = self.data_freshness_timestamp {
            let age = now - ts;
            if age > Duration::hours(MAX_DATA_AGE_HOURS) {
                warnings.push(format!(
                    "data freshness exceeds {MAX_DATA_AGE_HOURS} hours (age: {}h)",
                    age.num_hours()
                ));
            } else if age < Duration::zero() {
                warnings.push("data freshness timestamp is in the future".to_string());
            } else if age > Duration::hours(6) {
                warnings.push(format!(
                    "data moderately stale (age: {:.1}h)",
                    age.num_seconds() as f64 / 3600.0
                ));
            }
        }

        if self.audit_required && self.compliance_tags.is_empty() {
            warnings.push("audit required but no compliance tags specified".to_string());
        }

        let sensitive = ["medical_record", "financial_record", "personal_data", "classified"];
        if sensitive.iter().any(|s| self.data_type.to_lowercase().contains(s))
            && !self.audit_required
        {
            warnings.push(format!(
                "sensitive data type '{}' should require audit",
                self.data_type
            ));
        }

        if let Some(confidence) = self.decision_confidence
            && confidence < 0.5
            && self.risk_level >= RiskLevel::High
        {
            warnings.push(format!(
                "low confidence ({confidence}) for {} risk decision",
                self.risk_level
            ));
        }

        warnings
    }

    /// Marks the context processed, optionally recording the decision
    /// confidence that was reached.
    pub fn mark_processed(&mut self, confidence: Option<f64>) {
        self.processed_at = Some(Utc::now());
        if confidence.is_some() {
            self.decision_confidence = confidence;
        }
        tracing::debug!(node_id = %self.node_id, ?confidence, "context marked processed");
    }

    /// Serializable audit record for this context.
    pub fn audit_summary(&self) -> AuditSummary {
        AuditSummary {
            request_id: self.request_id,
            node_id: self.node_id,
            data_type: self.data_type.clone(),
            risk_level: self.risk_level,
            compliance_tags: self.compliance_tags.clone(),
            audit_required: self.audit_required,
            data_classification: self.data_classification,
            emergency_context: self.temporal_context.emergency_override,
            created_at: self.created_at,
            processed_at: self.processed_at,
        }
    }
}

/// Builder for [`AccessContext`]; `build` enforces the record invariants.
#[derive(Debug)]
pub struct AccessContextBuilder {
    inner: AccessContext,
}

impl AccessContextBuilder {
    pub fn risk_level(mut self, level: RiskLevel) -> Self {
        self.inner.risk_level = level;
        self
    }

    pub fn audit_required(mut self, required: bool) -> Self {
        self.inner.audit_required = required;
        self
    }

    pub fn compliance_tags(mut self, tags: Vec<ComplianceTag>) -> Self {
        self.inner.compliance_tags = tags;
        self
    }

    pub fn classification(mut self, classification: Classification) -> Self {
        self.inner.data_classification = classification;
        self
    }

    pub fn decision_confidence(mut self, confidence: f64) -> Self {
        self.inner.decision_confidence = Some(confidence);
        self
    }

    pub fn data_freshness(mut self, at: DateTime<Utc>) -> Self {
        self.inner.data_freshness_timestamp = Some(at);
        self
    }

    pub fn build(self) -> Result<AccessContext, ContextError> {
        if self.inner.risk_level == RiskLevel::Critical && !self.inner.audit_required {
            return Err(ContextError::CriticalWithoutAudit);
        }
        if let Some(confidence) = self.inner.decision_confidence
            && !(0.0..=1.0).contains(&confidence)
        {
            return Err(ContextError::ConfidenceOutOfRange(confidence));
        }
        Ok(self.inner)
    }
}

/// Flattened audit view of an [`AccessContext`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSummary {
    pub request_id: Uuid,
    pub node_id: Uuid,
    pub data_type: String,
    pub risk_level: RiskLevel,
    pub compliance_tags: Vec<ComplianceTag>,
    pub audit_required: bool,
    pub data_classification: Classification,
    pub emergency_context: bool,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}
