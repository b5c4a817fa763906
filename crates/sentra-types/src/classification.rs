//! Classification and clearance ladders, risk levels, compliance tags.
//!
//! The two ladders ([`Classification`] for data, [`Clearance`] for people)
//! are ordered enums; comparing tiers is how clearance sufficiency is
//! decided everywhere in the engine. Both derive `Ord` so the numeric
//! mapping never drifts from the declaration order.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// Data Classification
// ============================================================================

/// Sensitivity classification attached to data or resources.
///
/// Ordering matters: variants are declared from least to most sensitive,
/// and `required_clearance` maps each classification onto the clearance
/// ladder:
///
/// | Classification | Required clearance |
/// |----------------|--------------------|
/// | `Public`       | `Basic`            |
/// | `Internal`     | `Basic`            |
/// | `Confidential` | `Standard`         |
/// | `Restricted`   | `Elevated`         |
/// | `Secret`       | `Restricted`       |
/// | `TopSecret`    | `TopSecret`        |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Public,
    #[default]
    Internal,
    Confidential,
    Restricted,
    Secret,
    TopSecret,
}

impl Classification {
    /// The minimum clearance tier needed to access data at this level.
    pub fn required_clearance(self) -> Clearance {
        match self {
            Classification::Public | Classification::Internal => Clearance::Basic,
            Classification::Confidential => Clearance::Standard,
            Classification::Restricted => Clearance::Elevated,
            Classification::Secret => Clearance::Restricted,
            Classification::TopSecret => Clearance::TopSecret,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Public => "public",
            Classification::Internal => "internal",
            Classification::Confidential => "confidential",
            Classification::Restricted => "restricted",
            Classification::Secret => "secret",
            Classification::TopSecret => "top_secret",
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Classification::Public),
            "internal" => Ok(Classification::Internal),
            "confidential" => Ok(Classification::Confidential),
            "restricted" => Ok(Classification::Restricted),
            "secret" => Ok(Classification::Secret),
            "top_secret" | "top secret" => Ok(Classification::TopSecret),
            other => Err(format!("unknown classification: {other}")),
        }
    }
}

// ============================================================================
// Security Clearance
// ============================================================================

/// Security clearance tier held by a requester.
///
/// Tiers: `basic=0 < standard=1 < elevated=2 < restricted=3 <
/// top_secret=4 < executive=5`. Unparseable directory values fall back to
/// `Basic` at the resolver boundary (never here).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Clearance {
    #[default]
    Basic,
    Standard,
    Elevated,
    Restricted,
    TopSecret,
    Executive,
}

impl Clearance {
    /// Numeric tier, useful for logging and tabular tests.
    pub fn tier(self) -> u8 {
        self as u8
    }

    /// Whether this clearance grants access to the given classification.
    pub fn satisfies(self, classification: Classification) -> bool {
        self >= classification.required_clearance()
    }
}

impl FromStr for Clearance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Clearance::Basic),
            "standard" => Ok(Clearance::Standard),
            "elevated" => Ok(Clearance::Elevated),
            "restricted" => Ok(Clearance::Restricted),
            "top_secret" | "top secret" => Ok(Clearance::TopSecret),
            "executive" => Ok(Clearance::Executive),
            other => Err(format!("unknown clearance: {other}")),
        }
    }
}

// ============================================================================
// Risk Level
// ============================================================================

/// Declared risk level of an access context.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Base score contribution used by the risk scorer.
    pub fn base_score(self) -> f64 {
        match self {
            RiskLevel::Low => 0.25,
            RiskLevel::Medium => 0.5,
            RiskLevel::High => 0.75,
            RiskLevel::Critical => 1.0,
        }
    }

    /// The level an indicator count maps to.
    ///
    /// Thresholds: `>=5` critical, `>=3` high, `>=1` medium, else low.
    pub fn from_indicators(count: u32) -> Self {
        match count {
            5.. => RiskLevel::Critical,
            3..=4 => RiskLevel::High,
            1..=2 => RiskLevel::Medium,
            0 => RiskLevel::Low,
        }
    }
}

impl Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        };
        write!(f, "{label}")
    }
}

// ============================================================================
// Compliance Tags
// ============================================================================

/// Regulatory frameworks an access context can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceTag {
    Hipaa,
    Gdpr,
    PciDss,
    Sox,
    Ferpa,
    Ccpa,
    Fisma,
}

// ============================================================================
// Situation
// ============================================================================

/// Operational situation the organization is in at evaluation time.
///
/// Emergency-specific temporal role checks only engage under `Emergency`
/// (or an explicit override/authorization on the context).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Situation {
    #[default]
    Normal,
    Emergency,
    Maintenance,
    Incident,
    Audit,
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(Classification::Public, Clearance::Basic)]
    #[test_case(Classification::Internal, Clearance::Basic)]
    #[test_case(Classification::Confidential, Clearance::Standard)]
    #[test_case(Classification::Restricted, Clearance::Elevated)]
    #[test_case(Classification::Secret, Clearance::Restricted)]
    #[test_case(Classification::TopSecret, Clearance::TopSecret)]
    fn test_required_clearance(classification: Classification, expected: Clearance) {
        assert_eq!(classification.required_clearance(), expected);
    }

    #[test]
    fn test_clearance_tiers_are_ordered() {
        assert!(Clearance::Basic < Clearance::Standard);
        assert!(Clearance::Restricted < Clearance::TopSecret);
        assert!(Clearance::TopSecret < Clearance::Executive);
        assert_eq!(Clearance::Executive.tier(), 5);
    }

    #[test]
    fn test_clearance_satisfies() {
        assert!(Clearance::Executive.satisfies(Classification::TopSecret));
        assert!(Clearance::Standard.satisfies(Classification::Confidential));
        assert!(
            !Clearance::Standard.satisfies(Classification::Restricted),
            "standard clearance must not reach restricted data"
        );
    }

    #[test_case(0, RiskLevel::Low)]
    #[test_case(1, RiskLevel::Medium)]
    #[test_case(2, RiskLevel::Medium)]
    #[test_case(3, RiskLevel::High)]
    #[test_case(4, RiskLevel::High)]
    #[test_case(5, RiskLevel::Critical)]
    #[test_case(9, RiskLevel::Critical)]
    fn test_risk_level_from_indicators(count: u32, expected: RiskLevel) {
        assert_eq!(RiskLevel::from_indicators(count), expected);
    }

    #[test]
    fn test_clearance_parse_accepts_directory_spellings() {
        assert_eq!("top secret".parse::<Clearance>(), Ok(Clearance::TopSecret));
        assert_eq!("Elevated".parse::<Clearance>(), Ok(Clearance::Elevated));
        assert!("cosmic".parse::<Clearance>().is_err());
    }

    #[test]
    fn test_risk_level_serde_is_uppercase() {
        let json = serde_json::to_string(&RiskLevel::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }
}
