//! # sentra-temporal: temporal role validation and risk scoring
//!
//! Two pure evaluation surfaces over an access context snapshot:
//!
//! - **Role validation** ([`RoleValidator`]): checks that a temporarily
//!   granted role (oncall tier, acting delegation, incident role) was
//!   legitimately derived from its base role, is inside its validity
//!   window, carries the right authorization provenance, and — for oncall
//!   tiers — is being used inside an actual emergency.
//! - **Risk scoring** ([`RiskScorer`]): bounded `[0, 1]` score plus an
//!   indicator count over the same record, with an expected risk level for
//!   consistency checks against the declared one.
//!
//! Both are side-effect free and safe to run from any number of threads.

mod inheritance;
mod risk;
mod validator;

pub use inheritance::{InheritanceRule, expected_chain, inheritance_rule};
pub use risk::{RiskAssessment, RiskScorer};
pub use validator::{
    OrgEnricher, PermissiveScope, RoleValidator, ScopeCheck, ValidationReport, ValidationState,
};
