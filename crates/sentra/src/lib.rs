//! # sentra: context-aware organizational access decisions
//!
//! Sentra decides whether one person in an organization may access
//! another person's (or org unit's) data, given who they are, how they
//! relate, what the data is, and when the request happens.
//!
//! ```text
//!                    ┌───────────────┐
//!   AccessRequest ──→│  AccessEngine │──→ Decision (effect, reason,
//!                    └──────┬────────┘              factors, timing)
//!        ┌──────────────────┼───────────────────┐
//!        ▼                  ▼                   ▼
//!  sentra-facts       sentra-policy       sentra-temporal
//!  (directory →       (rules, contra-    (role validation,
//!   Facts)             diction tables)    risk scoring)
//!        └──────────── sentra-cache ────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use sentra::{AccessEngine, AccessRequest, EngineConfig};
//! use sentra_facts::{EmployeeContext, OrgSnapshot, ProviderChain};
//!
//! let org = OrgSnapshot::new("demo")
//!     .with_employee(EmployeeContext::new("emp-1", "Engineering Manager").with_reports(&["emp-2"]))
//!     .with_employee(EmployeeContext::new("emp-2", "Engineer").with_manager("emp-1"));
//! let chain = ProviderChain::new().with_provider(Box::new(org));
//!
//! let engine = AccessEngine::new(chain, EngineConfig::default()).unwrap();
//! let decision = engine.evaluate_access(&AccessRequest::new(
//!     "emp-1", "emp-2", "performance_review", "read",
//! ));
//! assert!(decision.is_allowed());
//! ```

mod cache;
mod config;
mod engine;
mod error;

pub use cache::{CacheReport, CachingProvider, DecisionCache};
pub use config::EngineConfig;
pub use engine::{AccessEngine, AccessRequest};
pub use error::EngineError;

// Commonly-used vocabulary from the component crates.
pub use sentra_policy::{Decision, Effect, PolicyRule, RuleStore};
pub use sentra_temporal::{RiskAssessment, ValidationReport, ValidationState};
pub use sentra_types::{
    AccessContext, Classification, Clearance, RiskLevel, Situation, TemporalContext, TemporalRole,
};
