//! # sentra-policy: rule evaluation and contradiction resolution
//!
//! Declarative, priority-ordered access rules over derived facts.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐     ┌───────────────┐     ┌──────────────┐
//! │   Facts    │ ──→ │ PolicyEvaluator│ ──→ │   Decision   │
//! │ (derived)  │     │ (first match)  │     │ (audit trail)│
//! └────────────┘     └───────┬────────┘     └──────────────┘
//!                            │ competing restriction classes
//!                            ▼
//!                  ┌──────────────────────┐
//!                  │ ContradictionResolver │
//!                  │  (fixed precedence)   │
//!                  └──────────────────────┘
//! ```
//!
//! Rules are matched against a closed [`Facts`] record in descending
//! priority order; the first rule whose conditions are all satisfied
//! decides the outcome. A rule with no conditions matches everything,
//! which is how rule sets terminate in a default deny.
//!
//! # Example
//!
//! ```
//! use sentra_policy::{evaluate, Condition, Effect, Facts, PolicyRule, RuleStore};
//!
//! let store = RuleStore::new(vec![
//!     PolicyRule::new("manager_access", Effect::Allow, 80)
//!         .with_condition(Condition::relationship_manages()),
//!     PolicyRule::default_deny(),
//! ]);
//!
//! let mut facts = Facts::for_pair("emp-1", "emp-2");
//! facts.is_direct_manager = true;
//!
//! let decision = evaluate(&store.snapshot(), &facts);
//! assert_eq!(decision.effect, Effect::Allow);
//! ```

mod contradiction;
mod error;
mod evaluator;
mod facts;
mod loader;
mod rule;

pub use contradiction::{
    ContradictionResolver, ContradictionType, PhaseAccess, Resolution, SignalSet, TimePeriod,
};
pub use error::{PolicyError, Result};
pub use evaluator::{Decision, evaluate};
pub use facts::{Facts, HierarchyRelationship};
pub use loader::{load_rules, try_load_rules};
pub use rule::{
    Condition, Effect, HierarchyLabel, PolicyRule, RelationKind, RelationshipPattern, RuleStore,
    SharedContextKind, SharedKind,
};
