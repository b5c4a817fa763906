//! sentra-facts: Org directory access for sentra
//!
//! Everything the policy evaluator knows about people comes through this
//! crate. Providers answer directory questions, the chain adds fallback,
//! and the resolver folds directory answers plus the request's temporal
//! envelope into one normalized fact record:
//!
//! ```text
//!   FactProvider (live HR, LDAP mirror, OrgSnapshot)
//!        │
//!   ProviderChain        transient failure → next provider
//!        │
//!   FactResolver         NotFound → error, all down → degraded facts
//!        │
//!      Facts             consumed by sentra-policy
//! ```
//!
//! # Example
//!
//! ```
//! use sentra_facts::{EmployeeContext, FactResolver, OrgSnapshot, ProviderChain};
//! use sentra_types::TemporalContext;
//!
//! let org = OrgSnapshot::new("demo")
//!     .with_employee(EmployeeContext::new("emp-1", "Engineering Manager").with_reports(&["emp-2"]))
//!     .with_employee(EmployeeContext::new("emp-2", "Engineer").with_manager("emp-1"));
//!
//! let resolver = FactResolver::new(ProviderChain::new().with_provider(Box::new(org)));
//! let outcome = resolver
//!     .resolve("emp-1", "emp-2", &TemporalContext::now(), None)
//!     .unwrap();
//! assert!(outcome.facts().is_direct_manager);
//! ```

mod chain;
mod error;
mod provider;
mod resolver;
mod snapshot;

pub use chain::ProviderChain;
pub use error::{ProviderError, ResolveError};
pub use provider::{
    CONTRACTOR_TYPES, ChainLink, Deadline, DepartmentMatch, EmployeeContext, FactProvider,
    SharedProject, department_classification,
};
pub use resolver::{FactOutcome, FactResolver, classify_target};
pub use snapshot::OrgSnapshot;
