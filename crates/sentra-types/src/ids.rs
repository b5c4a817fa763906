//! Entity target kinds.
//!
//! Identifiers themselves are opaque case-sensitive strings from the
//! upstream org directory; employee ids conventionally carry an `emp-`
//! prefix, which the fact resolver uses as a structural hint when a target
//! is not explicitly typed.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The kind of entity an access target resolves to.
///
/// Drives the hierarchy level assigned to the resource owner: departments
/// sit at level 3, teams at level 2, and employees at their computed level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Employee,
    Team,
    Department,
}

impl Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TargetKind::Employee => "employee",
            TargetKind::Team => "team",
            TargetKind::Department => "department",
        };
        write!(f, "{label}")
    }
}
