//! # sentra-types: Core types for `Sentra`
//!
//! This crate contains the shared vocabulary used across the Sentra access
//! decision engine:
//! - Target kinds ([`TargetKind`])
//! - Classification and clearance ladders ([`Classification`], [`Clearance`])
//! - Risk and compliance vocabulary ([`RiskLevel`], [`ComplianceTag`], [`Situation`])
//! - Temporal role machinery ([`TemporalRole`], [`TimeWindow`], [`TemporalContext`])
//! - The six-attribute access record ([`AccessContext`])
//!
//! Everything here is deliberately closed: classifications, clearances,
//! situations, and temporal roles are enums rather than free-form strings so
//! that downstream matching logic is exhaustive and statically checkable.

mod classification;
mod context;
mod ids;
mod temporal;

pub use classification::{Classification, Clearance, ComplianceTag, RiskLevel, Situation};
pub use context::{AccessContext, AccessContextBuilder, AuditSummary, ContextError};
pub use ids::TargetKind;
pub use temporal::{TemporalContext, TemporalRole, TimeWindow, TimeWindowError, WindowType};
