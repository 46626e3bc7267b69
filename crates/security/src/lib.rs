//! Security module for Shieldline — audit logging of guard verdicts.
//!
//! Every guard check and completion call made by the guarded client can be
//! recorded as a structured [`AuditEntry`] and fanned out to sinks.

pub mod audit;

pub use audit::{AuditEntry, AuditEvent, AuditLogger, AuditOutcome, AuditSink, TracingSink};
