//! Diagnostic system for rich error reporting.
//!
//! Design:
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Primary span (where it went wrong)
//! - Context labels and notes (why it's wrong)
//!
//! Diagnostics are collected in a [`DiagnosticSet`]: an insertion-ordered
//! sink with set semantics. Analyses that revisit program points during
//! fixed-point iteration may report the same finding more than once; the
//! set keeps the first occurrence and drops equal duplicates, so reported
//! output is stable regardless of how many passes convergence takes.

mod diagnostic;
mod error_code;
mod set;

pub use diagnostic::{
    illegal_move, use_of_consumed_object, use_of_partially_consumed_object,
    use_of_partially_initialized_object, use_of_uninitialized_object, Diagnostic, Label, Severity,
};
pub use error_code::ErrorCode;
pub use set::DiagnosticSet;
