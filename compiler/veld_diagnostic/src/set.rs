//! Insertion-ordered diagnostic sink with set semantics.

use rustc_hash::FxHashSet;

use crate::diagnostic::Diagnostic;

/// Collects diagnostics in insertion order, dropping exact duplicates.
///
/// Fixed-point analyses interpret the same instruction several times on
/// the way to convergence and may report the same finding on each visit.
/// `insert` keeps the first occurrence, so downstream output is identical
/// whether convergence took one pass or five.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticSet {
    ordered: Vec<Diagnostic>,
    seen: FxHashSet<Diagnostic>,
}

impl DiagnosticSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic. Returns `true` if it was new.
    pub fn insert(&mut self, diagnostic: Diagnostic) -> bool {
        if !self.seen.insert(diagnostic.clone()) {
            return false;
        }
        self.ordered.push(diagnostic);
        true
    }

    /// Does the set contain at least one error?
    pub fn has_errors(&self) -> bool {
        self.ordered.iter().any(Diagnostic::is_error)
    }

    /// Number of collected diagnostics.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Is the set empty?
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.ordered.iter()
    }

    /// Drain all diagnostics in insertion order, leaving the set empty.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        self.seen.clear();
        std::mem::take(&mut self.ordered)
    }
}

impl<'a> IntoIterator for &'a DiagnosticSet {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.ordered.iter()
    }
}
