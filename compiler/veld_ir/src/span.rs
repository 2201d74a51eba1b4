//! Byte-offset source ranges.
//!
//! Every instruction carries the range of source text it was lowered
//! from, and diagnostics point back at these ranges. Offsets are `u32`,
//! so a whole span fits in a register.

use std::fmt;

/// A half-open `[start, end)` range of byte offsets into a source file.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// The anchor for instructions with no source text of their own.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    /// The range from `start` up to, but not including, `end`.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
