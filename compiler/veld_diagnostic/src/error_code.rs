//! Stable error codes.
//!
//! Codes are grouped by compiler stage. The E07xx block belongs to the
//! object-state checks: definite initialization and exclusive consumption.

use std::fmt;

/// A stable, searchable error code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Moving an object that is not fully initialized.
    E0701,
    /// Reading an object whose storage was never initialized.
    E0702,
    /// Reading an object after it was moved.
    E0703,
    /// Reading an object that is initialized in only some of its parts.
    E0704,
    /// Reading an object some of whose parts were moved.
    E0705,
}

impl ErrorCode {
    /// The code as it appears in output, e.g. `"E0702"`.
    pub fn code_str(self) -> &'static str {
        match self {
            ErrorCode::E0701 => "E0701",
            ErrorCode::E0702 => "E0702",
            ErrorCode::E0703 => "E0703",
            ErrorCode::E0704 => "E0704",
            ErrorCode::E0705 => "E0705",
        }
    }

    /// One-line description of the error class.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::E0701 => "illegal move",
            ErrorCode::E0702 => "use of uninitialized object",
            ErrorCode::E0703 => "use of consumed object",
            ErrorCode::E0704 => "use of partially initialized object",
            ErrorCode::E0705 => "use of partially consumed object",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_display() {
        assert_eq!(ErrorCode::E0701.to_string(), "E0701");
        assert_eq!(ErrorCode::E0705.to_string(), "E0705");
    }

    #[test]
    fn descriptions_name_the_error_class() {
        assert_eq!(ErrorCode::E0702.description(), "use of uninitialized object");
        assert_eq!(ErrorCode::E0703.description(), "use of consumed object");
    }
}
