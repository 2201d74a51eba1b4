//! The diagnostic type and its builder.

use std::fmt;

use veld_ir::Span;

use crate::error_code::ErrorCode;

/// How serious a diagnostic is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// A labeled source range attached to a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Label {
    pub span: Span,
    pub message: String,
    pub is_primary: bool,
}

impl Label {
    /// A primary label: the place the error happened.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// A secondary label: supporting context.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// A single diagnostic: code, message, labels, notes.
///
/// Built fluently:
///
/// ```
/// use veld_diagnostic::{Diagnostic, ErrorCode};
/// use veld_ir::Span;
///
/// let diag = Diagnostic::error(ErrorCode::E0703)
///     .with_message("use of consumed object")
///     .with_label(Span::new(10, 14), "moved before this use");
/// assert!(diag.is_error());
/// assert_eq!(diag.primary_span(), Some(Span::new(10, 14)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Start an error diagnostic with the given code.
    pub fn error(code: ErrorCode) -> Self {
        Diagnostic {
            code,
            severity: Severity::Error,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Set the main message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach a primary label.
    #[must_use]
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Attach a secondary label.
    #[must_use]
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Attach a free-standing note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Is this an error (as opposed to a warning)?
    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// The span of the first primary label, if any.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.iter().find(|l| l.is_primary).map(|l| l.span)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{kind} [{}]: {}", self.code, self.message)?;
        for label in &self.labels {
            let arrow = if label.is_primary { "-->" } else { "   " };
            write!(f, "\n  {arrow} {}: {}", label.span, label.message)?;
        }
        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }
        Ok(())
    }
}

// Constructors for the object-state diagnostics. Wording lives here so
// every pass reports these conditions identically.

/// Moving an object that is not in a fully initialized state.
pub fn illegal_move(site: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E0701)
        .with_message("illegal move")
        .with_label(site, "cannot move the value out of this expression")
}

/// Reading storage that was never initialized on some path.
pub fn use_of_uninitialized_object(site: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E0702)
        .with_message("use of uninitialized object")
        .with_label(site, "used here before initialization")
}

/// Reading an object after its value was moved.
pub fn use_of_consumed_object(site: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E0703)
        .with_message("use of consumed object")
        .with_label(site, "used here after its value was moved")
}

/// Reading an object only some of whose parts are initialized.
pub fn use_of_partially_initialized_object(site: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E0704)
        .with_message("use of partially initialized object")
        .with_label(site, "not all parts are initialized at this use")
}

/// Reading an object some of whose parts were moved.
pub fn use_of_partially_consumed_object(site: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E0705)
        .with_message("use of partially consumed object")
        .with_label(site, "some parts were moved before this use")
}

#[cfg(test)]
mod tests;
