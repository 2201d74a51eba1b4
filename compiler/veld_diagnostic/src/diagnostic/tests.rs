use super::*;

#[test]
fn test_diagnostic_builder() {
    let diag = Diagnostic::error(ErrorCode::E0702)
        .with_message("test error")
        .with_label(Span::new(0, 5), "here")
        .with_note("some context");

    assert_eq!(diag.code, ErrorCode::E0702);
    assert_eq!(diag.message, "test error");
    assert!(diag.is_error());
    assert_eq!(diag.labels.len(), 1);
    assert!(diag.labels[0].is_primary);
    assert_eq!(diag.notes.len(), 1);
}

#[test]
fn test_primary_span_skips_secondary_labels() {
    let diag = Diagnostic::error(ErrorCode::E0703)
        .with_secondary_label(Span::new(0, 2), "moved here")
        .with_label(Span::new(10, 15), "used here");

    assert_eq!(diag.primary_span(), Some(Span::new(10, 15)));
}

#[test]
fn test_diagnostic_display_format() {
    let diag = Diagnostic::error(ErrorCode::E0701)
        .with_message("illegal move")
        .with_label(Span::new(0, 5), "primary")
        .with_secondary_label(Span::new(10, 15), "secondary")
        .with_note("a note");

    let output = diag.to_string();
    assert!(output.contains("error [E0701]: illegal move"));
    assert!(output.contains("--> "));
    assert!(output.contains("primary"));
    assert!(output.contains("secondary"));
    assert!(output.contains("= note: a note"));
}

#[test]
fn test_diagnostic_eq_and_hash() {
    use std::collections::HashSet;

    let d1 = illegal_move(Span::new(3, 4));
    let d2 = illegal_move(Span::new(3, 4));
    let d3 = illegal_move(Span::new(5, 6));

    assert_eq!(d1, d2);
    assert_ne!(d1, d3);

    let mut set = HashSet::new();
    set.insert(d1);
    set.insert(d2); // duplicate
    set.insert(d3);
    assert_eq!(set.len(), 2);
}

#[test]
fn test_object_state_constructors() {
    let site = Span::new(7, 9);
    assert_eq!(use_of_uninitialized_object(site).code, ErrorCode::E0702);
    assert_eq!(use_of_consumed_object(site).code, ErrorCode::E0703);
    assert_eq!(
        use_of_partially_initialized_object(site).code,
        ErrorCode::E0704
    );
    assert_eq!(
        use_of_partially_consumed_object(site).code,
        ErrorCode::E0705
    );
    assert_eq!(use_of_consumed_object(site).primary_span(), Some(site));
}
