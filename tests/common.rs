//! Integration tests for netdl-common crate.

use netdl_common::{Location, Span};

#[test]
fn test_location_display() {
    assert_eq!(Location::at(12, 3).to_string(), "12:3");
    assert_eq!(Location::NONE.to_string(), "<unknown>");
}

#[test]
fn test_location_without_span() {
    let loc = Location::at(2, 5);
    assert!(!loc.is_none());
    assert!(loc.span.is_empty());
}

#[test]
fn test_location_equality_includes_span() {
    let a = Location::new(Span::new(0, 4), 1, 1);
    assert_ne!(a, Location::at(1, 1));
    assert_eq!(a, Location::new(Span::new(0, 4), 1, 1));
    assert_eq!(a.span.range(), 0..4);
}
