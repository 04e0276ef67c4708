//! Tests for mapping widths onto breakpoint classes through a registry.
//!
//! These tests verify that exactly one class of a table is applied after each
//! pass and that the inclusive threshold comparison holds end to end.

use element_queries_test::prelude::*;

fn table() -> BreakpointTable {
    BreakpointTable::from([(0.0, "a"), (100.0, "b"), (300.0, "c")])
}

/// Test resolution at and around every threshold.
#[test]
fn test_resolution_around_thresholds() {
    let cases = [
        (50.0, Some("a")),
        (100.0, Some("b")),
        (299.0, Some("b")),
        (300.0, Some("c")),
        (-1.0, None),
    ];
    for (width, expected) in cases {
        assert_eq!(
            table().resolve(width).map(|bp| bp.class.as_str()),
            expected,
            "width {width}"
        );
    }
}

/// Test that an element never carries more than one class from its table.
#[test]
fn test_exclusive_class_across_widths() {
    let host = HeadlessHost::new();
    let el = host.create("div").class("panel").attach();
    let mut registry = Registry::new(host.clone());
    registry.add(Target::element(el), table());

    for width in [0.0, 150.0, 350.0, 120.0, 20.0, 300.0, 99.0, 1000.0] {
        host.set_width(el, width);
        registry.update(None);

        let applied: Vec<_> = host
            .classes(el)
            .into_iter()
            .filter(|class| table().labels().any(|label| label == class.as_str()))
            .collect();
        assert_eq!(applied.len(), 1, "width {width} applied {applied:?}");
        assert!(host.has_class(el, "panel"));
    }
}

/// Test that multi-token labels are added and removed token by token.
#[test]
fn test_multi_token_labels() {
    let host = HeadlessHost::new();
    let el = host.create("div").width(50.0).attach();
    let mut registry = Registry::new(host.clone());
    registry.add(
        Target::element(el),
        [(0.0, "narrow  stacked"), (200.0, "wide columns")],
    );
    assert_eq!(host.classes(el), vec!["narrow", "stacked"]);

    host.set_width(el, 250.0);
    registry.update(None);
    assert_eq!(host.classes(el), vec!["wide", "columns"]);
}

/// Test that a table sharing a token between labels keeps the token applied.
#[test]
fn test_shared_token_between_labels() {
    let host = HeadlessHost::new();
    let el = host.create("div").width(50.0).attach();
    let mut registry = Registry::new(host.clone());
    registry.add(
        Target::element(el),
        [(0.0, "layout narrow"), (200.0, "layout wide")],
    );
    host.set_width(el, 250.0);
    registry.update(None);
    assert_eq!(host.classes(el), vec!["layout", "wide"]);
}

/// Test that an empty table applies nothing but still notifies.
#[test]
fn test_empty_table() {
    let host = HeadlessHost::new();
    let tracker = NotificationTracker::new();
    tracker.track(&host);
    let el = host.create("div").class("x").width(500.0).attach();
    let mut registry = Registry::new(host.clone());
    registry.add(Target::element(el), BreakpointTable::new());

    assert_eq!(host.classes(el), vec!["x"]);
    assert_eq!(tracker.classes_for(el), vec![None]);
}

/// Test that unsorted tables follow the counting scan instead of being sorted.
#[test]
fn test_unsorted_table_is_not_sorted() {
    let host = HeadlessHost::new();
    let el = host.create("div").width(150.0).attach();
    let mut registry = Registry::new(host.clone());
    registry.add(
        Target::element(el),
        [(300.0, "c"), (0.0, "a"), (100.0, "b")],
    );
    // Two thresholds are met, so the second entry is applied.
    assert_eq!(host.classes(el), vec!["a"]);
}
