//! Tests for resize coalescing through a registry attached to a scheduler.

use std::time::Duration;

use element_queries_test::prelude::*;

/// Test that a burst of resize signals produces a single pass.
#[test]
fn test_burst_coalesces_into_one_pass() {
    let mut harness = QueryHarness::new();
    let tracker = NotificationTracker::new();
    let el = harness.host().create("div").width(50.0).attach();
    harness
        .registry()
        .add(Target::element(el), [(0.0, "a"), (100.0, "b")]);
    tracker.track(harness.host());

    harness.host().set_width(el, 150.0);
    harness.resize_burst(25);
    assert_eq!(harness.requests(), &[FrameRequest::AnimationFrame]);
    assert_eq!(tracker.check_count(), 0);
    assert_eq!(harness.host().classes(el), vec!["a"]);

    harness.frame();
    assert_eq!(harness.passes(), 1);
    assert_eq!(tracker.check_count(), 1);
    assert_eq!(harness.scheduler().coalesced(), 24);
    assert_eq!(harness.host().classes(el), vec!["b"]);
}

/// Test that each frame window gets its own pass.
#[test]
fn test_separate_windows_run_separately() {
    let mut harness = QueryHarness::new();
    let tracker = NotificationTracker::new();
    tracker.track(harness.host());

    for _ in 0..3 {
        harness.resize_burst(4).frame();
    }
    assert_eq!(harness.passes(), 3);
    assert_eq!(tracker.check_count(), 3);
    assert_eq!(harness.requests().len(), 3);
}

/// Test that a frame with nothing pending runs nothing.
#[test]
fn test_idle_frame_is_noop() {
    let mut harness = QueryHarness::new();
    let tracker = NotificationTracker::new();
    tracker.track(harness.host());

    harness.frame().frame();
    assert_eq!(harness.passes(), 0);
    assert_eq!(tracker.check_count(), 0);
}

/// Test the fixed timer fallback when frames are unavailable.
#[test]
fn test_timer_fallback() {
    let config = QueriesConfig::default().frame_aligned(false);
    let mut harness = QueryHarness::with_config(config);
    assert_eq!(harness.scheduler().mode(), FrameMode::Timer(FALLBACK_INTERVAL));
    let el = harness.host().create("div").width(10.0).attach();
    harness
        .registry()
        .add(Target::element(el), [(0.0, "a"), (100.0, "b")]);
    harness.host().set_width(el, 200.0);

    harness.resize();
    harness.advance(Duration::from_millis(20));
    harness.resize();
    harness.advance(Duration::from_millis(20));
    assert_eq!(harness.passes(), 0);
    assert_eq!(harness.host().classes(el), vec!["a"]);

    harness.advance(Duration::from_millis(26));
    assert_eq!(harness.passes(), 1);
    assert_eq!(harness.host().classes(el), vec!["b"]);
    assert_eq!(harness.requests().len(), 1);
}

/// Test that an unchanged width leaves the class set unchanged.
#[test]
fn test_repeated_updates_are_idempotent() {
    let mut harness = QueryHarness::new();
    let a = harness.host().create("div").class("card").width(120.0).attach();
    let b = harness.host().create("div").class("card").width(520.0).attach();
    harness
        .registry()
        .add(".card", [(0.0, "sm"), (100.0, "md"), (500.0, "lg")]);

    harness.resize().frame();
    let before = (harness.host().classes(a), harness.host().classes(b));
    harness.resize().frame();
    harness.registry().update(None);
    let after = (harness.host().classes(a), harness.host().classes(b));
    assert_eq!(before, after);
    assert_eq!(after.0, vec!["card", "md"]);
    assert_eq!(after.1, vec!["card", "lg"]);
}

/// Test that a tick fired while the registry is borrowed runs on the next one.
#[test]
fn test_busy_registry_is_deferred() {
    let mut harness = QueryHarness::new();
    let tracker = NotificationTracker::new();
    tracker.track(harness.host());
    let shared = harness.shared_registry().clone();

    harness.resize();
    {
        let _borrowed = shared.borrow_mut();
        harness.frame();
    }
    assert_eq!(tracker.check_count(), 0);
    assert!(harness.scheduler().is_pending());

    harness.frame();
    assert_eq!(tracker.check_count(), 1);
    assert_eq!(harness.passes(), 2);
}

/// Test that other subscribers run alongside the registry.
#[test]
fn test_extra_subscribers_run_on_each_tick() {
    let mut harness = QueryHarness::new();
    let ticks = std::rc::Rc::new(std::cell::Cell::new(0));
    harness.scheduler().subscribe({
        let ticks = ticks.clone();
        move || ticks.set(ticks.get() + 1)
    });

    harness.resize_burst(3).frame();
    harness.resize().frame();
    assert_eq!(ticks.get(), 2);
}
