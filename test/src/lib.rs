//! Testing utilities for element-queries.
//!
//! This crate wraps the headless host with helpers for driving resize
//! scheduling and recording notifications, so tests can focus on what a
//! registry does rather than on wiring.
//!
//! # Example
//!
//! ```rust
//! use element_queries_test::prelude::*;
//!
//! let mut harness = QueryHarness::new();
//! let tracker = NotificationTracker::new();
//! tracker.track(harness.host());
//!
//! let card = harness.host().create("div").class("card").width(80.0).attach();
//! harness.registry().add(".card", [(0.0, "sm"), (100.0, "lg")]);
//!
//! harness.host().set_width(card, 140.0);
//! harness.resize_burst(5);
//! harness.frame();
//!
//! assert_eq!(harness.host().classes(card), vec!["card", "lg"]);
//! assert_eq!(tracker.check_count(), 2);
//! ```

use std::cell::{Cell, RefCell, RefMut};
use std::rc::Rc;

use element_queries::headless::{HeadlessHost, NodeId, RecordedCheck, RecordedUpdate};
use element_queries::time::{Duration, Instant};
use element_queries::{FrameRequest, QueriesConfig, Registry, ResizeScheduler};

/// Prelude module for convenient imports in tests.
pub mod prelude {
    pub use super::{NotificationTracker, QueryHarness, TestClock};
    pub use element_queries::headless::{HeadlessHost, NodeId, RecordedCheck, RecordedUpdate};
    pub use element_queries::{
        Breakpoint, BreakpointTable, Capture, FALLBACK_INTERVAL, FrameMode, FrameRequest, Host,
        Inspect, QueriesConfig, Registry, ResizeScheduler, Target,
    };
    pub use serde_json::json;
}

/// Tracks notifications delivered to a [`HeadlessHost`].
///
/// # Example
///
/// ```rust
/// use element_queries_test::prelude::*;
///
/// let host = HeadlessHost::new();
/// let tracker = NotificationTracker::new();
/// tracker.track(&host);
///
/// let el = host.create("div").width(50.0).attach();
/// let mut registry = Registry::new(host.clone());
/// registry.add(Target::element(el), [(0.0, "a")]);
///
/// assert_eq!(tracker.classes_for(el), vec![Some("a".to_string())]);
/// ```
#[derive(Clone, Default)]
pub struct NotificationTracker {
    updates: Rc<RefCell<Vec<RecordedUpdate>>>,
    checks: Rc<RefCell<Vec<RecordedCheck>>>,
    update_count: Rc<Cell<usize>>,
}

impl NotificationTracker {
    /// Create a new notification tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start listening to `host`'s notifications.
    pub fn track(&self, host: &HeadlessHost) {
        let updates = self.updates.clone();
        let count = self.update_count.clone();
        host.on_updated(move |update| {
            updates.borrow_mut().push(update.clone());
            count.set(count.get() + 1);
        });
        let checks = self.checks.clone();
        host.on_checked(move |check| checks.borrow_mut().push(check.clone()));
    }

    /// Returns the number of per-node "updated" notifications recorded.
    pub fn update_count(&self) -> usize {
        self.update_count.get()
    }

    /// Returns the number of recomputation passes observed.
    pub fn check_count(&self) -> usize {
        self.checks.borrow().len()
    }

    /// Returns every recorded "updated" notification in order.
    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.updates.borrow().clone()
    }

    pub fn last_check(&self) -> Option<RecordedCheck> {
        self.checks.borrow().last().cloned()
    }

    /// Returns the matched classes reported for `element`, one per update.
    pub fn classes_for(&self, element: NodeId) -> Vec<Option<String>> {
        self.updates
            .borrow()
            .iter()
            .filter(|update| update.element == element)
            .map(|update| update.class.clone())
            .collect()
    }

    /// Returns the elements that were updated, in notification order.
    pub fn updated_elements(&self) -> Vec<NodeId> {
        self.updates
            .borrow()
            .iter()
            .map(|update| update.element)
            .collect()
    }

    /// Reset the tracker, clearing all recorded notifications.
    pub fn reset(&self) {
        self.updates.borrow_mut().clear();
        self.checks.borrow_mut().clear();
        self.update_count.set(0);
    }
}

/// A manually advanced clock for driving timer mode schedulers.
#[derive(Clone, Copy, Debug)]
pub struct TestClock {
    now: Instant,
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            now: Instant::now(),
        }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn advance(&mut self, duration: Duration) -> Instant {
        self.now += duration;
        self.now
    }
}

/// A headless host, a shared registry and a scheduler wired together.
///
/// The registry is attached to the scheduler, so every tick runs a
/// recomputation pass over it.
pub struct QueryHarness {
    host: HeadlessHost,
    registry: Rc<RefCell<Registry<HeadlessHost>>>,
    scheduler: ResizeScheduler,
    clock: TestClock,
    requests: Vec<FrameRequest>,
}

impl Default for QueryHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryHarness {
    /// Create a harness that schedules on animation frames.
    pub fn new() -> Self {
        Self::with_config(QueriesConfig::default())
    }

    pub fn with_config(config: QueriesConfig) -> Self {
        let host = HeadlessHost::new();
        let mut scheduler = config.scheduler();
        let registry = Rc::new(RefCell::new(Registry::with_config(host.clone(), config)));
        Registry::attach(&registry, &mut scheduler);
        Self {
            host,
            registry,
            scheduler,
            clock: TestClock::new(),
            requests: Vec::new(),
        }
    }

    pub fn host(&self) -> &HeadlessHost {
        &self.host
    }

    /// Borrow the registry. Drop the borrow before calling [`frame`](Self::frame).
    pub fn registry(&self) -> RefMut<'_, Registry<HeadlessHost>> {
        self.registry.borrow_mut()
    }

    pub fn shared_registry(&self) -> &Rc<RefCell<Registry<HeadlessHost>>> {
        &self.registry
    }

    pub fn scheduler(&mut self) -> &mut ResizeScheduler {
        &mut self.scheduler
    }

    pub fn clock(&mut self) -> &mut TestClock {
        &mut self.clock
    }

    /// Frame requests handed out by the scheduler so far.
    pub fn requests(&self) -> &[FrameRequest] {
        &self.requests
    }

    /// Signal one viewport resize.
    pub fn resize(&mut self) -> &mut Self {
        if let Some(request) = self.scheduler.resize(self.clock.now()) {
            self.requests.push(request);
        }
        self
    }

    /// Signal `count` viewport resizes within one scheduling window.
    pub fn resize_burst(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.resize();
        }
        self
    }

    /// Fire the pending animation frame, or poll the fallback timer at the
    /// clock's current time.
    pub fn frame(&mut self) -> &mut Self {
        if let Some(request) = self.scheduler.poll(self.clock.now()) {
            self.requests.push(request);
        }
        self
    }

    /// Advance the clock and poll the scheduler.
    pub fn advance(&mut self, duration: Duration) -> &mut Self {
        self.clock.advance(duration);
        self.frame()
    }

    /// Number of scheduler ticks that ran.
    pub fn passes(&self) -> u64 {
        self.scheduler.passes()
    }
}
