//! Resize coalescing.
//!
//! Viewport resize signals arrive far more often than anything needs to be
//! recomputed. [`ResizeScheduler`] turns a burst of them into a single run of
//! its subscribers per frame:
//!
//! ```text
//! Idle --resize--> Pending --frame/deadline--> (run subscribers) --> Idle
//!                  Pending --resize--> Pending (coalesced)
//! ```
//!
//! The scheduler does not own an event loop. [`resize`](ResizeScheduler::resize)
//! hands back a [`FrameRequest`] on the `Idle -> Pending` edge and the host is
//! expected to call [`on_frame`](ResizeScheduler::on_frame) on the next
//! animation frame, or [`poll`](ResizeScheduler::poll) from its timer loop when
//! frames are unavailable. Once a frame has been requested it always runs;
//! there is no cancellation.

use std::cell::Cell;
use std::rc::Rc;

use slotmap::SlotMap;

use crate::id::SubscriptionId;
use crate::time::{Duration, Instant};

/// Cadence used when the host has no frame-aligned scheduling primitive.
pub const FALLBACK_INTERVAL: Duration = Duration::from_millis(66);

/// How deferred runs are scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FrameMode {
    /// The host calls `on_frame` from its animation frame callback.
    #[default]
    AnimationFrame,
    /// The host polls and the run fires once the interval has elapsed.
    Timer(Duration),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Idle,
    Pending,
}

/// What the host must arrange after a resize signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameRequest {
    /// Call `on_frame` on the next animation frame.
    AnimationFrame,
    /// Call `poll` (or `on_frame`) at or after `deadline`.
    Timer { deadline: Instant },
}

/// A cloneable way to signal a resize from inside a subscriber.
///
/// Subscribers run while the scheduler is mutably borrowed, so they cannot
/// call [`ResizeScheduler::resize`]. A signal raised through the handle is
/// picked up when the current run ends and schedules the next one.
#[derive(Clone, Debug, Default)]
pub struct ResizeHandle {
    signalled: Rc<Cell<bool>>,
}

impl ResizeHandle {
    pub fn resize(&self) {
        self.signalled.set(true);
    }

    fn take(&self) -> bool {
        self.signalled.replace(false)
    }
}

/// Returns `false` once the subscriber has nothing left to drive.
type Callback = Box<dyn FnMut() -> bool>;

/// Coalesces resize signals into at most one subscriber run per frame.
pub struct ResizeScheduler {
    mode: FrameMode,
    state: SchedulerState,
    deadline: Option<Instant>,
    callbacks: SlotMap<SubscriptionId, Callback>,
    order: Vec<SubscriptionId>,
    handle: ResizeHandle,
    passes: u64,
    coalesced: u64,
}

impl Default for ResizeScheduler {
    fn default() -> Self {
        Self::new(FrameMode::default())
    }
}

impl ResizeScheduler {
    pub fn new(mode: FrameMode) -> Self {
        Self {
            mode,
            state: SchedulerState::Idle,
            deadline: None,
            callbacks: SlotMap::with_key(),
            order: Vec::new(),
            handle: ResizeHandle::default(),
            passes: 0,
            coalesced: 0,
        }
    }

    /// A scheduler for hosts without animation frames, firing after
    /// [`FALLBACK_INTERVAL`].
    pub fn with_fallback_timer() -> Self {
        Self::new(FrameMode::Timer(FALLBACK_INTERVAL))
    }

    pub fn mode(&self) -> FrameMode {
        self.mode
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == SchedulerState::Pending
    }

    /// Number of subscriber runs so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Number of resize signals absorbed by an already pending run.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }

    /// When the pending run is due, in timer mode.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn handle(&self) -> ResizeHandle {
        self.handle.clone()
    }

    /// Add a callback run on every deferred tick, after those already added.
    pub fn subscribe(&mut self, mut callback: impl FnMut() + 'static) -> SubscriptionId {
        self.subscribe_while(move || {
            callback();
            true
        })
    }

    /// Like [`subscribe`](Self::subscribe), but the subscription is dropped
    /// after the first tick on which `callback` returns `false`.
    pub fn subscribe_while(&mut self, callback: impl FnMut() -> bool + 'static) -> SubscriptionId {
        let id = self.callbacks.insert(Box::new(callback));
        self.order.push(id);
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if self.callbacks.remove(id).is_none() {
            return false;
        }
        self.order.retain(|sub| *sub != id);
        true
    }

    pub fn subscriber_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Signal a resize. Returns a request only when a new run was scheduled;
    /// signals that arrive while a run is pending are absorbed.
    pub fn resize(&mut self, now: Instant) -> Option<FrameRequest> {
        self.handle.take();
        match self.state {
            SchedulerState::Pending => {
                self.coalesced += 1;
                tracing::trace!(coalesced = self.coalesced, "resize coalesced");
                None
            }
            SchedulerState::Idle => Some(self.schedule(now)),
        }
    }

    /// Run the pending tick, if any. Hosts call this from their animation
    /// frame callback, or from a timer when running in timer mode.
    ///
    /// Returns a new request when a resize was signalled through the
    /// [`ResizeHandle`] while subscribers were running.
    pub fn on_frame(&mut self, now: Instant) -> Option<FrameRequest> {
        if self.state == SchedulerState::Idle {
            return self.handle.take().then(|| self.schedule(now));
        }
        self.run();
        self.handle.take().then(|| self.schedule(now))
    }

    /// Timer mode driver: run the pending tick once its deadline has passed.
    /// In animation frame mode this behaves like [`on_frame`](Self::on_frame).
    pub fn poll(&mut self, now: Instant) -> Option<FrameRequest> {
        match (self.state, self.deadline) {
            (SchedulerState::Pending, Some(deadline)) if now < deadline => None,
            _ => self.on_frame(now),
        }
    }

    fn schedule(&mut self, now: Instant) -> FrameRequest {
        self.state = SchedulerState::Pending;
        let request = match self.mode {
            FrameMode::AnimationFrame => {
                self.deadline = None;
                FrameRequest::AnimationFrame
            }
            FrameMode::Timer(interval) => {
                let deadline = now + interval;
                self.deadline = Some(deadline);
                FrameRequest::Timer { deadline }
            }
        };
        tracing::trace!(?request, "resize scheduled");
        request
    }

    fn run(&mut self) {
        self.passes += 1;
        tracing::trace!(
            pass = self.passes,
            subscribers = self.order.len(),
            "running resize subscribers"
        );
        let mut expired = Vec::new();
        for id in &self.order {
            if let Some(callback) = self.callbacks.get_mut(*id)
                && !callback()
            {
                expired.push(*id);
            }
        }
        if !expired.is_empty() {
            for id in &expired {
                self.callbacks.remove(*id);
            }
            self.order.retain(|id| !expired.contains(id));
            tracing::trace!(expired = expired.len(), "dropped expired subscribers");
        }
        self.state = SchedulerState::Idle;
        self.deadline = None;
    }
}

impl std::fmt::Debug for ResizeScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeScheduler")
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("deadline", &self.deadline)
            .field("subscribers", &self.order.len())
            .field("passes", &self.passes)
            .field("coalesced", &self.coalesced)
            .finish()
    }
}
