//! # Element queries
//!
//! Element queries apply a class to an element depending on the element's own
//! rendered width, not the viewport's. Each tracked element carries a
//! [`BreakpointTable`] of `(min_width, class)` pairs; whenever the viewport
//! resizes or the set of tracked elements changes, every element is measured
//! again and exactly one class of its table (or none) is applied.
//!
//! ```rust
//! use element_queries::headless::HeadlessHost;
//! use element_queries::{Registry, Target};
//!
//! let host = HeadlessHost::new();
//! let sidebar = host.create("aside").width(180.0).attach();
//!
//! let mut registry = Registry::new(host.clone());
//! registry.add(
//!     Target::named(sidebar, "sidebar"),
//!     [(0.0, "compact"), (240.0, "comfortable")],
//! );
//! assert_eq!(host.classes(sidebar), vec!["compact"]);
//!
//! host.set_width(sidebar, 300.0);
//! registry.update(None);
//! assert_eq!(host.classes(sidebar), vec!["comfortable"]);
//! ```
//!
//! ## Hosts
//!
//! The crate never measures anything itself. Layout, selector matching,
//! class-list mutation and notification delivery belong to a [`Host`], which
//! the [`Registry`] owns. [`headless::HeadlessHost`] is an in-memory host used
//! throughout the tests.
//!
//! ## Resizes
//!
//! A [`ResizeScheduler`] coalesces bursts of resize signals into one run per
//! animation frame (or per [`FALLBACK_INTERVAL`] when frames are unavailable).
//! [`Registry::attach`] subscribes a shared registry to it.
//!
//! ## Breakpoint order
//!
//! Tables are resolved by counting met thresholds from the end of the table,
//! which picks the greatest met threshold only when thresholds are ascending.
//! Tables are never sorted for you; see [`breakpoint::resolve`].

pub mod breakpoint;
mod broadcast;
mod config;
mod error;
pub mod headless;
mod host;
mod id;
mod inspector;
mod record;
mod registry;
mod scheduler;
mod target;
pub mod time;

pub use breakpoint::{Breakpoint, BreakpointTable};
pub use broadcast::PassReport;
pub use config::QueriesConfig;
pub use error::{Error, Result};
pub use host::{Checked, Host, NodeUpdated, class_tokens};
pub use id::{RecordId, SubscriptionId};
pub use inspector::{Capture, CapturedNode, CapturedSelector, Inspect};
pub use record::{ElementRecord, Recompute};
pub use registry::{RefreshReport, Registry};
pub use scheduler::{
    FALLBACK_INTERVAL, FrameMode, FrameRequest, ResizeHandle, ResizeScheduler, SchedulerState,
};
pub use target::Target;

/// Re-exported so hosts can build notification payloads.
pub use serde_json::{Value, json};
