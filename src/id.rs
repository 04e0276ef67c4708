//! # Identifiers
//!
//! [`RecordId`]s identify tracked elements inside a [`Registry`](crate::Registry).
//! [`SubscriptionId`]s identify callbacks registered with a
//! [`ResizeScheduler`](crate::ResizeScheduler).
//!
//! Both are slotmap keys: an id stays invalid once its slot has been removed,
//! even if the slot is later reused.

use slotmap::new_key_type;

new_key_type! {
    /// A small unique identifier for a tracked element record.
    ///
    /// Ids of evicted records never resolve again, so holding on to one after
    /// `remove` or `refresh` is safe.
    pub struct RecordId;

    /// Handle for a callback subscribed to a resize scheduler.
    pub struct SubscriptionId;
}
