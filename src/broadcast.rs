//! Recomputation passes.
//!
//! A pass walks every live record in registration order, re-resolves it and
//! then emits one global "checked" notification. Evicted records are gone from
//! the pass list, so they never hear about another pass.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use slotmap::SlotMap;

use crate::host::{Checked, Host};
use crate::id::{RecordId, SubscriptionId};
use crate::record::{ElementRecord, Recompute};
use crate::registry::Registry;
use crate::scheduler::ResizeScheduler;

/// Outcome of one recomputation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Records that were re-resolved and notified.
    pub updated: usize,
    /// Records skipped because their element had no layout.
    pub skipped: usize,
}

pub(crate) fn broadcast<H: Host>(
    host: &mut H,
    records: &mut SlotMap<RecordId, ElementRecord<H::Element>>,
    order: &[RecordId],
    payload: Option<&Value>,
) -> PassReport {
    let mut report = PassReport::default();
    for id in order {
        let Some(record) = records.get_mut(*id) else {
            continue;
        };
        match record.recompute(host, payload) {
            Recompute::Skipped => {
                report.skipped += 1;
                tracing::trace!(?id, "no layout, skipped");
            }
            Recompute::Applied { width, index } => {
                report.updated += 1;
                tracing::trace!(?id, width, ?index, "recomputed");
            }
        }
    }

    host.checked(&Checked {
        updated: report.updated,
        skipped: report.skipped,
        payload,
    });
    report
}

impl<H: Host + 'static> Registry<H> {
    /// Run a pass over `registry` on every tick of `scheduler`.
    ///
    /// The scheduler only holds a weak reference. Once the registry is dropped
    /// the subscription removes itself on the next tick. If the registry is already borrowed when
    /// the tick fires, the pass is pushed to the next tick.
    pub fn attach(registry: &Rc<RefCell<Self>>, scheduler: &mut ResizeScheduler) -> SubscriptionId {
        let registry = Rc::downgrade(registry);
        let handle = scheduler.handle();
        scheduler.subscribe_while(move || {
            let Some(registry) = registry.upgrade() else {
                return false;
            };
            match registry.try_borrow_mut() {
                Ok(mut registry) => {
                    registry.update(None);
                }
                Err(_) => {
                    tracing::debug!("registry busy, deferring pass to the next tick");
                    handle.resize();
                }
            }
            true
        })
    }
}
