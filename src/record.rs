use std::rc::Rc;

use serde_json::Value;

use crate::breakpoint::{Breakpoint, BreakpointTable, resolve};
use crate::host::{Host, NodeUpdated, add_label, remove_label};

/// One tracked element bound to its breakpoint table.
///
/// The record does not own the element; it holds the host's handle.
#[derive(Clone, Debug)]
pub struct ElementRecord<E> {
    element: E,
    table: Rc<BreakpointTable>,
    name: Option<String>,
    applied: Option<usize>,
}

/// What a single recompute did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Recompute {
    /// The element had no layout; nothing was touched.
    Skipped,
    /// The element was re-resolved at `width`. `index` is the matched
    /// breakpoint's position in the table.
    Applied { width: f64, index: Option<usize> },
}

impl<E> ElementRecord<E> {
    pub(crate) fn new(element: E, table: Rc<BreakpointTable>, name: Option<String>) -> Self {
        Self {
            element,
            table,
            name,
            applied: None,
        }
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn table(&self) -> &BreakpointTable {
        &self.table
    }

    /// Logical name used by `get` and `remove`. Elements discovered through a
    /// selector carry the selector as their name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The breakpoint applied by the last recompute.
    pub fn applied(&self) -> Option<&Breakpoint> {
        self.applied.and_then(|index| self.table.get(index))
    }

    pub fn applied_class(&self) -> Option<&str> {
        self.applied().map(|bp| bp.class.as_str())
    }

    /// Re-resolve the element against its current width.
    ///
    /// Every label in the table is removed before the matched one is added,
    /// so a class from an earlier resolution can never linger.
    pub fn recompute<H>(&mut self, host: &mut H, payload: Option<&Value>) -> Recompute
    where
        H: Host<Element = E> + ?Sized,
    {
        if !host.has_layout(&self.element) {
            return Recompute::Skipped;
        }

        let width = host.width(&self.element);
        let index = resolve(width, &self.table);

        for bp in self.table.iter().rev() {
            remove_label(host, &self.element, &bp.class);
        }
        let breakpoint = index.map(|index| &self.table[index]);
        if let Some(bp) = breakpoint {
            add_label(host, &self.element, &bp.class);
        }
        self.applied = index;

        host.node_updated(
            &self.element,
            &NodeUpdated {
                width,
                breakpoint,
                payload,
            },
        );

        Recompute::Applied { width, index }
    }

    /// Strip every label of the table from the element, layout or not.
    pub fn cleanup<H>(&mut self, host: &mut H)
    where
        H: Host<Element = E> + ?Sized,
    {
        for label in self.table.labels() {
            remove_label(host, &self.element, label);
        }
        self.applied = None;
    }
}
