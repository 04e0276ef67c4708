//! The registry of tracked elements.
//!
//! A [`Registry`] binds host elements to breakpoint tables and keeps their
//! applied class in sync with their width. Elements are registered directly or
//! discovered through a selector; selectors are remembered so that
//! [`refresh`](Registry::refresh) can pick up elements the host created later.
//!
//! The registry is a plain value. Create as many as needed, drop them when
//! done. Nothing about it is global.
//!
//! # Re-entrancy
//!
//! Every operation completes synchronously. A [`Host`] must not call back into
//! the registry from `node_updated` or `checked`; the borrow checker rules
//! this out for an owned registry, and a registry shared through
//! [`Registry::attach`] defers the pass to the next scheduler tick instead.

use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use serde_json::Value;
use slotmap::SlotMap;

use crate::breakpoint::BreakpointTable;
use crate::broadcast::{PassReport, broadcast};
use crate::config::QueriesConfig;
use crate::host::Host;
use crate::id::RecordId;
use crate::record::ElementRecord;
use crate::target::Target;

/// Outcome of [`Registry::refresh`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RefreshReport {
    /// Records dropped because their element left the host tree.
    pub evicted: usize,
    /// Records created by re-running selector discovery.
    pub added: usize,
    pub pass: PassReport,
}

/// Tracked elements bound to breakpoint tables, over an owned [`Host`].
///
/// Dropping a registry only forgets its records. Breakpoint classes it applied
/// stay on the elements; call [`clear`](Self::clear) or
/// [`into_host`](Self::into_host) first to strip them.
pub struct Registry<H: Host> {
    host: H,
    config: QueriesConfig,
    selectors: IndexMap<String, Rc<BreakpointTable>, FxBuildHasher>,
    records: SlotMap<RecordId, ElementRecord<H::Element>>,
    /// Records in registration order. Passes walk this list.
    order: Vec<RecordId>,
    /// Elements that already carry a table. Registration is deduplicated on
    /// this, not on names.
    attached: FxHashMap<H::Element, RecordId>,
}

impl<H: Host> Registry<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, QueriesConfig::default())
    }

    pub fn with_config(host: H, config: QueriesConfig) -> Self {
        Self {
            host,
            config,
            selectors: IndexMap::default(),
            records: SlotMap::with_key(),
            order: Vec::new(),
            attached: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &QueriesConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Number of tracked elements.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether `element` is currently tracked.
    pub fn contains(&self, element: &H::Element) -> bool {
        self.attached.contains_key(element)
    }

    pub fn record_id(&self, element: &H::Element) -> Option<RecordId> {
        self.attached.get(element).copied()
    }

    /// The record behind `id`, or `None` once it has been evicted.
    pub fn record(&self, id: RecordId) -> Option<&ElementRecord<H::Element>> {
        self.records.get(id)
    }

    /// Tracked records in registration order.
    pub fn records(&self) -> impl Iterator<Item = (RecordId, &ElementRecord<H::Element>)> {
        self.order.iter().map(|id| (*id, &self.records[*id]))
    }

    /// Remembered selectors and their tables, in the order they were first added.
    pub fn selectors(&self) -> impl Iterator<Item = (&str, &BreakpointTable)> {
        self.selectors
            .iter()
            .map(|(selector, table)| (selector.as_str(), table.as_ref()))
    }

    /// Register `target` with `table`, then run a full pass over every record.
    ///
    /// Elements that are already tracked keep their existing table. Returns
    /// the number of new records.
    pub fn add(
        &mut self,
        target: impl Into<Target<H::Element>>,
        table: impl Into<BreakpointTable>,
    ) -> usize {
        let table = Rc::new(table.into());
        if self.config.logs_unsorted() && !table.is_sorted() {
            tracing::debug!(?table, "breakpoint thresholds are not ascending");
        }

        let added = match target.into() {
            Target::BySelector(selector) => self.add_selector(selector, table),
            Target::ByElement(element, name) => usize::from(self.track(element, &table, name)),
            Target::ByElements(elements, name) => elements
                .into_iter()
                .filter(|element| self.track(element.clone(), &table, name.clone()))
                .count(),
        };
        tracing::debug!(added, tracked = self.len(), "registered elements");

        self.update(None);
        added
    }

    /// Drop records whose element left the host tree, discover again for
    /// every remembered selector, then run a full pass.
    pub fn refresh(&mut self) -> RefreshReport {
        let evicted = self.evict_detached();

        let selectors: Vec<_> = self
            .selectors
            .iter()
            .map(|(selector, table)| (selector.clone(), table.clone()))
            .collect();
        let added = selectors
            .into_iter()
            .map(|(selector, table)| self.discover(&selector, &table))
            .sum::<usize>();
        tracing::debug!(evicted, added, tracked = self.len(), "refreshed registry");

        let pass = self.update(None);
        RefreshReport {
            evicted,
            added,
            pass,
        }
    }

    /// Evict records.
    ///
    /// With no key, every record whose element left the host tree goes. With a
    /// key, every record with that logical name goes and the selector of the
    /// same name is forgotten so `refresh` stops discovering it. Returns the
    /// number of evicted records.
    pub fn remove(&mut self, key: Option<&str>) -> usize {
        let Some(key) = key else {
            return self.evict_detached();
        };

        let mut evicted = 0;
        for index in (0..self.order.len()).rev() {
            if self.records[self.order[index]].name() == Some(key) {
                self.evict(index);
                evicted += 1;
            }
        }
        if self.selectors.shift_remove(key).is_some() {
            tracing::debug!(selector = key, "forgot selector");
        }
        tracing::debug!(key, evicted, "removed records");
        evicted
    }

    /// The most recently registered element named `name`.
    pub fn get(&self, name: &str) -> Option<&H::Element> {
        self.order
            .iter()
            .rev()
            .map(|id| &self.records[*id])
            .find(|record| record.name() == Some(name))
            .map(ElementRecord::element)
    }

    /// Re-resolve every record now. `payload` is handed to every
    /// notification of the pass.
    pub fn update(&mut self, payload: Option<&Value>) -> PassReport {
        broadcast(&mut self.host, &mut self.records, &self.order, payload)
    }

    /// Stop tracking everything, stripping breakpoint classes from every
    /// element, and forget all selectors.
    pub fn clear(&mut self) {
        for index in (0..self.order.len()).rev() {
            self.evict(index);
        }
        self.selectors.clear();
    }

    /// Clear the registry and hand the host back.
    pub fn into_host(mut self) -> H {
        self.clear();
        self.host
    }

    fn add_selector(&mut self, selector: String, table: Rc<BreakpointTable>) -> usize {
        let added = self.discover(&selector, &table);
        self.selectors.insert(selector, table);
        added
    }

    fn discover(&mut self, selector: &str, table: &Rc<BreakpointTable>) -> usize {
        let found = self.host.discover(selector);
        tracing::trace!(selector, found = found.len(), "discovered elements");
        found
            .into_iter()
            .filter(|element| self.track(element.clone(), table, Some(selector.to_string())))
            .count()
    }

    fn track(
        &mut self,
        element: H::Element,
        table: &Rc<BreakpointTable>,
        name: Option<String>,
    ) -> bool {
        if self.attached.contains_key(&element) {
            return false;
        }
        let id = self
            .records
            .insert(ElementRecord::new(element.clone(), table.clone(), name));
        self.order.push(id);
        self.attached.insert(element, id);
        true
    }

    fn evict_detached(&mut self) -> usize {
        let mut evicted = 0;
        for index in (0..self.order.len()).rev() {
            let element = self.records[self.order[index]].element();
            if !self.host.is_attached(element) {
                self.evict(index);
                evicted += 1;
            }
        }
        if evicted > 0 {
            tracing::debug!(evicted, "evicted detached elements");
        }
        evicted
    }

    /// Strip the record's classes and take it out of the pass list.
    fn evict(&mut self, index: usize) {
        let id = self.order.remove(index);
        if let Some(mut record) = self.records.remove(id) {
            record.cleanup(&mut self.host);
            self.attached.remove(record.element());
            tracing::trace!(?id, element = ?record.element(), "evicted record");
        }
    }
}

impl<H: Host + std::fmt::Debug> std::fmt::Debug for Registry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("host", &self.host)
            .field("selectors", &self.selectors.keys().collect::<Vec<_>>())
            .field("records", &self.order.len())
            .finish()
    }
}
