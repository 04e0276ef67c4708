//! Headless host for tests and benchmarks.
//!
//! [`HeadlessHost`] is a small in-memory element tree implementing [`Host`].
//! Elements carry a tag, an optional id, a class list, a width and a
//! visibility flag, and can be attached to or detached from the tree at will.
//! It also records every notification it receives and lets listeners
//! subscribe to them.
//!
//! Selectors are deliberately tiny: a comma separated list of compound
//! selectors made of an optional tag, `#id` and any number of `.class` parts,
//! e.g. `div`, `.card`, `section.card.wide`, `#main, .sidebar`. `*` matches
//! every attached element. Only attached elements are ever discovered.
//!
//! # Example
//!
//! ```rust
//! use element_queries::headless::HeadlessHost;
//! use element_queries::Registry;
//!
//! let host = HeadlessHost::new();
//! let card = host.create("div").class("card").width(320.0).attach();
//!
//! let mut registry = Registry::new(host.clone());
//! registry.add(".card", [(0.0, "card-sm"), (300.0, "card-lg")]);
//! assert!(host.has_class(card, "card-lg"));
//!
//! host.set_width(card, 120.0);
//! registry.update(None);
//! assert!(host.has_class(card, "card-sm"));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexSet;
use serde_json::Value;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::host::{Checked, Host, NodeUpdated};

new_key_type! {
    /// Handle to an element of a [`HeadlessHost`].
    pub struct NodeId;
}

#[derive(Clone, Debug)]
struct Node {
    tag: String,
    id: Option<String>,
    classes: IndexSet<String>,
    width: f64,
    visible: bool,
    attached: bool,
}

/// A per-node "updated" notification as the host saw it.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedUpdate {
    pub element: NodeId,
    pub width: f64,
    /// Class of the matched breakpoint.
    pub class: Option<String>,
    pub min_width: Option<f64>,
    pub payload: Option<Value>,
}

/// A global "checked" notification as the host saw it.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCheck {
    pub updated: usize,
    pub skipped: usize,
    pub payload: Option<Value>,
}

type UpdateListener = Box<dyn FnMut(&RecordedUpdate)>;
type CheckListener = Box<dyn FnMut(&RecordedCheck)>;

#[derive(Default)]
struct Tree {
    nodes: SlotMap<NodeId, Node>,
    /// Creation order, which is also document order.
    order: Vec<NodeId>,
    updates: Vec<RecordedUpdate>,
    checks: Vec<RecordedCheck>,
    update_listeners: Vec<UpdateListener>,
    check_listeners: Vec<CheckListener>,
    class_writes: usize,
}

/// In-memory [`Host`]. Cloning yields another handle to the same tree.
#[derive(Clone, Default)]
pub struct HeadlessHost {
    tree: Rc<RefCell<Tree>>,
}

/// Builder returned by [`HeadlessHost::create`].
#[must_use]
pub struct ElementBuilder {
    host: HeadlessHost,
    node: Node,
}

impl ElementBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.node.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.node
            .classes
            .extend(class.split_whitespace().map(str::to_string));
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.node.width = width;
        self
    }

    /// The element has no layout, like `display: none`.
    pub fn hidden(mut self) -> Self {
        self.node.visible = false;
        self
    }

    /// Insert the element into the tree.
    pub fn attach(mut self) -> NodeId {
        self.node.attached = true;
        self.host.insert(self.node)
    }

    /// Create the element without inserting it into the tree.
    pub fn detached(self) -> NodeId {
        self.host.insert(self.node)
    }
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, tag: impl Into<String>) -> ElementBuilder {
        ElementBuilder {
            host: self.clone(),
            node: Node {
                tag: tag.into(),
                id: None,
                classes: IndexSet::new(),
                width: 0.0,
                visible: true,
                attached: false,
            },
        }
    }

    fn insert(&self, node: Node) -> NodeId {
        let mut tree = self.tree.borrow_mut();
        let id = tree.nodes.insert(node);
        tree.order.push(id);
        id
    }

    fn with_node<T>(&self, id: NodeId, f: impl FnOnce(&mut Node) -> T) -> Option<T> {
        self.tree.borrow_mut().nodes.get_mut(id).map(f)
    }

    pub fn set_width(&self, id: NodeId, width: f64) {
        self.with_node(id, |node| node.width = width);
    }

    pub fn set_visible(&self, id: NodeId, visible: bool) {
        self.with_node(id, |node| node.visible = visible);
    }

    /// Take the element out of the tree. Its handle stays valid.
    pub fn detach(&self, id: NodeId) {
        self.with_node(id, |node| node.attached = false);
    }

    pub fn attach(&self, id: NodeId) {
        self.with_node(id, |node| node.attached = true);
    }

    /// The element's classes in the order they were added.
    pub fn classes(&self, id: NodeId) -> Vec<String> {
        self.with_node(id, |node| node.classes.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.with_node(id, |node| node.classes.contains(class))
            .unwrap_or(false)
    }

    /// Number of `add_class`/`remove_class` calls received so far.
    pub fn class_writes(&self) -> usize {
        self.tree.borrow().class_writes
    }

    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.tree.borrow().updates.clone()
    }

    pub fn checks(&self) -> Vec<RecordedCheck> {
        self.tree.borrow().checks.clone()
    }

    /// Forget recorded notifications and class write counts.
    pub fn clear_log(&self) {
        let mut tree = self.tree.borrow_mut();
        tree.updates.clear();
        tree.checks.clear();
        tree.class_writes = 0;
    }

    /// Listen for per-node "updated" notifications.
    pub fn on_updated(&self, listener: impl FnMut(&RecordedUpdate) + 'static) {
        self.tree
            .borrow_mut()
            .update_listeners
            .push(Box::new(listener));
    }

    /// Listen for "checked" notifications.
    pub fn on_checked(&self, listener: impl FnMut(&RecordedCheck) + 'static) {
        self.tree
            .borrow_mut()
            .check_listeners
            .push(Box::new(listener));
    }
}

impl std::fmt::Debug for HeadlessHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tree = self.tree.borrow();
        f.debug_struct("HeadlessHost")
            .field("nodes", &tree.nodes.len())
            .field("updates", &tree.updates.len())
            .field("checks", &tree.checks.len())
            .finish()
    }
}

/// One compound selector such as `div.card#main`.
#[derive(Debug, Default, PartialEq)]
struct Compound<'a> {
    universal: bool,
    tag: Option<&'a str>,
    id: Option<&'a str>,
    classes: SmallVec<[&'a str; 4]>,
}

impl<'a> Compound<'a> {
    fn parse(source: &'a str) -> Option<Self> {
        let source = source.trim();
        if source.is_empty() {
            return None;
        }
        if source == "*" {
            return Some(Compound {
                universal: true,
                ..Default::default()
            });
        }

        let mut compound = Compound::default();
        let mut rest = source;
        let tag_end = rest.find(['.', '#']).unwrap_or(rest.len());
        if tag_end > 0 {
            compound.tag = Some(&rest[..tag_end]);
        }
        rest = &rest[tag_end..];

        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            let part = &body[..end];
            if part.is_empty() || part.contains(char::is_whitespace) {
                return None;
            }
            match marker {
                '.' => compound.classes.push(part),
                _ => compound.id = Some(part),
            }
            rest = &body[end..];
        }
        Some(compound)
    }

    fn matches(&self, node: &Node) -> bool {
        if self.universal {
            return true;
        }
        self.tag.is_none_or(|tag| tag == node.tag)
            && self.id.is_none_or(|id| node.id.as_deref() == Some(id))
            && self
                .classes
                .iter()
                .all(|class| node.classes.contains(*class))
    }
}

impl Host for HeadlessHost {
    type Element = NodeId;

    fn discover(&self, selector: &str) -> Vec<NodeId> {
        let compounds: SmallVec<[Compound<'_>; 2]> =
            selector.split(',').filter_map(Compound::parse).collect();
        let tree = self.tree.borrow();
        tree.order
            .iter()
            .copied()
            .filter(|id| {
                let node = &tree.nodes[*id];
                node.attached && compounds.iter().any(|compound| compound.matches(node))
            })
            .collect()
    }

    fn width(&self, element: &NodeId) -> f64 {
        self.tree
            .borrow()
            .nodes
            .get(*element)
            .map_or(0.0, |node| node.width)
    }

    fn has_layout(&self, element: &NodeId) -> bool {
        self.tree
            .borrow()
            .nodes
            .get(*element)
            .is_some_and(|node| node.attached && node.visible)
    }

    fn is_attached(&self, element: &NodeId) -> bool {
        self.tree
            .borrow()
            .nodes
            .get(*element)
            .is_some_and(|node| node.attached)
    }

    fn add_class(&mut self, element: &NodeId, class: &str) {
        let mut tree = self.tree.borrow_mut();
        tree.class_writes += 1;
        if let Some(node) = tree.nodes.get_mut(*element) {
            node.classes.insert(class.to_string());
        }
    }

    fn remove_class(&mut self, element: &NodeId, class: &str) {
        let mut tree = self.tree.borrow_mut();
        tree.class_writes += 1;
        if let Some(node) = tree.nodes.get_mut(*element) {
            node.classes.shift_remove(class);
        }
    }

    fn node_updated(&mut self, element: &NodeId, event: &NodeUpdated<'_>) {
        let update = RecordedUpdate {
            element: *element,
            width: event.width,
            class: event.breakpoint.map(|bp| bp.class.clone()),
            min_width: event.breakpoint.map(|bp| bp.min_width),
            payload: event.payload.cloned(),
        };
        // Listeners run without the tree borrowed so they may query the host.
        let mut listeners = std::mem::take(&mut self.tree.borrow_mut().update_listeners);
        for listener in &mut listeners {
            listener(&update);
        }
        let mut tree = self.tree.borrow_mut();
        listeners.append(&mut tree.update_listeners);
        tree.update_listeners = listeners;
        tree.updates.push(update);
    }

    fn checked(&mut self, event: &Checked<'_>) {
        let check = RecordedCheck {
            updated: event.updated,
            skipped: event.skipped,
            payload: event.payload.cloned(),
        };
        let mut listeners = std::mem::take(&mut self.tree.borrow_mut().check_listeners);
        for listener in &mut listeners {
            listener(&check);
        }
        let mut tree = self.tree.borrow_mut();
        listeners.append(&mut tree.check_listeners);
        tree.check_listeners = listeners;
        tree.checks.push(check);
    }
}
