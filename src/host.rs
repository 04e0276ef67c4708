//! The capabilities the engine borrows from its host environment.
//!
//! The engine never computes layout, never matches selectors and never owns
//! the elements it tracks. A [`Host`] supplies all of that: it resolves a
//! selector to elements, reports an element's width and whether it currently
//! has layout, mutates class lists, and receives notifications.

use std::fmt::Debug;
use std::hash::Hash;

use serde_json::Value;

use crate::breakpoint::Breakpoint;

/// Host environment the registry runs against.
///
/// `Element` is a non-owning handle. Two handles compare equal when they
/// refer to the same element.
pub trait Host {
    type Element: Clone + Eq + Hash + Debug;

    /// Resolve `selector` to the elements it currently matches, in document order.
    fn discover(&self, selector: &str) -> Vec<Self::Element>;

    /// The element's rendered width.
    fn width(&self, element: &Self::Element) -> f64;

    /// Whether the element currently takes part in layout. Hidden elements
    /// (no containing block) report `false`.
    fn has_layout(&self, element: &Self::Element) -> bool;

    /// Whether the element is still present in the host's tree.
    fn is_attached(&self, element: &Self::Element) -> bool;

    /// Add a single class token. Never called with whitespace or an empty string.
    fn add_class(&mut self, element: &Self::Element, class: &str);

    /// Remove a single class token. Never called with whitespace or an empty string.
    fn remove_class(&mut self, element: &Self::Element, class: &str);

    /// Called after an element has been re-resolved.
    fn node_updated(&mut self, _element: &Self::Element, _event: &NodeUpdated<'_>) {}

    /// Called once at the end of every recomputation pass.
    fn checked(&mut self, _event: &Checked<'_>) {}
}

/// Detail carried by the per-node "updated" notification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeUpdated<'a> {
    /// Width the element was resolved against.
    pub width: f64,
    /// The matched breakpoint, `None` when the width is below every threshold.
    pub breakpoint: Option<&'a Breakpoint>,
    /// Payload handed to [`Registry::update`](crate::Registry::update), if any.
    pub payload: Option<&'a Value>,
}

/// Detail carried by the global "checked" notification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Checked<'a> {
    /// Records that were re-resolved.
    pub updated: usize,
    /// Records skipped because their element had no layout.
    pub skipped: usize,
    pub payload: Option<&'a Value>,
}

/// Split a class label into its tokens, dropping empty ones.
pub fn class_tokens(label: &str) -> impl Iterator<Item = &str> {
    label.split_whitespace()
}

pub(crate) fn add_label<H: Host + ?Sized>(host: &mut H, element: &H::Element, label: &str) {
    for token in class_tokens(label) {
        host.add_class(element, token);
    }
}

pub(crate) fn remove_label<H: Host + ?Sized>(host: &mut H, element: &H::Element, label: &str) {
    for token in class_tokens(label) {
        host.remove_class(element, token);
    }
}
