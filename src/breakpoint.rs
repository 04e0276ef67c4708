//! Breakpoint tables and width resolution.
//!
//! A [`BreakpointTable`] is an ordered list of `(min_width, class)` pairs.
//! [`resolve`] maps a rendered width onto one entry of that table.
//!
//! Tables are expected to be sorted ascending by `min_width`. The table is
//! never sorted on the caller's behalf: reordering would change which entry
//! wins when thresholds repeat.

use std::fmt;
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::error::{Error, Result};
use crate::host::class_tokens;

/// A single `(min_width, class)` pair.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Breakpoint {
    /// Inclusive lower bound, in the host's width units.
    pub min_width: f64,
    /// Class applied while this breakpoint is active. May hold several
    /// whitespace separated class tokens.
    pub class: String,
}

impl Breakpoint {
    pub fn new(min_width: f64, class: impl Into<String>) -> Self {
        Self {
            min_width,
            class: class.into(),
        }
    }

    /// Whether `width` satisfies this breakpoint.
    #[inline]
    pub fn matches(&self, width: f64) -> bool {
        width >= self.min_width
    }

    fn validate(&self, index: usize) -> Result<()> {
        if !self.min_width.is_finite() {
            return Err(Error::InvalidBreakpoint {
                index,
                reason: format!("threshold {} is not finite", self.min_width),
            });
        }
        if self.min_width < 0.0 {
            return Err(Error::InvalidBreakpoint {
                index,
                reason: format!("threshold {} is negative", self.min_width),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {:?}", self.min_width, self.class)
    }
}

impl<S: Into<String>> From<(f64, S)> for Breakpoint {
    fn from((min_width, class): (f64, S)) -> Self {
        Breakpoint::new(min_width, class)
    }
}

/// Ordered `(min_width, class)` pairs for one tracked element.
///
/// Empty tables are allowed and never resolve to a class.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(transparent))]
pub struct BreakpointTable {
    entries: Vec<Breakpoint>,
}

impl BreakpointTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from pairs without validating thresholds.
    pub fn from_pairs<S, I>(pairs: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (f64, S)>,
    {
        pairs.into_iter().collect()
    }

    /// Build a table from pairs, rejecting negative or non-finite thresholds.
    pub fn try_from_pairs<S, I>(pairs: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = (f64, S)>,
    {
        let table = Self::from_pairs(pairs);
        table.validate()?;
        Ok(table)
    }

    /// Append a breakpoint, builder style.
    pub fn with(mut self, min_width: f64, class: impl Into<String>) -> Self {
        self.push(min_width, class);
        self
    }

    pub fn push(&mut self, min_width: f64, class: impl Into<String>) {
        self.entries.push(Breakpoint::new(min_width, class));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Breakpoint> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Breakpoint> {
        self.entries.iter()
    }

    /// The class labels in table order. Duplicates are kept.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|bp| bp.class.as_str())
    }

    /// Every class token mentioned anywhere in the table.
    pub fn class_tokens(&self) -> impl Iterator<Item = &str> {
        self.labels().flat_map(class_tokens)
    }

    /// Whether thresholds are non-decreasing, which is what [`resolve`] assumes.
    pub fn is_sorted(&self) -> bool {
        self.entries
            .windows(2)
            .all(|pair| pair[0].min_width <= pair[1].min_width)
    }

    /// The breakpoint that applies at `width`, if any.
    pub fn resolve(&self, width: f64) -> Option<&Breakpoint> {
        resolve(width, self).map(|index| &self.entries[index])
    }

    pub fn validate(&self) -> Result<()> {
        self.entries
            .iter()
            .enumerate()
            .try_for_each(|(index, bp)| bp.validate(index))
    }
}

impl Index<usize> for BreakpointTable {
    type Output = Breakpoint;

    fn index(&self, index: usize) -> &Breakpoint {
        &self.entries[index]
    }
}

impl<'a> IntoIterator for &'a BreakpointTable {
    type Item = &'a Breakpoint;
    type IntoIter = std::slice::Iter<'a, Breakpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<S: Into<String>> FromIterator<(f64, S)> for BreakpointTable {
    fn from_iter<T: IntoIterator<Item = (f64, S)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(Breakpoint::from).collect(),
        }
    }
}

impl FromIterator<Breakpoint> for BreakpointTable {
    fn from_iter<T: IntoIterator<Item = Breakpoint>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Breakpoint>> for BreakpointTable {
    fn from(entries: Vec<Breakpoint>) -> Self {
        Self { entries }
    }
}

impl<S: Into<String>, const N: usize> From<[(f64, S); N]> for BreakpointTable {
    fn from(pairs: [(f64, S); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Index of the breakpoint that applies at `width`.
///
/// Walks the table from the last entry to the first, counting entries whose
/// threshold is met. The count minus one is the index from the start of the
/// table. With ascending thresholds this is the entry with the greatest
/// threshold that is `<= width`; with unsorted thresholds it is whatever the
/// count lands on.
///
/// Comparison is inclusive. A `NaN` width meets no threshold.
pub fn resolve(width: f64, table: &BreakpointTable) -> Option<usize> {
    let mut current: Option<usize> = None;
    for bp in table.entries.iter().rev() {
        if bp.matches(width) {
            current = Some(current.map_or(0, |index| index + 1));
        }
    }
    current
}

#[cfg(feature = "serde")]
mod de {
    use serde::de::{self, Deserializer};
    use serde::Deserialize;

    use super::{Breakpoint, BreakpointTable};

    /// Either `[0, "small"]` or `{ "min_width": 0, "class": "small" }`.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawBreakpoint {
        Pair(f64, String),
        Named { min_width: f64, class: String },
    }

    impl<'de> Deserialize<'de> for Breakpoint {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Ok(match RawBreakpoint::deserialize(deserializer)? {
                RawBreakpoint::Pair(min_width, class) => Breakpoint { min_width, class },
                RawBreakpoint::Named { min_width, class } => Breakpoint { min_width, class },
            })
        }
    }

    impl<'de> Deserialize<'de> for BreakpointTable {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let entries = Vec::<Breakpoint>::deserialize(deserializer)?;
            let table = BreakpointTable { entries };
            table.validate().map_err(de::Error::custom)?;
            Ok(table)
        }
    }
}
