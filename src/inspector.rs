//! Diagnostic dumps of registry state.
//!
//! [`Registry::inspect`] captures either the selector map or the tracked
//! records, logs the capture at `info` level and returns it. The capture owns
//! its data, so it can be kept around, printed or serialized.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::breakpoint::BreakpointTable;
use crate::host::Host;
use crate::registry::Registry;

/// Which part of the registry to dump.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Inspect {
    /// Remembered selectors and their tables.
    Map,
    /// Tracked records.
    #[default]
    Nodes,
}

impl FromStr for Inspect {
    type Err = std::convert::Infallible;

    /// Exactly `"map"` selects the selector map; anything else selects the
    /// records.
    fn from_str(which: &str) -> Result<Self, Self::Err> {
        Ok(if which == "map" {
            Inspect::Map
        } else {
            Inspect::Nodes
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CapturedSelector {
    pub selector: String,
    pub table: BreakpointTable,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CapturedNode {
    /// The element handle, `Debug` formatted.
    pub element: String,
    pub name: Option<String>,
    pub applied: Option<String>,
    pub breakpoints: usize,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "kebab-case"))]
pub enum Capture {
    Map(Vec<CapturedSelector>),
    Nodes(Vec<CapturedNode>),
}

impl Capture {
    pub fn len(&self) -> usize {
        match self {
            Capture::Map(entries) => entries.len(),
            Capture::Nodes(nodes) => nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capture::Map(entries) => {
                write!(f, "{} selector(s)", entries.len())?;
                for entry in entries {
                    write!(f, "\n  {} [", entry.selector)?;
                    for (i, bp) in entry.table.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{bp}")?;
                    }
                    f.write_str("]")?;
                }
            }
            Capture::Nodes(nodes) => {
                write!(f, "{} node(s)", nodes.len())?;
                for node in nodes {
                    write!(
                        f,
                        "\n  {} name={} class={} ({} breakpoints)",
                        node.element,
                        node.name.as_deref().unwrap_or("-"),
                        node.applied.as_deref().unwrap_or("-"),
                        node.breakpoints
                    )?;
                }
            }
        }
        Ok(())
    }
}

impl<H: Host> Registry<H> {
    /// Capture and log part of the registry's state.
    pub fn inspect(&self, which: Inspect) -> Capture {
        let capture = match which {
            Inspect::Map => Capture::Map(
                self.selectors()
                    .map(|(selector, table)| CapturedSelector {
                        selector: selector.to_string(),
                        table: table.clone(),
                    })
                    .collect(),
            ),
            Inspect::Nodes => Capture::Nodes(
                self.records()
                    .map(|(_, record)| CapturedNode {
                        element: format!("{:?}", record.element()),
                        name: record.name().map(str::to_string),
                        applied: record.applied_class().map(str::to_string),
                        breakpoints: record.table().len(),
                    })
                    .collect(),
            ),
        };
        tracing::info!("{capture}");
        capture
    }
}
