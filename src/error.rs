//! Errors for the few fallible edges of the crate.
//!
//! Registry operations themselves never fail; only building tables from
//! untrusted input and loading configuration can.

/// Errors produced while building breakpoint tables or loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid breakpoint at index {index}: {reason}")]
    InvalidBreakpoint { index: usize, reason: String },
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
