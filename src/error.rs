//! Error types.

use std::io;

use thiserror::Error;

use crate::registry::Skip;

/// Errors raised while configuring, running or reporting a benchmark.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The cell is excluded by the pruning rules and must stay blank.
    #[error("{algorithm} is not run at {slots} slots: {skip}")]
    Pruned {
        /// Algorithm row label.
        algorithm: String,
        /// Requested slot count.
        slots: u64,
        /// Rule that excluded the cell.
        skip: Skip,
    },

    /// Writing the banner, progress or table failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
