//! Run configuration.

use crate::error::{Error, Result};
use crate::generator::DEFAULT_SEED;

/// Turns per cell when none are given.
pub const DEFAULT_TURNS: u64 = 1024;

/// Slot counts benchmarked by default, one table column each.
pub const DEFAULT_SLOT_SERIES: [u64; 3] = [64, 4 * 1024, 256 * 1024];

/// Sequence algorithms are skipped above this many slots by default.
pub const DEFAULT_MAX_SEQUENCE_SLOTS: u64 = 4 * 1024;

/// Configuration for a benchmark run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    /// Draws per matrix cell
    pub turns: u64,
    /// Slot counts to run, in column order
    pub slot_series: Vec<u64>,
    /// Sequence-feasibility ceiling
    pub max_sequence_slots: u64,
    /// Run a discarded pass over `max(slots / 8, 1)` slots before timing
    pub warmup: bool,
    /// Generator seed, shared by every cell
    pub seed: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            turns: DEFAULT_TURNS,
            slot_series: DEFAULT_SLOT_SERIES.to_vec(),
            max_sequence_slots: DEFAULT_MAX_SEQUENCE_SLOTS,
            warmup: false,
            seed: DEFAULT_SEED,
        }
    }
}

impl BenchConfig {
    /// Rejects values no run can use.
    pub fn validate(&self) -> Result<()> {
        if self.turns == 0 {
            return Err(Error::InvalidConfig("turns must be positive".into()));
        }
        if self.slot_series.is_empty() {
            return Err(Error::InvalidConfig("slot series is empty".into()));
        }
        if self.slot_series.contains(&0) {
            return Err(Error::InvalidConfig("slot counts must be positive".into()));
        }
        let mut seen = self.slot_series.clone();
        seen.sort_unstable();
        seen.dedup();
        if seen.len() != self.slot_series.len() {
            return Err(Error::InvalidConfig("slot series repeats a slot count".into()));
        }
        Ok(())
    }
}
