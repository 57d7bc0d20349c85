//! Timing driver and the results table.
//!
//! [`run_one`] measures a single matrix cell: it times one full run of an
//! algorithm, game construction and teardown included, and merges the
//! nanoseconds per turn into a [`ResultsTable`] under the key
//! `(turns, distribution, algorithm)`.

use std::collections::BTreeMap;
use std::hint::black_box;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::BenchConfig;
use crate::error::{Error, Result};
use crate::generator::SlotGenerator;
use crate::registry::Algorithm;
use crate::{ratio, GameResult};

/// Name of the only draw distribution.
pub const DISTRIBUTION: &str = "uniform";

/// Measurements for one `(turns, distribution, algorithm)` key.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRecord {
    /// Draws per run
    pub turns: u64,
    /// Draw distribution name
    pub distribution: String,
    /// Algorithm row label
    pub algorithm: String,
    /// Nanoseconds per turn, by slot count
    pub slots_to_ns: BTreeMap<u64, f64>,
}

impl BenchmarkRecord {
    fn matches(&self, turns: u64, distribution: &str, algorithm: &str) -> bool {
        self.turns == turns && self.distribution == distribution && self.algorithm == algorithm
    }
}

/// Records in first-seen order, at most one per key.
#[derive(Debug, Clone, Default)]
pub struct ResultsTable {
    records: Vec<BenchmarkRecord>,
}

impl ResultsTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `ns_per_turn` in the record for the key, creating the record on
    /// first sight. A repeated slot count overwrites the previous value.
    pub fn record(
        &mut self,
        turns: u64,
        distribution: &str,
        algorithm: &str,
        slots: u64,
        ns_per_turn: f64,
    ) {
        match self
            .records
            .iter_mut()
            .find(|r| r.matches(turns, distribution, algorithm))
        {
            Some(record) => {
                record.slots_to_ns.insert(slots, ns_per_turn);
            }
            None => self.records.push(BenchmarkRecord {
                turns,
                distribution: distribution.to_string(),
                algorithm: algorithm.to_string(),
                slots_to_ns: BTreeMap::from([(slots, ns_per_turn)]),
            }),
        }
    }

    /// Record for a key.
    pub fn get(&self, turns: u64, distribution: &str, algorithm: &str) -> Option<&BenchmarkRecord> {
        self.records
            .iter()
            .find(|r| r.matches(turns, distribution, algorithm))
    }

    /// All records in first-seen order.
    pub fn records(&self) -> &[BenchmarkRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Outcome of one timed cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Average fraction of slots occupied
    pub fill_ratio: f64,
    /// Average wall-clock nanoseconds per turn
    pub ns_per_turn: f64,
    /// Wall-clock time of the whole run
    pub elapsed: Duration,
    /// Raw game output
    pub result: GameResult,
}

/// Times `turns` turns of `algorithm` over `slots` and records the result.
///
/// A cell the pruning rules exclude under `config.max_sequence_slots` is
/// refused with [`Error::Pruned`] before anything runs, so the table keeps
/// its blank. When `config.warmup` is set, a discarded pass over `max(slots / 8, 1)`
/// slots runs first. The timed run uses a fresh generator seeded with
/// `config.seed`, so every algorithm at a given slot count sees the same
/// draws.
pub fn run_one(
    table: &mut ResultsTable,
    config: &BenchConfig,
    turns: u64,
    slots: u64,
    algorithm: &Algorithm,
) -> Result<Measurement> {
    if turns == 0 || slots == 0 {
        return Err(Error::InvalidConfig(format!(
            "cannot run {turns} turns over {slots} slots"
        )));
    }
    if let Err(skip) = algorithm.admits(slots, config.max_sequence_slots) {
        return Err(Error::Pruned {
            algorithm: algorithm.name.clone(),
            slots,
            skip,
        });
    }

    if config.warmup {
        let mut draws = SlotGenerator::with_seed((slots / 8).max(1), config.seed);
        black_box(algorithm.run(turns, &mut draws));
    }

    let mut draws = SlotGenerator::with_seed(slots, config.seed);
    let start = Instant::now();
    let result = black_box(algorithm.run(turns, &mut draws));
    let elapsed = start.elapsed();

    let ns_per_turn = ratio(elapsed.as_nanos(), turns as u128);
    let fill_ratio = ratio(result.sum_of_sizes as u128, turns as u128 * slots as u128);

    debug!(
        algorithm = %algorithm.name,
        turns,
        slots,
        fill_ratio,
        ns_per_turn,
        "measured cell"
    );

    table.record(turns, DISTRIBUTION, &algorithm.name, slots, ns_per_turn);
    Ok(Measurement {
        fill_ratio,
        ns_per_turn,
        elapsed,
        result,
    })
}
