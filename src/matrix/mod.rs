//! The strategy matrix: every admitted (slot count, algorithm) cell.
//!
//! Cells are visited slot count first, then in catalog order. Pruned cells
//! are never run and leave a blank in the report.

use std::io::Write;

use tracing::{info, trace};

use crate::bench::{run_one, ResultsTable};
use crate::config::BenchConfig;
use crate::error::Result;
use crate::registry::{Algorithm, Catalog};

/// One admitted cell.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    /// Slot count of the column
    pub slots: u64,
    /// Algorithm of the row
    pub algorithm: &'a Algorithm,
}

/// Drives the whole matrix for one configuration.
#[derive(Debug, Clone)]
pub struct Matrix {
    config: BenchConfig,
    catalog: Catalog,
}

impl Matrix {
    /// Matrix over the standard catalog.
    pub fn new(config: BenchConfig) -> Result<Self> {
        Self::with_catalog(config, Catalog::standard())
    }

    /// Matrix over a custom catalog.
    pub fn with_catalog(config: BenchConfig, catalog: Catalog) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, catalog })
    }

    /// The validated configuration.
    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// The algorithms enumerated.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Admitted cells in run order.
    pub fn cells(&self) -> Vec<Cell<'_>> {
        let mut cells = Vec::new();
        for &slots in &self.config.slot_series {
            for algorithm in &self.catalog {
                match algorithm.admits(slots, self.config.max_sequence_slots) {
                    Ok(()) => cells.push(Cell { slots, algorithm }),
                    Err(skip) => trace!(algorithm = %algorithm.name, slots, %skip, "pruned cell"),
                }
            }
        }
        cells
    }

    /// Runs every admitted cell into `table`, writing one `.` to `progress`
    /// per cell. Returns the number of cells run.
    pub fn run(&self, table: &mut ResultsTable, progress: &mut dyn Write) -> Result<usize> {
        let cells = self.cells();
        info!(
            turns = self.config.turns,
            cells = cells.len(),
            algorithms = self.catalog.len(),
            "starting matrix"
        );
        for cell in &cells {
            progress.write_all(b".")?;
            progress.flush()?;
            run_one(table, &self.config, self.config.turns, cell.slots, cell.algorithm)?;
        }
        info!(records = table.len(), "matrix complete");
        Ok(cells.len())
    }
}
