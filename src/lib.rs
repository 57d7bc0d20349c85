//! # toggle-bench
//!
//! Measures the steady-state cost of a "find, toggle membership" workload
//! across slot representations, allocation strategies and containers.
//!
//! Every turn a slot is drawn uniformly from `[0, slots)`. If the slot is
//! present in the collection it is removed, otherwise it is inserted. A game
//! reports the collection size after each turn; the sum of those sizes is the
//! [`GameResult`] used to derive the average fill ratio.
//!
//! ## Architecture
//!
//! 1. [`generator`]: seeded uniform slot draws.
//! 2. [`alloc`]: how a slot value is materialized (inline, boxed, pooled,
//!    colony) and the deref-through ordering/hashing on handles.
//! 3. [`positional`], [`sequence`], [`set`]: the toggle algorithms, one
//!    [`Game`] per (representation, container) pair.
//! 4. [`registry`]: the catalog of named algorithms and their pruning rules.
//! 5. [`bench`] and [`matrix`]: the timing driver, the results table and the
//!    enumeration of the full matrix.
//! 6. [`report`]: banner and pipe-delimited table output.
//!
//! ## Example
//!
//! ```rust
//! use toggle_bench::positional::Bitmap;
//! use toggle_bench::set::SetGame;
//! use toggle_bench::alloc::{ByValue, Inline};
//! use toggle_bench::{play, Game};
//! use std::collections::BTreeSet;
//!
//! let draws = [0, 1, 0, 2, 3, 1, 2, 0];
//!
//! let mut bits = Bitmap::<u64>::with_slots(4);
//! let mut tree = SetGame::<BTreeSet<ByValue<u8>>, Inline<u8>>::with_slots(4);
//!
//! let a = play(&mut bits, draws);
//! let b = play(&mut tree, draws);
//! assert_eq!(a, b);
//! assert_eq!(a.sum_of_sizes, 1 + 2 + 1 + 2 + 3 + 2 + 1 + 2);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod alloc;
pub mod bench;
pub mod config;
pub mod error;
pub mod generator;
pub mod matrix;
pub mod positional;
pub mod primitive;
pub mod registry;
pub mod report;
pub mod sequence;
pub mod set;

pub use bench::{run_one, BenchmarkRecord, Measurement, ResultsTable};
pub use config::BenchConfig;
pub use error::{Error, Result};
pub use generator::SlotGenerator;
pub use matrix::Matrix;
pub use registry::{Algorithm, Catalog, Family, Skip};

/// Output of one full run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameResult {
    /// Sum over all turns of the collection size right after that turn.
    pub sum_of_sizes: u64,
}

/// One find-toggle-remove workload over a fixed slot range.
pub trait Game {
    /// Builds an empty game able to address every slot in `[0, slots)`.
    fn with_slots(slots: u64) -> Self
    where
        Self: Sized;

    /// Toggles `slot` and returns the collection size afterwards.
    fn turn(&mut self, slot: u64) -> u64;
}

/// Feeds every draw to `game` and sums the post-turn sizes.
#[inline]
pub fn play<G, I>(game: &mut G, draws: I) -> GameResult
where
    G: Game + ?Sized,
    I: IntoIterator<Item = u64>,
{
    let mut sum_of_sizes = 0u64;
    for slot in draws {
        sum_of_sizes += game.turn(slot);
    }
    GameResult { sum_of_sizes }
}

/// `dividend / divisor` as `f64`, splitting off the integer quotient first so
/// large dividends keep their precision.
pub fn ratio(dividend: u128, divisor: u128) -> f64 {
    debug_assert!(divisor != 0);
    let quotient = dividend / divisor;
    let remainder = dividend - quotient * divisor;
    quotient as f64 + remainder as f64 / divisor as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        seen: u64,
    }

    impl Game for Counter {
        fn with_slots(_slots: u64) -> Self {
            Self { seen: 0 }
        }

        fn turn(&mut self, _slot: u64) -> u64 {
            self.seen += 1;
            self.seen
        }
    }

    #[test]
    fn test_play_sums_sizes() {
        let mut g = Counter::with_slots(8);
        let result = play(&mut g, [5, 5, 5, 5]);
        assert_eq!(result.sum_of_sizes, 1 + 2 + 3 + 4);
    }

    #[test]
    fn test_play_empty() {
        let mut g = Counter::with_slots(8);
        assert_eq!(play(&mut g, []), GameResult::default());
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(10, 4), 2.5);
        assert_eq!(ratio(0, 7), 0.0);
        assert_eq!(ratio(7, 7), 1.0);
        let big = (u64::MAX as u128) * 3 + 1;
        assert!((ratio(big, 3) - u64::MAX as f64).abs() <= 1.0);
    }
}

#[cfg(test)]
mod proptests;
