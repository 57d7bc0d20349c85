//! Uniform slot draws.
//!
//! The generator is seeded, so two generators with the same seed and slot
//! count produce identical sequences. That is what lets different algorithms
//! be fed the same draws and compared on their [`GameResult`](crate::GameResult).

use rand::distributions::{Distribution, Uniform};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 5489;

/// Draws slots uniformly from `[0, slots)`.
#[derive(Debug, Clone)]
pub struct SlotGenerator {
    rng: SmallRng,
    distribution: Uniform<u64>,
    slots: u64,
}

impl SlotGenerator {
    /// Generator over `[0, slots)` with [`DEFAULT_SEED`].
    pub fn new(slots: u64) -> Self {
        Self::with_seed(slots, DEFAULT_SEED)
    }

    /// Generator over `[0, slots)` with an explicit seed.
    ///
    /// # Panics
    /// Panics if `slots` is zero.
    pub fn with_seed(slots: u64, seed: u64) -> Self {
        assert!(slots > 0, "slot generator needs at least one slot");
        Self {
            rng: SmallRng::seed_from_u64(seed),
            distribution: Uniform::new(0, slots),
            slots,
        }
    }

    /// Exclusive upper bound of the draws.
    pub fn slots(&self) -> u64 {
        self.slots
    }

    /// Next slot.
    #[inline]
    pub fn draw(&mut self) -> u64 {
        self.distribution.sample(&mut self.rng)
    }
}

impl Iterator for SlotGenerator {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<u64> {
        Some(self.draw())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_draws_in_range() {
        let mut g = SlotGenerator::new(64);
        for _ in 0..10_000 {
            assert!(g.draw() < 64);
        }
    }

    #[test]
    fn test_single_slot() {
        let g = SlotGenerator::new(1);
        assert!(g.take(1000).all(|s| s == 0));
    }

    #[test]
    fn test_two_slots_hits_both() {
        let seen: HashSet<u64> = SlotGenerator::new(2).take(1000).collect();
        assert_eq!(seen.len(), 2);
    }

    #[test]
    #[should_panic(expected = "at least one slot")]
    fn test_zero_slots_rejected() {
        let _ = SlotGenerator::new(0);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a: Vec<u64> = SlotGenerator::with_seed(1000, 7).take(256).collect();
        let b: Vec<u64> = SlotGenerator::with_seed(1000, 7).take(256).collect();
        let c: Vec<u64> = SlotGenerator::with_seed(1000, 8).take(256).collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_toggle_occupancy_near_half() {
        // Long toggle runs settle around 50% occupancy for a uniform source.
        let slots = 256u64;
        let mut on = vec![false; slots as usize];
        let mut size = 0i64;
        let mut sum = 0i64;
        let turns = 200_000;
        for s in SlotGenerator::new(slots).take(turns) {
            let cell = &mut on[s as usize];
            size += if *cell { -1 } else { 1 };
            *cell = !*cell;
            sum += size;
        }
        let fill = sum as f64 / turns as f64 / slots as f64;
        assert!((0.4..0.6).contains(&fill), "fill ratio {fill}");
    }
}
