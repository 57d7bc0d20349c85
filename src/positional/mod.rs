//! Positional representations: one cell or bit per slot, indexed by the slot
//! value itself. Only occupancy is recorded, never a handle.
//!
//! Also hosts [`Draws`], the generator-only baseline that touches no
//! collection at all.

use std::ops::{BitAnd, BitXorAssign, Shl};

use fixedbitset::FixedBitSet;

use crate::Game;

/// Generator-only baseline: reports the drawn slot instead of a size, so
/// the game result is the sum of all draws.
#[derive(Debug, Default)]
pub struct Draws;

impl Game for Draws {
    fn with_slots(_slots: u64) -> Self {
        Draws
    }

    #[inline]
    fn turn(&mut self, slot: u64) -> u64 {
        slot
    }
}

#[inline]
fn step(size: &mut i64, was_on: bool) -> u64 {
    *size += if was_on { -1 } else { 1 };
    *size as u64
}

/// Integer used as a boolean occupancy cell.
pub trait OccupancyCell: Copy + Default + Eq + BitXorAssign {
    /// Type name used in labels.
    const NAME: &'static str;
    /// The "on" bit.
    const ONE: Self;
}

/// Integer word packing one occupancy bit per slot.
pub trait BitWord: Copy + Eq + BitAnd<Output = Self> + BitXorAssign + Shl<u32, Output = Self> {
    /// Type name used in labels.
    const NAME: &'static str;
    /// Bits per word.
    const BITS: u64;
    /// All bits clear.
    const ZERO: Self;
    /// Lowest bit set.
    const ONE: Self;
}

macro_rules! impl_words {
    ($($t:ty),*) => {$(
        impl OccupancyCell for $t {
            const NAME: &'static str = stringify!($t);
            const ONE: Self = 1;
        }

        impl BitWord for $t {
            const NAME: &'static str = stringify!($t);
            const BITS: u64 = <$t>::BITS as u64;
            const ZERO: Self = 0;
            const ONE: Self = 1;
        }
    )*};
}

impl_words!(u8, i8, u16, i16, u32, i32, u64, i64, u128);

/// A pre-allocated array with one integer cell per slot.
#[derive(Debug)]
pub struct CellArray<C> {
    cells: Box<[C]>,
    size: i64,
}

impl<C: OccupancyCell> Game for CellArray<C> {
    fn with_slots(slots: u64) -> Self {
        Self {
            cells: vec![C::default(); slots as usize].into_boxed_slice(),
            size: 0,
        }
    }

    #[inline]
    fn turn(&mut self, slot: u64) -> u64 {
        let cell = &mut self.cells[slot as usize];
        let was_on = *cell != C::default();
        *cell ^= C::ONE;
        step(&mut self.size, was_on)
    }
}

/// Bit-packed occupancy in words of `W`.
#[derive(Debug)]
pub struct Bitmap<W> {
    words: Box<[W]>,
    size: i64,
}

impl<W: BitWord> Game for Bitmap<W> {
    fn with_slots(slots: u64) -> Self {
        let len = slots.div_ceil(W::BITS) as usize;
        Self {
            words: vec![W::ZERO; len].into_boxed_slice(),
            size: 0,
        }
    }

    #[inline]
    fn turn(&mut self, slot: u64) -> u64 {
        let index = slot / W::BITS;
        let mask = W::ONE << (slot - index * W::BITS) as u32;
        let word = &mut self.words[index as usize];
        let was_on = (*word & mask) != W::ZERO;
        *word ^= mask;
        step(&mut self.size, was_on)
    }
}

/// `Vec<bool>` occupancy.
#[derive(Debug)]
pub struct BoolVec {
    cells: Vec<bool>,
    size: i64,
}

impl Game for BoolVec {
    fn with_slots(slots: u64) -> Self {
        Self {
            cells: vec![false; slots as usize],
            size: 0,
        }
    }

    #[inline]
    fn turn(&mut self, slot: u64) -> u64 {
        let cell = &mut self.cells[slot as usize];
        let was_on = *cell;
        *cell = !was_on;
        step(&mut self.size, was_on)
    }
}

/// Growable bit vector from `fixedbitset`.
#[derive(Debug)]
pub struct FixedBits {
    bits: FixedBitSet,
    size: i64,
}

impl Game for FixedBits {
    fn with_slots(slots: u64) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(slots as usize),
            size: 0,
        }
    }

    #[inline]
    fn turn(&mut self, slot: u64) -> u64 {
        let index = slot as usize;
        let was_on = self.bits.contains(index);
        self.bits.toggle(index);
        step(&mut self.size, was_on)
    }
}

/// Bitset whose capacity is fixed at compile time: `WORDS * 64` slots.
#[derive(Debug)]
pub struct BitArray<const WORDS: usize> {
    words: Box<[u64; WORDS]>,
    size: i64,
}

impl<const WORDS: usize> BitArray<WORDS> {
    /// Slots this bitset can address.
    pub const CAPACITY: u64 = WORDS as u64 * 64;
}

impl<const WORDS: usize> Game for BitArray<WORDS> {
    fn with_slots(slots: u64) -> Self {
        debug_assert!(slots <= Self::CAPACITY, "{slots} slots exceed bitset capacity");
        // Built on the heap; large arrays would overflow the stack.
        let words = vec![0u64; WORDS]
            .into_boxed_slice()
            .try_into()
            .unwrap_or_else(|_| unreachable!("boxed slice has exactly WORDS words"));
        Self { words, size: 0 }
    }

    #[inline]
    fn turn(&mut self, slot: u64) -> u64 {
        let word = &mut self.words[(slot / 64) as usize];
        let mask = 1u64 << (slot % 64);
        let was_on = *word & mask != 0;
        *word ^= mask;
        step(&mut self.size, was_on)
    }
}
