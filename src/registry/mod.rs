//! Named algorithms and the rules deciding which slot counts each one runs at.
//!
//! Every entry is a monomorphized [`Game`] behind two plain function
//! pointers, so the timed loop runs fully inlined code with no per-turn
//! dynamic dispatch. The catalog order is the row order of the report.

use std::collections::{BTreeSet, HashSet, LinkedList, VecDeque};
use std::fmt;

use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;

use crate::alloc::{Boxed, ByValue, Colonized, Inline, Pooled, SlotAlloc, SlotHandle};
use crate::generator::SlotGenerator;
use crate::positional::{BitArray, BitWord, Bitmap, BoolVec, CellArray, Draws, FixedBits, OccupancyCell};
use crate::primitive::SlotValue;
use crate::sequence::{Sequence, Sorted, Unsorted, SMALL_INLINE};
use crate::set::{FlatSet, SentinelSetGame, SetBackend, SetGame};
use crate::{play, Game, GameResult};

/// Largest slot count any fixed-capacity bitset is built for.
pub const MAX_BITSET_SLOTS: u64 = 4 * 1024 * 1024;

/// Representation family of an algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Draws only, no collection.
    Generator,
    /// Array or bitmap indexed by slot.
    Positional,
    /// Linear scan, append on miss.
    SequenceUnsorted,
    /// Binary search, insert in order.
    SequenceSorted,
    /// Native associative set.
    Set,
}

impl Family {
    /// Whether the sequence ceiling applies.
    pub fn is_sequence(self) -> bool {
        matches!(self, Family::SequenceUnsorted | Family::SequenceSorted)
    }
}

/// Why a matrix cell is not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// The element width cannot hold `slots - 1`.
    Width {
        /// Largest slot the algorithm can store.
        max_slot: u64,
    },
    /// The width holds the slot, but it would collide with the values an
    /// open-addressing set reserves as empty and deleted markers.
    Sentinels {
        /// Largest slot below the reserved values.
        max_slot: u64,
    },
    /// Sequence algorithms are too slow above this slot count.
    SequenceCeiling {
        /// Configured ceiling.
        ceiling: u64,
    },
    /// The fixed-capacity bitset is too small.
    BitsetCapacity {
        /// Slots the bitset holds.
        capacity: u64,
    },
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::Width { max_slot } => write!(f, "width holds slots up to {max_slot}"),
            Skip::Sentinels { max_slot } => {
                write!(f, "sentinel keys reserve every slot above {max_slot}")
            }
            Skip::SequenceCeiling { ceiling } => write!(f, "sequence ceiling is {ceiling} slots"),
            Skip::BitsetCapacity { capacity } => write!(f, "bitset capacity is {capacity} slots"),
        }
    }
}

type RunFn = fn(u64, &mut SlotGenerator) -> GameResult;
type ReplayFn = fn(u64, &[u64]) -> GameResult;

fn run_cell<G: Game>(turns: u64, draws: &mut SlotGenerator) -> GameResult {
    let mut game = G::with_slots(draws.slots());
    play(&mut game, draws.by_ref().take(turns as usize))
}

fn replay_cell<G: Game>(slots: u64, draws: &[u64]) -> GameResult {
    let mut game = G::with_slots(slots);
    play(&mut game, draws.iter().copied())
}

/// One benchmarkable algorithm.
#[derive(Clone)]
pub struct Algorithm {
    /// Row label in the report.
    pub name: String,
    /// Representation family.
    pub family: Family,
    /// Largest storable slot, if the element width limits it.
    pub max_slot: Option<u64>,
    /// Largest slot clear of reserved sentinel keys, for open-addressing sets.
    pub sentinel_max_slot: Option<u64>,
    /// Fixed slot capacity, for compile-time sized bitsets.
    pub capacity: Option<u64>,
    run: RunFn,
    replay: ReplayFn,
}

impl fmt::Debug for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Algorithm")
            .field("name", &self.name)
            .field("family", &self.family)
            .field("max_slot", &self.max_slot)
            .field("sentinel_max_slot", &self.sentinel_max_slot)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl Algorithm {
    /// Wraps game type `G`.
    pub fn of<G: Game>(name: impl Into<String>, family: Family) -> Self {
        Self {
            name: name.into(),
            family,
            max_slot: None,
            sentinel_max_slot: None,
            capacity: None,
            run: run_cell::<G>,
            replay: replay_cell::<G>,
        }
    }

    /// Limits the largest storable slot.
    pub fn with_max_slot(mut self, max_slot: u64) -> Self {
        self.max_slot = Some(max_slot);
        self
    }

    /// Limits slots to those below the reserved sentinel keys.
    pub fn with_sentinel_max_slot(mut self, max_slot: u64) -> Self {
        self.sentinel_max_slot = Some(max_slot);
        self
    }

    /// Sets a fixed slot capacity.
    pub fn with_capacity(mut self, capacity: u64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Checks the pruning rules in priority order: width, then sentinel
    /// headroom, then sequence ceiling, then bitset capacity.
    pub fn admits(&self, slots: u64, max_sequence_slots: u64) -> Result<(), Skip> {
        let top = slots.saturating_sub(1);
        if let Some(max_slot) = self.max_slot {
            if top > max_slot {
                return Err(Skip::Width { max_slot });
            }
        }
        if let Some(max_slot) = self.sentinel_max_slot {
            if top > max_slot {
                return Err(Skip::Sentinels { max_slot });
            }
        }
        if self.family.is_sequence() && slots > max_sequence_slots {
            return Err(Skip::SequenceCeiling {
                ceiling: max_sequence_slots,
            });
        }
        if let Some(capacity) = self.capacity {
            if slots > capacity {
                return Err(Skip::BitsetCapacity { capacity });
            }
        }
        Ok(())
    }

    /// Plays `turns` draws from `draws` against a fresh game sized to the
    /// generator. Construction and teardown of the game are included.
    #[inline]
    pub fn run(&self, turns: u64, draws: &mut SlotGenerator) -> GameResult {
        (self.run)(turns, draws)
    }

    /// Plays a fixed draw sequence against a fresh game over `slots`.
    pub fn replay(&self, slots: u64, draws: &[u64]) -> GameResult {
        (self.replay)(slots, draws)
    }
}

/// Ordered list of algorithms.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    algorithms: Vec<Algorithm>,
}

impl Catalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every algorithm this crate ships, in report order: the generator
    /// baseline, the positional family, then per element width and per
    /// allocation strategy the sequences followed by the sets.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog.push(Algorithm::of::<Draws>("generator", Family::Generator));
        catalog.positional();
        catalog.width::<i8>();
        catalog.width::<u8>();
        catalog.width::<i16>();
        catalog.width::<u16>();
        catalog.width::<i32>();
        catalog.width::<u32>();
        catalog.width::<i64>();
        catalog.width::<u64>();
        catalog
    }

    /// Appends `algorithm`.
    pub fn push(&mut self, algorithm: Algorithm) {
        self.algorithms.push(algorithm);
    }

    /// Algorithm by row label.
    pub fn get(&self, name: &str) -> Option<&Algorithm> {
        self.algorithms.iter().find(|a| a.name == name)
    }

    /// Algorithms in report order.
    pub fn iter(&self) -> std::slice::Iter<'_, Algorithm> {
        self.algorithms.iter()
    }

    /// Keeps only algorithms for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&Algorithm) -> bool) {
        self.algorithms.retain(keep);
    }

    /// Number of algorithms.
    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }

    fn positional(&mut self) {
        self.bitmap::<u8>();
        self.bitmap::<i8>();
        self.bitmap::<u16>();
        self.bitmap::<i16>();
        self.bitmap::<u32>();
        self.bitmap::<i32>();
        self.bitmap::<u64>();
        self.bitmap::<i64>();

        self.cells::<u8>();
        self.cells::<i8>();
        self.cells::<u16>();
        self.cells::<i16>();
        self.cells::<u32>();
        self.cells::<i32>();
        self.cells::<u64>();
        self.cells::<i64>();
        self.cells::<u128>();

        self.push(Algorithm::of::<BoolVec>("positional<Vec<bool>>", Family::Positional));
        self.push(Algorithm::of::<FixedBits>("positional<FixedBitSet>", Family::Positional));

        self.bit_array::<1>();
        self.bit_array::<64>();
        self.bit_array::<4096>();
        self.bit_array::<65536>();
    }

    fn bitmap<W: BitWord>(&mut self) {
        self.push(Algorithm::of::<Bitmap<W>>(
            format!("bitmap<{}>", W::NAME),
            Family::Positional,
        ));
    }

    fn cells<C: OccupancyCell>(&mut self) {
        self.push(Algorithm::of::<CellArray<C>>(
            format!("positional<Box<[{}]>>", C::NAME),
            Family::Positional,
        ));
    }

    fn bit_array<const WORDS: usize>(&mut self) {
        let capacity = BitArray::<WORDS>::CAPACITY;
        debug_assert!(capacity <= MAX_BITSET_SLOTS);
        self.push(
            Algorithm::of::<BitArray<WORDS>>(
                format!("positional<BitArray<{capacity}>>"),
                Family::Positional,
            )
            .with_capacity(capacity),
        );
    }

    fn width<P>(&mut self)
    where
        P: SlotValue + SlotHandle<Value = P>,
    {
        self.containers::<Inline<P>>();
        self.open_set::<Inline<P>>();
        self.containers::<Boxed<P>>();
        self.containers::<Pooled<P>>();
        self.open_set::<Pooled<P>>();
        self.containers::<Colonized<P>>();
        self.open_set::<Colonized<P>>();
    }

    fn containers<A: SlotAlloc>(&mut self) {
        self.sequences::<Vec<A::Handle>, A>();
        self.sequences::<VecDeque<A::Handle>, A>();
        self.sequences::<LinkedList<A::Handle>, A>();
        self.sequences::<SmallVec<[A::Handle; SMALL_INLINE]>, A>();

        self.set::<BTreeSet<ByValue<A::Handle>>, A>();
        self.set::<HashSet<ByValue<A::Handle>>, A>();
        self.set::<HashSet<ByValue<A::Handle>, FxBuildHasher>, A>();
        self.set::<hashbrown::HashSet<ByValue<A::Handle>>, A>();
        self.set::<FlatSet<ByValue<A::Handle>>, A>();
    }

    fn sequences<S, A>(&mut self)
    where
        S: Sequence<A::Handle>,
        A: SlotAlloc,
    {
        let element = format!("{}<{}>", S::NAME, A::label());
        self.push(
            Algorithm::of::<Unsorted<S, A>>(
                format!("sequence-unsorted<{element}>"),
                Family::SequenceUnsorted,
            )
            .with_max_slot(A::Value::MAX_SLOT),
        );
        self.push(
            Algorithm::of::<Sorted<S, A>>(
                format!("sequence-sorted<{element}>"),
                Family::SequenceSorted,
            )
            .with_max_slot(A::Value::MAX_SLOT),
        );
    }

    fn set<S, A>(&mut self)
    where
        S: SetBackend<ByValue<A::Handle>> + Default,
        A: SlotAlloc,
    {
        self.push(
            Algorithm::of::<SetGame<S, A>>(
                format!("set<{}<{}>>", S::NAME, A::label()),
                Family::Set,
            )
            .with_max_slot(A::Value::MAX_SLOT),
        );
    }

    fn open_set<A>(&mut self)
    where
        A: SlotAlloc,
        A::Handle: Copy,
    {
        self.push(
            Algorithm::of::<SentinelSetGame<A>>(format!("set<OpenSet<{}>>", A::label()), Family::Set)
                .with_max_slot(A::Value::MAX_SLOT)
                .with_sentinel_max_slot(A::Value::max_slot_clear_of_sentinels()),
        );
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Algorithm;
    type IntoIter = std::slice::Iter<'a, Algorithm>;

    fn into_iter(self) -> Self::IntoIter {
        self.algorithms.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet as StdHashSet;

    #[test]
    fn test_standard_names_unique() {
        let catalog = Catalog::standard();
        let names: StdHashSet<&str> = catalog.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names.len(), catalog.len());
    }

    #[test]
    fn test_standard_order() {
        let catalog = Catalog::standard();
        let mut iter = catalog.iter();
        assert_eq!(iter.next().map(|a| a.family), Some(Family::Generator));
        // The positional family comes before any width-specific row.
        let families: Vec<Family> = catalog.iter().map(|a| a.family).collect();
        let last_positional = families.iter().rposition(|f| *f == Family::Positional);
        let first_other = families
            .iter()
            .position(|f| !matches!(f, Family::Generator | Family::Positional));
        assert!(last_positional < first_other);
    }

    #[test]
    fn test_standard_labels() {
        let catalog = Catalog::standard();
        for name in [
            "generator",
            "bitmap<u8>",
            "bitmap<i64>",
            "positional<Box<[u128]>>",
            "positional<Vec<bool>>",
            "positional<FixedBitSet>",
            "positional<BitArray<64>>",
            "positional<BitArray<4194304>>",
            "sequence-unsorted<Vec<i8>>",
            "sequence-sorted<LinkedList<Box<u16>>>",
            "sequence-unsorted<SmallVec<Pooled<i32>>>",
            "sequence-sorted<VecDeque<Colony<u64>>>",
            "set<BTreeSet<Box<u32>>>",
            "set<HashSet<u8>>",
            "set<FxHashSet<Pooled<i16>>>",
            "set<hashbrown::HashSet<Colony<i64>>>",
            "set<FlatSet<u64>>",
            "set<OpenSet<Pooled<u8>>>",
        ] {
            assert!(catalog.get(name).is_some(), "missing {name}");
        }
        // Boxed handles are not Copy, so no open-addressing row exists for them.
        assert!(catalog.get("set<OpenSet<Box<u8>>>").is_none());
    }

    #[test]
    fn test_admits_width() {
        let catalog = Catalog::standard();
        let i8_set = catalog.get("set<BTreeSet<i8>>").unwrap();
        assert_eq!(i8_set.admits(128, 4096), Ok(()));
        assert_eq!(i8_set.admits(129, 4096), Err(Skip::Width { max_slot: 127 }));

        let u8_set = catalog.get("set<HashSet<u8>>").unwrap();
        assert_eq!(u8_set.admits(256, 4096), Ok(()));
        assert!(u8_set.admits(257, 4096).is_err());
    }

    #[test]
    fn test_admits_sentinel_ceiling() {
        let catalog = Catalog::standard();
        let open_u8 = catalog.get("set<OpenSet<u8>>").unwrap();
        assert_eq!(open_u8.admits(254, 4096), Ok(()));
        assert_eq!(open_u8.admits(255, 4096), Err(Skip::Sentinels { max_slot: 253 }));
        assert_eq!(open_u8.admits(256, 4096), Err(Skip::Sentinels { max_slot: 253 }));
        // Width is checked first.
        assert_eq!(open_u8.admits(300, 4096), Err(Skip::Width { max_slot: 255 }));
        assert_eq!(
            Skip::Sentinels { max_slot: 253 }.to_string(),
            "sentinel keys reserve every slot above 253"
        );
        // Signed sentinels are negative, so the full positive range is usable.
        let open_i8 = catalog.get("set<OpenSet<i8>>").unwrap();
        assert_eq!(open_i8.admits(128, 4096), Ok(()));
    }

    #[test]
    fn test_admits_priority() {
        let catalog = Catalog::standard();
        let seq = catalog.get("sequence-sorted<Vec<u8>>").unwrap();
        assert_eq!(seq.admits(4096, 4096), Err(Skip::Width { max_slot: 255 }));
        let seq = catalog.get("sequence-sorted<Vec<u16>>").unwrap();
        assert_eq!(seq.admits(4096, 4096), Ok(()));
        assert_eq!(
            seq.admits(4097, 4096),
            Err(Skip::SequenceCeiling { ceiling: 4096 })
        );
        assert_eq!(seq.admits(70_000, 4096), Err(Skip::Width { max_slot: 65535 }));
    }

    #[test]
    fn test_admits_bitset_capacity() {
        let catalog = Catalog::standard();
        let small = catalog.get("positional<BitArray<4096>>").unwrap();
        assert_eq!(small.admits(4096, 0), Ok(()));
        assert_eq!(
            small.admits(4097, 0),
            Err(Skip::BitsetCapacity { capacity: 4096 })
        );
        // Positional rows ignore the sequence ceiling.
        let bitmap = catalog.get("bitmap<u8>").unwrap();
        assert_eq!(bitmap.admits(262_144, 0), Ok(()));
    }

    #[test]
    fn test_run_and_replay_agree() {
        let catalog = Catalog::standard();
        let algorithm = catalog.get("set<FxHashSet<Colony<u16>>>").unwrap();
        let mut draws = SlotGenerator::with_seed(50, 7);
        let recorded: Vec<u64> = draws.clone().take(300).collect();
        assert_eq!(algorithm.run(300, &mut draws), algorithm.replay(50, &recorded));
    }

    #[test]
    fn test_retain() {
        let mut catalog = Catalog::standard();
        catalog.retain(|a| a.family == Family::Positional);
        assert!(catalog.iter().all(|a| a.family == Family::Positional));
        assert!(!catalog.is_empty());
    }
}
