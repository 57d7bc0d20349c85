//! Integer widths a slot value can be stored as.
//!
//! A width is only usable for a given slot count when it can represent every
//! address in `[0, slots)`; the registry prunes the rest before anything runs.

use std::fmt::Debug;
use std::hash::Hash;

/// A fixed-width integer holding one slot address.
pub trait SlotValue: Copy + Default + Ord + Hash + Debug + 'static {
    /// Type name used in algorithm labels.
    const NAME: &'static str;

    /// Largest slot address the type represents.
    const MAX_SLOT: u64;

    /// Narrows a drawn slot. The caller guarantees `slot <= MAX_SLOT`.
    fn from_slot(slot: u64) -> Self;

    /// The slot address held by this value, `None` when negative.
    fn slot(self) -> Option<u64>;

    /// Two distinct values reserved as `[empty, deleted]` markers by
    /// open-addressing sets, taken from the far end of the range.
    fn sentinels() -> [Self; 2];

    /// Whether every address in `[0, slots)` fits.
    #[inline]
    fn addresses(slots: u64) -> bool {
        slots.saturating_sub(1) <= Self::MAX_SLOT
    }

    /// Largest slot address that cannot collide with either sentinel.
    fn max_slot_clear_of_sentinels() -> u64 {
        Self::sentinels()
            .iter()
            .filter_map(|s| s.slot())
            .min()
            .map_or(Self::MAX_SLOT, |lowest| lowest - 1)
            .min(Self::MAX_SLOT)
    }
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {$(
        impl SlotValue for $t {
            const NAME: &'static str = stringify!($t);
            const MAX_SLOT: u64 = <$t>::MAX as u64;

            #[inline]
            fn from_slot(slot: u64) -> Self {
                slot as $t
            }

            #[inline]
            fn slot(self) -> Option<u64> {
                Some(self as u64)
            }

            fn sentinels() -> [Self; 2] {
                [<$t>::MAX, <$t>::MAX - 1]
            }
        }
    )*};
}

macro_rules! impl_signed {
    ($($t:ty),*) => {$(
        impl SlotValue for $t {
            const NAME: &'static str = stringify!($t);
            const MAX_SLOT: u64 = <$t>::MAX as u64;

            #[inline]
            fn from_slot(slot: u64) -> Self {
                slot as $t
            }

            #[inline]
            fn slot(self) -> Option<u64> {
                if self < 0 {
                    None
                } else {
                    Some(self as u64)
                }
            }

            fn sentinels() -> [Self; 2] {
                [<$t>::MIN, <$t>::MIN + 1]
            }
        }
    )*};
}

impl_unsigned!(u8, u16, u32, u64);
impl_signed!(i8, i16, i32, i64);
