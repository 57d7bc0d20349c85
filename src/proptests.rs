use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{BTreeMap, BTreeSet, HashMap, LinkedList};

use crate::alloc::{Boxed, ByValue, ColonyHandle, Colonized, Colony, Inline, PoolPtr, Pooled, SlotAlloc};
use crate::bench::DISTRIBUTION;
use crate::positional::{Bitmap, BoolVec, FixedBits};
use crate::report::write_table;
use crate::primitive::SlotValue;
use crate::sequence::{Sequence, Sorted, Unsorted};
use crate::set::{FlatSet, SentinelSetGame, SetGame};

/// Sum of post-turn sizes predicted from occurrence parity alone.
fn parity_model(draws: &[u64]) -> GameResult {
    let mut on = BTreeSet::new();
    let mut sum_of_sizes = 0;
    for &d in draws {
        if !on.remove(&d) {
            on.insert(d);
        }
        sum_of_sizes += on.len() as u64;
    }
    GameResult { sum_of_sizes }
}

fn draws_strategy() -> impl Strategy<Value = (u64, Vec<u64>)> {
    prop_oneof![Just(1u64), Just(2u64), 3u64..=128]
        .prop_flat_map(|slots| (Just(slots), prop::collection::vec(0..slots, 0..=300)))
}

#[derive(Clone, Debug, Arbitrary)]
enum Step {
    Draw(#[proptest(strategy = "0u64..32")] u64),
    /// Toggle the previous slot again.
    Again,
}

/// Checks that toggling the same slot twice in a row restores the size.
fn double_toggle_restores<G: Game>(steps: &[Step]) -> std::result::Result<(), TestCaseError> {
    let mut game = G::with_slots(32);
    let mut size = 0u64;
    // Previous slot and the size just before it was toggled.
    let mut last: Option<(u64, u64)> = None;
    for step in steps {
        let slot = match (step, last) {
            (Step::Draw(slot), _) => *slot,
            (Step::Again, Some((slot, before))) => {
                let after = game.turn(slot);
                prop_assert_eq!(after, before);
                last = Some((slot, size));
                size = after;
                continue;
            }
            (Step::Again, None) => continue,
        };
        let after = game.turn(slot);
        prop_assert!(after == size + 1 || after + 1 == size);
        last = Some((slot, size));
        size = after;
    }
    Ok(())
}

/// Like [`double_toggle_restores`], but compares the stored values: the pair
/// must leave exactly the contents it found, and every turn must match a
/// `BTreeSet` model.
fn double_toggle_restores_values<S, A>(steps: &[Step]) -> std::result::Result<(), TestCaseError>
where
    S: Sequence<A::Handle>,
    A: SlotAlloc,
{
    let mut game = Sorted::<S, A>::with_slots(32);
    let mut model = BTreeSet::new();
    let mut last: Option<(u64, Vec<A::Value>)> = None;
    for step in steps {
        let slot = match (step, &last) {
            (Step::Draw(slot), _) => *slot,
            (Step::Again, Some((slot, _))) => *slot,
            (Step::Again, None) => continue,
        };
        let before = game.values();
        game.turn(slot);
        if !model.remove(&slot) {
            model.insert(slot);
        }
        let expected: Vec<A::Value> = model.iter().map(|&s| A::Value::from_slot(s)).collect();
        prop_assert_eq!(game.values(), expected);
        if let (Step::Again, Some((_, earlier))) = (step, &last) {
            prop_assert_eq!(&game.values(), earlier);
        }
        last = Some((slot, before));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 24,
        max_shrink_iters: 2_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_parity_every_algorithm((slots, draws) in draws_strategy()) {
        let expected = parity_model(&draws);
        let catalog = Catalog::standard();
        for algorithm in &catalog {
            if algorithm.admits(slots, u64::MAX).is_err() {
                continue;
            }
            let got = algorithm.replay(slots, &draws);
            if algorithm.family == Family::Generator {
                prop_assert_eq!(got.sum_of_sizes, draws.iter().sum::<u64>());
            } else {
                prop_assert_eq!(got, expected, "{}", algorithm.name);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_double_toggle(steps in prop::collection::vec(any::<Step>(), 0..=200)) {
        double_toggle_restores::<Bitmap<u8>>(&steps)?;
        double_toggle_restores::<FixedBits>(&steps)?;
        double_toggle_restores::<Unsorted<Vec<Box<i8>>, Boxed<i8>>>(&steps)?;
        double_toggle_restores::<Sorted<Vec<ColonyHandle<u16>>, Colonized<u16>>>(&steps)?;
        double_toggle_restores::<SetGame<FlatSet<ByValue<u32>>, Inline<u32>>>(&steps)?;
        double_toggle_restores::<SentinelSetGame<Pooled<u8>>>(&steps)?;
    }

    #[test]
    fn prop_double_toggle_restores_contents(steps in prop::collection::vec(any::<Step>(), 0..=200)) {
        double_toggle_restores_values::<Vec<u8>, Inline<u8>>(&steps)?;
        double_toggle_restores_values::<LinkedList<PoolPtr<i16>>, Pooled<i16>>(&steps)?;
        double_toggle_restores_values::<Vec<ColonyHandle<u32>>, Colonized<u32>>(&steps)?;
    }

    #[test]
    fn prop_bitmap_matches_set(slots in 1u64..=5_000, seed in any::<u64>(), turns in 0u64..=2_000) {
        let catalog = Catalog::standard();
        let bitmap = catalog.get("bitmap<u64>").unwrap();
        let set = catalog.get("set<BTreeSet<Box<u16>>>").unwrap();
        let a = bitmap.run(turns, &mut SlotGenerator::with_seed(slots, seed));
        let b = set.run(turns, &mut SlotGenerator::with_seed(slots, seed));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_colony_tracks_model(ops in prop::collection::vec((any::<bool>(), any::<i32>()), 0..=500)) {
        let mut colony: Colony<i32> = Colony::new();
        let mut handles = Vec::new();
        let mut model: HashMap<u32, i32> = HashMap::new();
        for (i, (insert, value)) in ops.into_iter().enumerate() {
            if insert || handles.is_empty() {
                let h = colony.insert(value);
                handles.push((i as u32, h));
                model.insert(i as u32, value);
            } else {
                let (id, h) = handles.swap_remove(value.unsigned_abs() as usize % handles.len());
                prop_assert_eq!(colony.erase(h), model[&id]);
                model.remove(&id);
            }
            prop_assert_eq!(colony.len(), model.len());
        }
        for (id, h) in &handles {
            prop_assert_eq!(colony.get(*h), Some(model[id]));
        }
        let mut live: Vec<i32> = colony.iter().collect();
        let mut expected: Vec<i32> = model.values().copied().collect();
        live.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(live, expected);
    }

    #[test]
    fn prop_table_shape(
        coverage in prop::collection::btree_map("[a-z]{1,8}", prop::collection::btree_set(0usize..4, 1..4), 1..=6),
    ) {
        let series = [64u64, 4096, 262144, 1 << 20];
        let mut table = ResultsTable::new();
        for (name, columns) in &coverage {
            for &c in columns {
                table.record(1024, DISTRIBUTION, name, series[c], c as f64 + 0.5);
            }
        }

        let mut out = Vec::new();
        write_table(&mut out, &table, &series).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        prop_assert_eq!(lines.len(), coverage.len() + 1);

        let header_columns = lines[0].split('|').count();
        prop_assert_eq!(header_columns, 3 + series.len());
        for line in &lines[1..] {
            let fields: Vec<&str> = line.split('|').collect();
            prop_assert_eq!(fields.len(), header_columns);
            let columns = &coverage[fields[2]];
            for (c, field) in fields[3..].iter().enumerate() {
                prop_assert_eq!(field.is_empty(), !columns.contains(&c));
            }
        }
    }
}

#[test]
fn scripted_end_to_end() {
    // 12 full passes over the script plus [0, 1, 0, 2].
    let script = [0, 1, 0, 2, 3, 1, 2, 0];
    let draws: Vec<u64> = script.iter().copied().cycle().take(100).collect();

    // Every 16 draws the set returns to empty after sizes summing to 14 + 16.
    let expected = GameResult {
        sum_of_sizes: 6 * (14 + 16) + (1 + 2 + 1 + 2),
    };
    assert_eq!(parity_model(&draws), expected);

    let catalog = Catalog::standard();
    for name in [
        "positional<Vec<bool>>",
        "bitmap<u8>",
        "positional<BitArray<64>>",
        "sequence-sorted<Vec<u8>>",
        "sequence-sorted<LinkedList<Colony<i16>>>",
        "set<OpenSet<i8>>",
    ] {
        let algorithm = catalog.get(name).unwrap();
        assert_eq!(algorithm.replay(4, &draws), expected, "{name}");
    }

    let mut positional = BoolVec::with_slots(4);
    let mut sorted = Sorted::<Vec<u8>, Inline<u8>>::with_slots(4);
    assert_eq!(play(&mut positional, draws.iter().copied()), expected);
    assert_eq!(play(&mut sorted, draws.iter().copied()), expected);
    assert_eq!(sorted.values(), vec![1, 2]);
}

#[test]
fn pruned_cells_leave_blanks() {
    let mut catalog = Catalog::standard();
    catalog.retain(|a| a.name.starts_with("set<BTreeSet<"));
    let config = BenchConfig {
        turns: 32,
        slot_series: vec![64, 256],
        ..Default::default()
    };
    let matrix = Matrix::with_catalog(config, catalog).unwrap();
    let mut table = ResultsTable::new();
    matrix.run(&mut table, &mut std::io::sink()).unwrap();

    let rows: BTreeMap<&str, &BenchmarkRecord> = table
        .records()
        .iter()
        .map(|r| (r.algorithm.as_str(), r))
        .collect();
    let i8_row = rows["set<BTreeSet<i8>>"];
    assert!(i8_row.slots_to_ns.contains_key(&64));
    assert!(!i8_row.slots_to_ns.contains_key(&256));
    assert!(rows["set<BTreeSet<u8>>"].slots_to_ns.contains_key(&256));
    assert!(rows["set<BTreeSet<Pooled<i8>>>"].slots_to_ns.get(&256).is_none());

    let mut out = Vec::new();
    write_table(&mut out, &table, &[64, 256]).unwrap();
    let text = String::from_utf8(out).unwrap();
    let i8_line = text
        .lines()
        .find(|l| l.split('|').nth(2) == Some("set<BTreeSet<i8>>"))
        .unwrap();
    assert!(i8_line.ends_with('|'));
    assert_eq!(i8_line.split('|').count(), 5);
}

#[test]
fn single_slot_generator_terminates() {
    let catalog = Catalog::standard();
    let mut draws = SlotGenerator::new(1);
    let result = catalog.get("set<HashSet<u8>>").unwrap().run(11, &mut draws);
    // Alternates 1, 0, 1, ...
    assert_eq!(result.sum_of_sizes, 6);
}
