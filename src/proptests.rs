use crate::{MapConfig, SplitMap};

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Insert(#[proptest(strategy = "0u8..48")] u8, u32),
    Append(#[proptest(strategy = "0u8..48")] u8, u32),
    Remove(#[proptest(strategy = "0u8..48")] u8),
    Get(#[proptest(strategy = "0u8..48")] u8),
    BatchInsert(
        #[proptest(strategy = "prop::collection::vec((0u8..48, any::<u32>()), 0..12)")]
        Vec<(u8, u32)>,
    ),
    BatchAppend(
        #[proptest(strategy = "prop::collection::vec((0u8..48, any::<u32>()), 0..12)")]
        Vec<(u8, u32)>,
    ),
    Sort,
    DeepSort,
}

fn run_unique(
    t: &mut SplitMap<u8, u32>,
    m: &mut BTreeMap<u8, u32>,
    op: Op,
) -> std::result::Result<(), TestCaseError> {
    match op {
        Op::Insert(k, v) => {
            prop_assert_eq!(t.insert(k, v), m.insert(k, v));
        }
        Op::Append(k, v) => {
            prop_assert_eq!(t.append(k, v), m.insert(k, v));
        }
        Op::Remove(k) => {
            prop_assert_eq!(t.remove(&k), m.remove(&k));
        }
        Op::Get(k) => {
            prop_assert_eq!(t.get(&k), m.get(&k));
        }
        Op::BatchInsert(pairs) => {
            m.extend(pairs.iter().copied());
            t.batch_insert(pairs);
            prop_assert!(t.is_sorted());
        }
        Op::BatchAppend(pairs) => {
            m.extend(pairs.iter().copied());
            t.batch_append(pairs);
        }
        Op::Sort => {
            t.sort();
            prop_assert!(t.is_sorted());
        }
        Op::DeepSort => {
            t.deep_sort();
            prop_assert!(t.is_deep_sorted());
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_unique(ops in prop::collection::vec(any::<Op>(), 0..300)) {
        let mut t: SplitMap<u8, u32> = SplitMap::new();
        let mut m: BTreeMap<u8, u32> = BTreeMap::new();

        for op in ops {
            run_unique(&mut t, &mut m, op)?;
            t.assert_invariants();
            prop_assert_eq!(t.len(), m.len());
        }

        t.sort();
        let got: Vec<(u8, u32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u8, u32)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_key_counts_non_unique(ops in prop::collection::vec(any::<Op>(), 0..300)) {
        let config = MapConfig::new().with_unique_keys(false);
        let mut t: SplitMap<u8, u32> = SplitMap::with_config(config);
        let mut counts: BTreeMap<u8, usize> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    prop_assert_eq!(t.insert(k, v), None);
                    *counts.entry(k).or_default() += 1;
                }
                Op::Append(k, v) => {
                    prop_assert_eq!(t.append(k, v), None);
                    *counts.entry(k).or_default() += 1;
                }
                Op::Remove(k) => {
                    let removed = t.remove(&k);
                    match counts.get_mut(&k) {
                        Some(c) if *c > 0 => {
                            prop_assert!(removed.is_some());
                            *c -= 1;
                        }
                        _ => {
                            prop_assert!(removed.is_none());
                        }
                    }
                }
                Op::Get(k) => {
                    let present = counts.get(&k).is_some_and(|c| *c > 0);
                    prop_assert_eq!(t.contains_key(&k), present);
                }
                Op::BatchInsert(pairs) => {
                    for (k, _) in &pairs {
                        *counts.entry(*k).or_default() += 1;
                    }
                    t.batch_insert(pairs);
                }
                Op::BatchAppend(pairs) => {
                    for (k, _) in &pairs {
                        *counts.entry(*k).or_default() += 1;
                    }
                    t.batch_append(pairs);
                }
                Op::Sort => t.sort(),
                Op::DeepSort => t.deep_sort(),
            }
            t.assert_invariants();
        }

        let mut got: BTreeMap<u8, usize> = BTreeMap::new();
        for k in t.keys() {
            *got.entry(*k).or_default() += 1;
        }
        counts.retain(|_, c| *c > 0);
        prop_assert_eq!(got, counts);
    }

    #[test]
    fn prop_sort_and_deep_sort_idempotent(ops in prop::collection::vec(any::<Op>(), 0..200)) {
        let mut t: SplitMap<u8, u32> = SplitMap::new();
        let mut m: BTreeMap<u8, u32> = BTreeMap::new();
        for op in ops {
            run_unique(&mut t, &mut m, op)?;
        }

        t.sort();
        let keys: Vec<u8> = t.keys().copied().collect();
        t.sort();
        prop_assert_eq!(t.keys().copied().collect::<Vec<_>>(), keys);

        t.deep_sort();
        let values: Vec<u32> = t.values().copied().collect();
        t.deep_sort();
        prop_assert_eq!(t.values().copied().collect::<Vec<_>>(), values.clone());

        // Deep-sorted: physical value order is key order.
        let by_key: Vec<u32> = t.iter().map(|(_, v)| *v).collect();
        prop_assert_eq!(by_key, values);
        t.assert_invariants();
    }
}

#[test]
fn exhaustive_remove_order_every_flag_state() {
    let keys = [5u8, 1, 4, 2, 3];

    fn permutations(items: &[u8]) -> Vec<Vec<u8>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut out = Vec::new();
        for i in 0..items.len() {
            let mut rest = items.to_vec();
            let head = rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, head);
                out.push(tail);
            }
        }
        out
    }

    // Build the same content in each (sorted, deep-sorted) state.
    let builds: [fn(&[u8]) -> SplitMap<u8, u32>; 4] = [
        |keys| {
            let mut t = SplitMap::new();
            t.batch_append(keys.iter().map(|k| (*k, u32::from(*k) * 10)));
            t.sort();
            t.deep_sort();
            t
        },
        |keys| {
            let mut t = SplitMap::new();
            t.batch_append(keys.iter().map(|k| (*k, u32::from(*k) * 10)));
            t.sort();
            t
        },
        |keys| {
            let mut t = SplitMap::new();
            t.batch_append(keys.iter().map(|k| (*k, u32::from(*k) * 10)));
            t
        },
        |keys| {
            let mut t = SplitMap::new();
            t.batch_append(keys.iter().map(|k| (*k, u32::from(*k) * 10)));
            t.sort();
            t.append(keys[0], u32::from(keys[0]) * 10);
            t
        },
    ];

    for build in builds {
        let base = build(&keys);
        base.assert_invariants();
        for perm in permutations(&keys) {
            let mut t = base.clone();
            for (n, k) in perm.iter().enumerate() {
                assert_eq!(t.remove(k), Some(u32::from(*k) * 10));
                assert_eq!(t.get(k), None);
                assert_eq!(t.len(), keys.len() - n - 1);
                t.assert_invariants();
                for rest in &perm[n + 1..] {
                    assert_eq!(t.get(rest), Some(&(u32::from(*rest) * 10)));
                }
            }
            assert!(t.is_empty());
        }
    }
}
