//! Test-support macros.

/// Generate a workload test battery for each listed order. Rebalancing
/// behavior shifts with node capacity (odd orders split asymmetrically,
/// large orders rarely cascade), so the same scenarios run at several.
#[cfg(test)]
macro_rules! order_battery {
    ($($order:literal),+ $(,)?) => {
        $(
            paste::paste! {
                #[test]
                fn [<test_sequential_fill_and_drain_order_ $order>]() {
                    let mut index = $crate::OrderedIndex::new($order).unwrap();
                    let count = $order * 25;
                    for k in 0..count {
                        assert_eq!(index.insert(k, k * 3).unwrap(), None);
                    }
                    index.check_invariants_detailed().unwrap();
                    assert_eq!(index.len(), count);

                    for k in 0..count {
                        assert_eq!(index.remove(&k).unwrap(), Some(k * 3));
                        index.check_invariants_detailed().unwrap();
                    }
                    assert!(index.is_empty());
                }

                #[test]
                fn [<test_mixed_workload_order_ $order>]() {
                    let mut index = $crate::OrderedIndex::new($order).unwrap();
                    let count = $order * 25;

                    // Striped insert order exercises splits at both ends.
                    for k in (0..count).step_by(2) {
                        index.insert(k, k).unwrap();
                    }
                    let mut odd_keys: Vec<usize> = (1..count).step_by(2).collect();
                    odd_keys.reverse();
                    for k in odd_keys {
                        index.insert(k, k).unwrap();
                    }
                    index.check_invariants_detailed().unwrap();

                    for k in (0..count).step_by(3) {
                        index.remove(&k).unwrap();
                    }
                    index.check_invariants_detailed().unwrap();

                    for k in 0..count {
                        let expected = if k % 3 == 0 { None } else { Some(&k) };
                        assert_eq!(index.get(&k), expected, "key {}", k);
                    }

                    let keys: Vec<usize> = index.keys().copied().collect();
                    let expected: Vec<usize> = (0..count).filter(|k| k % 3 != 0).collect();
                    assert_eq!(keys, expected);
                }

                #[test]
                fn [<test_range_scan_order_ $order>]() {
                    let mut index = $crate::OrderedIndex::new($order).unwrap();
                    let count = $order * 25;
                    for k in 0..count {
                        index.insert(k, k).unwrap();
                    }

                    let lo = count / 4;
                    let hi = 3 * count / 4;
                    let keys: Vec<usize> = index.range(lo..=hi).map(|(k, _)| *k).collect();
                    assert_eq!(keys, (lo..=hi).collect::<Vec<usize>>());
                }
            }
        )+
    };
}

#[cfg(test)]
pub(crate) use order_battery;
