//! Property-based tests for the merge and expansion engines.
//!
//! These tests use proptest to generate random documents and verify that
//! invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::dependent::{expand, Dimension};
    use crate::error::Result;
    use crate::merge::keyed::lists_mergeby;
    use crate::merge::{merge, ListMerge, MergeOptions};
    use proptest::prelude::*;
    use serde_json::{json, Map, Value};
    use std::collections::BTreeSet;

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[a-z]{0,4}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-d]", inner, 0..4)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
    }

    fn arb_policy() -> impl Strategy<Value = ListMerge> {
        prop::sample::select(ListMerge::ALL.to_vec())
    }

    fn arb_records() -> impl Strategy<Value = Vec<Value>> {
        prop::collection::vec(
            (0i64..6, arb_json()).prop_map(|(key, value)| json!({"k": key, "v": value})),
            0..6,
        )
    }

    fn no_eval(_: &str, _: &Map<String, Value>) -> Result<Value> {
        Ok(Value::Null)
    }

    // ============================================================================
    // merge property tests
    // ============================================================================

    proptest! {
        /// Property: merge is deterministic (same input = same output)
        #[test]
        fn merge_is_deterministic(
            left in arb_json(),
            right in arb_json(),
            recursive in any::<bool>(),
            policy in arb_policy(),
        ) {
            let options = MergeOptions::new(recursive, policy);
            prop_assert_eq!(merge(&left, &right, &options), merge(&left, &right, &options));
        }

        /// Property: merging a value with itself under a de-duplicating
        /// policy returns the value unchanged
        #[test]
        fn merge_with_self_is_identity(
            value in arb_json(),
            recursive in any::<bool>(),
            policy in prop::sample::select(vec![
                ListMerge::Keep,
                ListMerge::AppendRp,
                ListMerge::PrependRp,
            ]),
        ) {
            let options = MergeOptions::new(recursive, policy);
            prop_assert_eq!(merge(&value, &value, &options), value);
        }

        /// Property: merged mappings hold exactly the union of both key sets
        #[test]
        fn merged_keys_are_union(
            left in prop::collection::btree_map("[a-f]", arb_json(), 0..5),
            right in prop::collection::btree_map("[a-f]", arb_json(), 0..5),
            policy in arb_policy(),
        ) {
            let expected: BTreeSet<String> = left.keys().chain(right.keys()).cloned().collect();
            let left = Value::Object(left.into_iter().collect());
            let right = Value::Object(right.into_iter().collect());
            let merged = merge(&left, &right, &MergeOptions::new(true, policy));
            let keys: BTreeSet<String> = merged.as_object().unwrap().keys().cloned().collect();
            prop_assert_eq!(keys, expected);
        }

        /// Property: scalar values on the right always win
        #[test]
        fn right_scalars_win(
            left in arb_json(),
            scalar in any::<i32>(),
            policy in arb_policy(),
        ) {
            let merged = merge(
                &json!({"slot": left}),
                &json!({"slot": scalar}),
                &MergeOptions::new(true, policy),
            );
            prop_assert_eq!(&merged["slot"], &json!(scalar));
        }
    }

    // ============================================================================
    // keyed merge property tests
    // ============================================================================

    proptest! {
        /// Property: one output record per distinct key, sorted ascending
        #[test]
        fn mergeby_yields_sorted_distinct_keys(
            first in arb_records(),
            second in arb_records(),
        ) {
            let expected: BTreeSet<i64> = first
                .iter()
                .chain(second.iter())
                .filter_map(|record| record["k"].as_i64())
                .collect();
            let merged = lists_mergeby(
                &[Value::Array(first), Value::Array(second)],
                "k",
                &MergeOptions::new(false, ListMerge::Replace),
            )
            .unwrap();
            let keys: Vec<i64> = merged.iter().filter_map(|record| record["k"].as_i64()).collect();
            prop_assert_eq!(keys, expected.into_iter().collect::<Vec<_>>());
        }
    }

    // ============================================================================
    // expansion property tests
    // ============================================================================

    proptest! {
        /// Property: a literal expansion yields the product of the sizes,
        /// with the first dimension varying slowest
        #[test]
        fn literal_expansion_is_full_product(
            sizes in prop::collection::vec(0usize..4, 1..4),
        ) {
            let dimensions: Vec<Dimension> = sizes
                .iter()
                .enumerate()
                .map(|(i, size)| Dimension::literal(format!("d{}", i), json!((0..*size).collect::<Vec<_>>())))
                .collect();
            let records = expand(&dimensions, &Map::new(), &no_eval).unwrap();
            prop_assert_eq!(records.len(), sizes.iter().product::<usize>());

            let firsts: Vec<u64> = records.iter().filter_map(|r| r["d0"].as_u64()).collect();
            let mut sorted = firsts.clone();
            sorted.sort();
            prop_assert_eq!(firsts, sorted);
        }
    }
}
