//! Recursive merge of JSON-like values
//!
//! This module provides the generic deep merge used by every other merge
//! operation in the crate. Two values are merged under a [`MergeOptions`]
//! policy: nested mappings are merged key by key (when `recursive` is set),
//! sequences found at the same key are combined according to a
//! [`ListMerge`] policy, and anything else is overwritten by the righthand
//! operand.
//!
//! ## Submodules
//!
//! - `keyed` - merge lists of records grouped by a key field
//! - `variables` - merge every variable whose name matches a pattern
//!
//! Inputs are never mutated. Every merge returns a freshly built value.

pub mod keyed;
pub mod variables;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// How two sequences found at the same key are combined
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMerge {
    /// The righthand sequence wins outright
    #[default]
    Replace,
    /// The lefthand sequence wins outright
    Keep,
    /// Left followed by right, duplicates retained
    Append,
    /// Right followed by left, duplicates retained
    Prepend,
    /// Left followed by right, left elements also present on the right dropped
    AppendRp,
    /// Right followed by left, left elements also present on the right dropped
    PrependRp,
}

impl ListMerge {
    /// Every policy, in the order they are documented.
    pub const ALL: [ListMerge; 6] = [
        ListMerge::Replace,
        ListMerge::Keep,
        ListMerge::Append,
        ListMerge::Prepend,
        ListMerge::AppendRp,
        ListMerge::PrependRp,
    ];

    /// The policy's configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            ListMerge::Replace => "replace",
            ListMerge::Keep => "keep",
            ListMerge::Append => "append",
            ListMerge::Prepend => "prepend",
            ListMerge::AppendRp => "append_rp",
            ListMerge::PrependRp => "prepend_rp",
        }
    }

    /// Combine two sequences under this policy.
    pub fn combine(self, left: &[Value], right: &[Value]) -> Vec<Value> {
        match self {
            ListMerge::Replace => right.to_vec(),
            ListMerge::Keep => left.to_vec(),
            ListMerge::Append => left.iter().chain(right).cloned().collect(),
            ListMerge::Prepend => right.iter().chain(left).cloned().collect(),
            ListMerge::AppendRp => not_in(left, right).chain(right).cloned().collect(),
            ListMerge::PrependRp => right.iter().chain(not_in(left, right)).cloned().collect(),
        }
    }
}

fn not_in<'a>(left: &'a [Value], right: &'a [Value]) -> impl Iterator<Item = &'a Value> {
    left.iter().filter(move |value| !right.contains(value))
}

impl fmt::Display for ListMerge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListMerge {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ListMerge::ALL
            .into_iter()
            .find(|policy| policy.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = ListMerge::ALL.iter().map(|p| p.as_str()).collect();
                Error::validation(format!(
                    "invalid list_merge value '{}', expected one of: {}",
                    s,
                    allowed.join(", ")
                ))
            })
    }
}

/// Merge policy shared by all merge operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Merge nested mappings key by key instead of replacing them wholesale
    #[serde(default = "default_recursive")]
    pub recursive: bool,
    /// How sequences at the same key are combined
    #[serde(default)]
    pub list_merge: ListMerge,
}

fn default_recursive() -> bool {
    true
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            list_merge: ListMerge::Replace,
        }
    }
}

impl MergeOptions {
    pub fn new(recursive: bool, list_merge: ListMerge) -> Self {
        Self {
            recursive,
            list_merge,
        }
    }
}

/// The structural kind of a value, matched at every merge step
#[derive(Clone, Copy, Debug)]
pub enum Shape<'a> {
    Mapping(&'a Map<String, Value>),
    Sequence(&'a [Value]),
    Scalar(&'a Value),
}

impl<'a> Shape<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Shape::Mapping(map),
            Value::Array(items) => Shape::Sequence(items),
            other => Shape::Scalar(other),
        }
    }
}

/// Get a human-readable type name for a value
///
/// Used in error messages to describe what was found instead of what was
/// expected.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

/// Which operand keeps a slot when the two values cannot be combined
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Winner {
    Left,
    Right,
}

impl Winner {
    fn pick<'a>(self, left: &'a Value, right: &'a Value) -> &'a Value {
        match self {
            Winner::Left => left,
            Winner::Right => right,
        }
    }
}

/// Merge two values
///
/// Two mappings are merged key by key with [`merge_hash`]. Two sequences are
/// combined with the `list_merge` policy. In every other case the righthand
/// value is returned.
///
/// # Examples
///
/// ```
/// use dependent_merge::merge::{merge, ListMerge, MergeOptions};
/// use serde_json::json;
///
/// let options = MergeOptions::new(true, ListMerge::Append);
/// let merged = merge(
///     &json!({"a": {"x": 1}, "l": [1]}),
///     &json!({"a": {"y": 2}, "l": [2]}),
///     &options,
/// );
/// assert_eq!(merged, json!({"a": {"x": 1, "y": 2}, "l": [1, 2]}));
/// ```
pub fn merge(left: &Value, right: &Value, options: &MergeOptions) -> Value {
    match (Shape::of(left), Shape::of(right)) {
        (Shape::Mapping(left), Shape::Mapping(right)) => {
            Value::Object(merge_hash(left, right, options))
        }
        _ => merge_slot(left, right, options, Winner::Right),
    }
}

/// Merge two mappings, the righthand mapping taking precedence
///
/// Keys present on one side only pass through. For keys present on both
/// sides, nested mappings are merged recursively when `options.recursive` is
/// set, sequences are combined per `options.list_merge`, and otherwise the
/// righthand value wins.
pub fn merge_hash(
    left: &Map<String, Value>,
    right: &Map<String, Value>,
    options: &MergeOptions,
) -> Map<String, Value> {
    merge_maps(left, right, options, Winner::Right)
}

pub(crate) fn merge_maps(
    left: &Map<String, Value>,
    right: &Map<String, Value>,
    options: &MergeOptions,
    winner: Winner,
) -> Map<String, Value> {
    if left.is_empty() || left == right {
        return right.clone();
    }

    let mut merged = left.clone();
    if winner == Winner::Right && !options.recursive && options.list_merge == ListMerge::Replace {
        merged.extend(right.iter().map(|(k, v)| (k.clone(), v.clone())));
        return merged;
    }

    for (key, right_value) in right {
        let value = match merged.get(key) {
            Some(left_value) => merge_slot(left_value, right_value, options, winner),
            None => right_value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}

fn merge_slot(left: &Value, right: &Value, options: &MergeOptions, winner: Winner) -> Value {
    match (Shape::of(left), Shape::of(right)) {
        (Shape::Mapping(l), Shape::Mapping(r)) if options.recursive => {
            Value::Object(merge_maps(l, r, options, winner))
        }
        (Shape::Sequence(l), Shape::Sequence(r)) => Value::Array(options.list_merge.combine(l, r)),
        // Scalars, non-recursive mappings and mismatched kinds are not combined.
        _ => winner.pick(left, right).clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn policy_result(policy: ListMerge) -> Value {
        let options = MergeOptions::new(true, policy);
        let merged = merge(&json!({"k": [1, 2]}), &json!({"k": [2, 3]}), &options);
        merged["k"].clone()
    }

    #[test]
    fn test_list_merge_policies() {
        assert_eq!(policy_result(ListMerge::Replace), json!([2, 3]));
        assert_eq!(policy_result(ListMerge::Keep), json!([1, 2]));
        assert_eq!(policy_result(ListMerge::Append), json!([1, 2, 2, 3]));
        assert_eq!(policy_result(ListMerge::Prepend), json!([2, 3, 1, 2]));
        assert_eq!(policy_result(ListMerge::AppendRp), json!([1, 2, 3]));
        assert_eq!(policy_result(ListMerge::PrependRp), json!([2, 3, 1]));
    }

    #[test]
    fn test_rp_policies_drop_from_left_side() {
        let left = [json!(1), json!(2), json!(1)];
        let right = [json!(1), json!(3)];
        assert_eq!(
            ListMerge::AppendRp.combine(&left, &right),
            vec![json!(2), json!(1), json!(3)]
        );
        assert_eq!(
            ListMerge::PrependRp.combine(&left, &right),
            vec![json!(1), json!(3), json!(2)]
        );
    }

    #[test]
    fn test_disjoint_keys_pass_through() {
        let merged = merge(
            &json!({"a": 1}),
            &json!({"b": 2}),
            &MergeOptions::default(),
        );
        assert_eq!(merged, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_recursive_merges_nested_mappings() {
        let left = json!({"db": {"host": "localhost", "port": 5432}});
        let right = json!({"db": {"port": 6432, "user": "app"}});
        let merged = merge(&left, &right, &MergeOptions::new(true, ListMerge::Replace));
        assert_eq!(
            merged,
            json!({"db": {"host": "localhost", "port": 6432, "user": "app"}})
        );
    }

    #[test]
    fn test_non_recursive_replaces_nested_mappings() {
        let left = json!({"db": {"host": "localhost", "port": 5432}});
        let right = json!({"db": {"port": 6432}});
        let merged = merge(&left, &right, &MergeOptions::new(false, ListMerge::Replace));
        assert_eq!(merged, json!({"db": {"port": 6432}}));

        let merged = merge(&left, &right, &MergeOptions::new(false, ListMerge::Append));
        assert_eq!(merged, json!({"db": {"port": 6432}}));
    }

    #[test]
    fn test_non_recursive_still_combines_top_level_lists() {
        let merged = merge(
            &json!({"l": [1], "m": {"l": [1]}}),
            &json!({"l": [2], "m": {"l": [2]}}),
            &MergeOptions::new(false, ListMerge::Append),
        );
        assert_eq!(merged, json!({"l": [1, 2], "m": {"l": [2]}}));
    }

    #[test]
    fn test_nested_lists_follow_policy_when_recursive() {
        let merged = merge(
            &json!({"m": {"l": [1]}}),
            &json!({"m": {"l": [2]}}),
            &MergeOptions::new(true, ListMerge::Prepend),
        );
        assert_eq!(merged, json!({"m": {"l": [2, 1]}}));
    }

    #[test]
    fn test_type_mismatch_right_wins() {
        let options = MergeOptions::new(true, ListMerge::Append);
        let merged = merge(&json!({"a": {"x": 1}}), &json!({"a": [1]}), &options);
        assert_eq!(merged, json!({"a": [1]}));

        let merged = merge(&json!({"a": [1]}), &json!({"a": "s"}), &options);
        assert_eq!(merged, json!({"a": "s"}));

        let merged = merge(&json!({"a": 1}), &json!({"a": {"x": 1}}), &options);
        assert_eq!(merged, json!({"a": {"x": 1}}));
    }

    #[test]
    fn test_top_level_non_mappings() {
        let options = MergeOptions::new(true, ListMerge::Append);
        assert_eq!(merge(&json!([1]), &json!([2]), &options), json!([1, 2]));
        assert_eq!(merge(&json!(1), &json!("x"), &options), json!("x"));
        assert_eq!(merge(&json!({"a": 1}), &json!(null), &options), json!(null));
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let left = json!({"a": {"b": [1]}});
        let right = json!({"a": {"b": [2], "c": 3}});
        let left_before = left.clone();
        let right_before = right.clone();
        let _ = merge(&left, &right, &MergeOptions::new(true, ListMerge::Append));
        assert_eq!(left, left_before);
        assert_eq!(right, right_before);
    }

    #[test]
    fn test_left_winner_keeps_left_scalars_and_combines_lists() {
        let left = json!({"a": 1, "l": [1], "m": {"x": 1}}).as_object().cloned().unwrap();
        let right = json!({"a": 2, "l": [2], "m": {"x": 2, "y": 3}, "b": 4})
            .as_object()
            .cloned()
            .unwrap();
        let merged = merge_maps(
            &left,
            &right,
            &MergeOptions::new(true, ListMerge::Append),
            Winner::Left,
        );
        assert_eq!(
            Value::Object(merged),
            json!({"a": 1, "b": 4, "l": [1, 2], "m": {"x": 1, "y": 3}})
        );
    }

    #[test]
    fn test_list_merge_from_str() {
        assert_eq!("append_rp".parse::<ListMerge>().unwrap(), ListMerge::AppendRp);
        assert_eq!("keep".parse::<ListMerge>().unwrap(), ListMerge::Keep);
        let err = "merge".parse::<ListMerge>().unwrap_err();
        assert!(err.to_string().contains("invalid list_merge value 'merge'"));
        assert!(err.to_string().contains("prepend_rp"));
    }

    #[test]
    fn test_list_merge_serde_names() {
        let policy: ListMerge = serde_json::from_value(json!("prepend_rp")).unwrap();
        assert_eq!(policy, ListMerge::PrependRp);
        assert_eq!(serde_json::to_value(ListMerge::AppendRp).unwrap(), json!("append_rp"));
    }

    #[test]
    fn test_merge_options_deserialize_defaults() {
        let options: MergeOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(options, MergeOptions::default());
        let options: MergeOptions =
            serde_json::from_value(json!({"recursive": false, "list_merge": "keep"})).unwrap();
        assert_eq!(options, MergeOptions::new(false, ListMerge::Keep));
    }

    #[test]
    fn test_type_name() {
        assert_eq!(type_name(&json!(null)), "null");
        assert_eq!(type_name(&json!([1])), "list");
        assert_eq!(type_name(&json!({"a": 1})), "mapping");
        assert_eq!(type_name(&json!("s")), "string");
    }

    #[test]
    fn test_merged_keys_keep_left_then_right_order() {
        let merged = merge_hash(
            json!({"zeta": 1, "alpha": {"y": 1, "b": 2}}).as_object().unwrap(),
            json!({"mid": 3, "alpha": {"a": 4}}).as_object().unwrap(),
            &MergeOptions::default(),
        );
        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        let nested: Vec<&str> = merged["alpha"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(nested, vec!["y", "b", "a"]);
    }
}
