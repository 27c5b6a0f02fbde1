//! Keyed merge of record lists
//!
//! Merges several lists of records (mappings) into one list holding a single
//! record per distinct value of a key field. Records sharing a key are deep
//! merged with the policy from [`MergeOptions`].
//!
//! Lists are folded from the last one to the first. At each step the list
//! being folded in takes precedence over what has been accumulated so far,
//! so the *first* list supplies the winning value when two lists disagree on
//! a scalar field. Sequence fields are combined with the earlier list as the
//! lefthand operand, which keeps `append` ordered from first list to last.
//! Within a single list, a later record overrides an earlier one.

use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::{merge_maps, type_name, MergeOptions, Winner};
use crate::error::{Error, Result};

/// Options used by [`lists_mergeby`] when the caller supplies none
pub fn default_mergeby_options() -> MergeOptions {
    MergeOptions::new(false, super::ListMerge::Replace)
}

/// Merge record lists given in either call shape
///
/// Each term must be a list. A non-empty term whose elements are all lists
/// contributes each of those elements as a separate list (the
/// `[a, b, c] | mergeby(key)` shape). Any other term is a single list (the
/// `a | mergeby(b, key)` shape).
///
/// A single list is returned unchanged without looking at its records.
///
/// # Examples
///
/// ```
/// use dependent_merge::merge::keyed::{default_mergeby_options, lists_mergeby};
/// use serde_json::json;
///
/// let terms = [
///     json!([{"index": "a", "value": 123}, {"index": "b", "value": 4}]),
///     json!([{"index": "a", "foo": "bar"}, {"index": "c", "foo": "baz"}]),
/// ];
/// let merged = lists_mergeby(&terms, "index", &default_mergeby_options()).unwrap();
/// assert_eq!(
///     merged,
///     vec![
///         json!({"index": "a", "value": 123, "foo": "bar"}),
///         json!({"index": "b", "value": 4}),
///         json!({"index": "c", "foo": "baz"}),
///     ]
/// );
/// ```
pub fn lists_mergeby(terms: &[Value], index: &str, options: &MergeOptions) -> Result<Vec<Value>> {
    let lists = flatten_terms(terms)?;
    keyed_merge(&lists, index, options)
}

/// Normalize the accepted call shapes into an ordered list of record lists.
pub fn flatten_terms(terms: &[Value]) -> Result<Vec<&[Value]>> {
    let mut lists = Vec::new();
    for (position, term) in terms.iter().enumerate() {
        let items = term.as_array().ok_or_else(|| {
            Error::validation(format!(
                "all arguments before the index must be lists, argument {} is a {}",
                position,
                type_name(term)
            ))
        })?;

        if !items.is_empty() && items.iter().all(Value::is_array) {
            lists.extend(items.iter().filter_map(Value::as_array).map(Vec::as_slice));
        } else {
            lists.push(items.as_slice());
        }
    }
    Ok(lists)
}

/// Merge an ordered sequence of record lists by `index`
///
/// Returns one record per distinct key value, sorted ascending by key.
/// Zero lists produce an empty result and a single list is returned as-is.
pub fn keyed_merge<L: AsRef<[Value]>>(
    lists: &[L],
    index: &str,
    options: &MergeOptions,
) -> Result<Vec<Value>> {
    let mut remaining = lists.iter().rev();
    let Some(last) = remaining.next() else {
        return Ok(Vec::new());
    };

    let mut result = last.as_ref().to_vec();
    if lists.len() == 1 {
        return Ok(result);
    }

    for list in remaining {
        result = list_mergeby(list.as_ref(), &result, index, options)?;
    }
    Ok(result)
}

/// Merge two record lists by `index`, `high` taking precedence over `low`
pub fn list_mergeby(
    high: &[Value],
    low: &[Value],
    index: &str,
    options: &MergeOptions,
) -> Result<Vec<Value>> {
    let mut merged = Groups::collect(high, index, options)?;
    let low = Groups::collect(low, index, options)?;

    for (key, record) in &low.entries {
        merged.absorb(key, record, options, Winner::Left)?;
    }

    merged.into_sorted(index)
}

/// Records grouped by key value, in first-seen order
#[derive(Default)]
struct Groups {
    entries: Vec<(Value, Map<String, Value>)>,
    positions: HashMap<String, usize>,
}

impl Groups {
    fn collect(records: &[Value], index: &str, options: &MergeOptions) -> Result<Self> {
        let mut groups = Groups::default();
        for record in records {
            let map = record.as_object().ok_or_else(|| {
                Error::validation(format!(
                    "elements of lists merged by key must be mappings, got a {}: {}",
                    type_name(record),
                    record
                ))
            })?;
            let key = map.get(index).ok_or_else(|| Error::MissingKey {
                index: index.to_string(),
                record: record.to_string(),
            })?;
            groups.absorb(key, map, options, Winner::Right)?;
        }
        Ok(groups)
    }

    fn absorb(
        &mut self,
        key: &Value,
        record: &Map<String, Value>,
        options: &MergeOptions,
        winner: Winner,
    ) -> Result<()> {
        if matches!(key, Value::Array(_) | Value::Object(_)) {
            return Err(Error::validation(format!(
                "key values must be scalars, got a {}: {}",
                type_name(key),
                key
            )));
        }

        let identity = group_key(key);
        match self.positions.get(&identity) {
            Some(&slot) => {
                let merged = merge_maps(&self.entries[slot].1, record, options, winner);
                self.entries[slot].1 = merged;
            }
            None => {
                self.positions.insert(identity, self.entries.len());
                self.entries.push((key.clone(), record.clone()));
            }
        }
        Ok(())
    }

    fn into_sorted(self, index: &str) -> Result<Vec<Value>> {
        let mut entries = self.entries;
        if let Some((first, _)) = entries.first() {
            if let Some((other, _)) = entries.iter().find(|(key, _)| !same_kind(first, key)) {
                return Err(Error::validation(format!(
                    "values of key field '{}' cannot be ordered against each other: {} and {}",
                    index, first, other
                )));
            }
        }

        entries.sort_by(|(a, _), (b, _)| compare_keys(a, b));
        Ok(entries
            .into_iter()
            .map(|(_, record)| Value::Object(record))
            .collect())
    }
}

/// Group identity of a key value. Integral floats share a group with the
/// equal integer, so `1` and `1.0` are one key.
fn group_key(key: &Value) -> String {
    let Value::Number(number) = key else {
        return key.to_string();
    };
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    if let Some(uint) = number.as_u64() {
        return uint.to_string();
    }
    match number.as_f64() {
        Some(float) if float.fract() != 0.0 => number.to_string(),
        Some(float) if (i64::MIN as f64..i64::MAX as f64).contains(&float) => {
            (float as i64).to_string()
        }
        Some(float) if (0.0..u64::MAX as f64).contains(&float) => (float as u64).to_string(),
        _ => number.to_string(),
    }
}

fn same_kind(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

fn compare_keys(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => match (x.as_u64(), y.as_u64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => {
                    let x = x.as_f64().unwrap_or(f64::NAN);
                    let y = y.as_f64().unwrap_or(f64::NAN);
                    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                }
            },
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}
