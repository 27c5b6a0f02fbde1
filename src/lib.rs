//! # Dependent Merge Library
//!
//! This library provides the data-combination engines behind a family of
//! lookup and filter entry points: a recursive merge with configurable list
//! handling, a keyed merge of record lists, a pattern-driven variable merge,
//! and a dependent cross-product expander. It is used by the `depmerge`
//! command-line tool but has no I/O of its own outside the `config` module.
//!
//! ## Quick Example
//!
//! ```
//! use dependent_merge::merge::{merge, ListMerge, MergeOptions};
//! use dependent_merge::merge::keyed::lists_mergeby;
//! use serde_json::json;
//!
//! let options = MergeOptions::new(true, ListMerge::AppendRp);
//! let merged = merge(&json!({"l": [1, 2]}), &json!({"l": [2, 3]}), &options);
//! assert_eq!(merged, json!({"l": [1, 2, 3]}));
//!
//! let records = lists_mergeby(
//!     &[json!([{"id": 2, "a": 1}]), json!([{"id": 1}, {"id": 2, "b": 2}])],
//!     "id",
//!     &MergeOptions::new(false, ListMerge::Replace),
//! )
//! .unwrap();
//! assert_eq!(records, vec![json!({"id": 1}), json!({"id": 2, "a": 1, "b": 2})]);
//! ```
//!
//! ## Core Concepts
//!
//! - **Merge (`merge`)**: deep merge of mappings and sequences under a
//!   [`merge::MergeOptions`] policy, plus the keyed list merge
//!   (`merge::keyed`) and the variable merge (`merge::variables`).
//! - **Expansion (`dependent`)**: depth-first expansion of named dimensions,
//!   where later dimensions may be expressions over earlier bindings.
//! - **Expressions (`expr`)**: the default path-based evaluator used to
//!   resolve dependent dimensions.
//! - **Documents (`config`)**: loading JSON/YAML/TOML inputs and rendering
//!   results.
//!
//! Every operation is a pure function of its arguments. Nothing is cached or
//! shared between calls, so all of them are safe to run concurrently.

pub mod config;
pub mod dependent;
pub mod error;
pub mod expr;
pub mod merge;

#[cfg(test)]
mod merge_proptest;
