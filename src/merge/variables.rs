//! Merge variables selected by name
//!
//! Every variable whose name matches a pattern is merged into one value.
//! Matching names are processed in sorted order. Lists are concatenated and
//! mappings are merged recursively. Overwriting a non-mapping value with a
//! different one is governed by an [`OverridePolicy`].

use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use super::{type_name, Shape};
use crate::error::{Error, Result};

/// How a pattern is matched against variable names
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    /// Regular expression anchored at the start of the name
    #[default]
    Regex,
    /// Literal name prefix
    Prefix,
    /// Literal name suffix
    Suffix,
}

impl FromStr for PatternType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "regex" => Ok(PatternType::Regex),
            "prefix" => Ok(PatternType::Prefix),
            "suffix" => Ok(PatternType::Suffix),
            other => Err(Error::validation(format!(
                "invalid pattern type '{}', expected one of: regex, prefix, suffix",
                other
            ))),
        }
    }
}

/// What happens when a merge would overwrite an existing value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverridePolicy {
    /// Abort the merge
    #[default]
    Error,
    /// Log a warning and overwrite
    Warn,
}

impl FromStr for OverridePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "error" => Ok(OverridePolicy::Error),
            "warn" => Ok(OverridePolicy::Warn),
            other => Err(Error::validation(format!(
                "invalid override policy '{}', expected one of: error, warn",
                other
            ))),
        }
    }
}

/// Settings for [`merge_variables`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeVariablesOptions {
    #[serde(default)]
    pub pattern_type: PatternType,
    /// Value the merge starts from, before any matching variable
    #[serde(default)]
    pub initial_value: Option<Value>,
    #[serde(default, rename = "override")]
    pub on_override: OverridePolicy,
}

enum Matcher<'a> {
    Regex(Regex),
    Prefix(&'a str),
    Suffix(&'a str),
}

impl<'a> Matcher<'a> {
    fn new(pattern: &'a str, pattern_type: PatternType) -> Result<Self> {
        Ok(match pattern_type {
            PatternType::Regex => Matcher::Regex(Regex::new(&format!("^(?:{})", pattern))?),
            PatternType::Prefix => Matcher::Prefix(pattern),
            PatternType::Suffix => Matcher::Suffix(pattern),
        })
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            Matcher::Regex(re) => re.is_match(name),
            Matcher::Prefix(prefix) => name.starts_with(prefix),
            Matcher::Suffix(suffix) => name.ends_with(suffix),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    Mapping,
    Sequence,
}

fn kind_of(value: &Value, source: &str) -> Result<Kind> {
    match Shape::of(value) {
        Shape::Mapping(_) => Ok(Kind::Mapping),
        Shape::Sequence(_) => Ok(Kind::Sequence),
        Shape::Scalar(_) => Err(Error::validation(format!(
            "inputs need to be lists or mappings, '{}' is a {}",
            source,
            type_name(value)
        ))),
    }
}

/// Merge the variables matched by each pattern
///
/// Returns one merged value per pattern, in pattern order. A pattern that
/// matches nothing yields the initial value, or `null` when there is none.
///
/// # Examples
///
/// ```
/// use dependent_merge::merge::variables::{merge_variables, MergeVariablesOptions, PatternType};
/// use serde_json::json;
///
/// let vars = json!({
///     "users__base": ["root"],
///     "users__web": ["nginx"],
///     "other": ["ignored"],
/// });
/// let options = MergeVariablesOptions {
///     pattern_type: PatternType::Prefix,
///     ..Default::default()
/// };
/// let merged = merge_variables(vars.as_object().unwrap(), &["users__"], &options).unwrap();
/// assert_eq!(merged, vec![json!(["root", "nginx"])]);
/// ```
pub fn merge_variables<S: AsRef<str>>(
    variables: &Map<String, Value>,
    patterns: &[S],
    options: &MergeVariablesOptions,
) -> Result<Vec<Value>> {
    patterns
        .iter()
        .map(|pattern| merge_matching(variables, pattern.as_ref(), options))
        .collect()
}

fn merge_matching(
    variables: &Map<String, Value>,
    pattern: &str,
    options: &MergeVariablesOptions,
) -> Result<Value> {
    let matcher = Matcher::new(pattern, options.pattern_type)?;
    let mut names: Vec<&String> = variables
        .keys()
        .filter(|name| matcher.matches(name))
        .collect();
    names.sort();

    let mut result: Option<(Kind, Value)> = match &options.initial_value {
        Some(initial) => Some((kind_of(initial, "initial_value")?, initial.clone())),
        None => None,
    };

    for name in names {
        let value = &variables[name.as_str()];
        let kind = kind_of(value, name)?;

        match &mut result {
            None => result = Some((kind, value.clone())),
            Some((merged_kind, _)) if *merged_kind != kind => {
                return Err(Error::validation(format!(
                    "unable to merge '{}': not all variables are of the same type",
                    name
                )));
            }
            Some((_, Value::Array(merged))) => {
                merged.extend(value.as_array().into_iter().flatten().cloned());
            }
            Some((_, Value::Object(merged))) => {
                if let Value::Object(source) = value {
                    let mut path = vec![name.clone()];
                    merge_into(merged, source, &mut path, options.on_override)?;
                }
            }
            Some(_) => {}
        }
    }

    Ok(result.map(|(_, value)| value).unwrap_or(Value::Null))
}

fn merge_into(
    dest: &mut Map<String, Value>,
    source: &Map<String, Value>,
    path: &mut Vec<String>,
    on_override: OverridePolicy,
) -> Result<()> {
    for (key, value) in source {
        match (value, dest.get_mut(key)) {
            (Value::Object(child), Some(Value::Object(existing))) => {
                path.push(key.clone());
                merge_into(existing, child, path, on_override)?;
                path.pop();
            }
            (Value::Array(items), Some(Value::Array(existing))) => {
                existing.extend(items.iter().cloned());
            }
            (_, Some(existing)) => {
                if existing != value {
                    let message = format!(
                        "The key '{}' with value '{}' will be overwritten with value '{}' from '{}.{}'",
                        key,
                        existing,
                        value,
                        path.join("."),
                        key
                    );
                    match on_override {
                        OverridePolicy::Error => return Err(Error::validation(message)),
                        OverridePolicy::Warn => warn!("{}", message),
                    }
                }
                *existing = value.clone();
            }
            (_, None) => {
                dest.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(())
}
