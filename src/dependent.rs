//! Dependent cross-product expansion
//!
//! Expands an ordered list of named dimensions into every combination of
//! their values. Unlike a plain Cartesian product, a dimension may be an
//! expression evaluated once per combination of the dimensions before it:
//! while dimension `i` is evaluated, the variable `item` holds the values
//! already bound for dimensions `0..i`.
//!
//! Dimensions are walked depth first:
//!
//! - the first dimension varies slowest,
//! - sequence values are bound element by element in their given order,
//! - mapping values are bound as `{"key": k, "value": v}` records in
//!   ascending key order.
//!
//! Any failure aborts the whole expansion. [`expand`] never returns partial
//! output.
//!
//! ## Example
//!
//! ```
//! use dependent_merge::dependent::{expand, parse_terms};
//! use dependent_merge::expr::PathEvaluator;
//! use serde_json::{json, Map};
//!
//! let terms = [
//!     json!({"host": {"web": {"ports": [80, 443]}, "db": {"ports": [5432]}}}),
//!     json!({"port": "item.host.value.ports"}),
//! ];
//! let dimensions = parse_terms(&terms).unwrap();
//! let records = expand(&dimensions, &Map::new(), &PathEvaluator::new()).unwrap();
//!
//! assert_eq!(records.len(), 3);
//! assert_eq!(records[0]["host"]["key"], json!("db"));
//! assert_eq!(records[0]["port"], json!(5432));
//! assert_eq!(records[2]["port"], json!(443));
//! ```

use log::trace;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::merge::{type_name, Shape};

/// Name under which the partial assignment is exposed to expressions
pub const ITEM_VARIABLE: &str = "item";

/// Evaluates dimension expressions
///
/// `variables` holds the ambient context with [`ITEM_VARIABLE`] bound to the
/// current partial assignment.
pub trait Evaluator {
    fn evaluate(&self, expression: &str, variables: &Map<String, Value>) -> Result<Value>;
}

impl<F> Evaluator for F
where
    F: Fn(&str, &Map<String, Value>) -> Result<Value>,
{
    fn evaluate(&self, expression: &str, variables: &Map<String, Value>) -> Result<Value> {
        self(expression, variables)
    }
}

/// Where a dimension's values come from
#[derive(Clone, Debug, PartialEq)]
pub enum DimensionSource {
    /// Evaluated against the partial assignment each time it is reached
    Expression(String),
    /// A list or mapping known up front
    Literal(Value),
}

/// One named axis of the expansion
#[derive(Clone, Debug, PartialEq)]
pub struct Dimension {
    pub name: String,
    pub source: DimensionSource,
}

impl Dimension {
    /// Build a dimension from exactly one of an expression or literal values.
    pub fn new(
        name: impl Into<String>,
        expression: Option<String>,
        literal: Option<Value>,
    ) -> Result<Self> {
        let name = name.into();
        let source = match (expression, literal) {
            (Some(expression), None) => DimensionSource::Expression(expression),
            (None, Some(values)) => DimensionSource::Literal(values),
            (Some(_), Some(_)) => {
                return Err(Error::validation(format!(
                    "dimension '{}' has both an expression and literal values",
                    name
                )))
            }
            (None, None) => {
                return Err(Error::validation(format!(
                    "dimension '{}' has neither an expression nor literal values",
                    name
                )))
            }
        };
        Ok(Self { name, source })
    }

    pub fn literal(name: impl Into<String>, values: Value) -> Self {
        Self {
            name: name.into(),
            source: DimensionSource::Literal(values),
        }
    }

    pub fn expression(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: DimensionSource::Expression(expression.into()),
        }
    }
}

/// Parse lookup terms into dimensions
///
/// Each term is a one-entry mapping from the dimension name to either an
/// expression string or a literal list or mapping.
pub fn parse_terms(terms: &[Value]) -> Result<Vec<Dimension>> {
    let mut seen = HashSet::new();
    let mut dimensions = Vec::with_capacity(terms.len());

    for (position, term) in terms.iter().enumerate() {
        let entries = term.as_object().ok_or_else(|| {
            Error::validation(format!(
                "parameter {} must be a mapping, got a {}",
                position,
                type_name(term)
            ))
        })?;
        if entries.len() != 1 {
            return Err(Error::validation(format!(
                "parameter {} must be a one-element mapping, got {} elements",
                position,
                entries.len()
            )));
        }
        let Some((name, value)) = entries.iter().next() else {
            continue;
        };
        if !seen.insert(name.as_str()) {
            return Err(Error::validation(format!(
                "the variable '{}' appears more than once",
                name
            )));
        }

        let dimension = match value {
            Value::String(expression) => Dimension::expression(name.as_str(), expression.as_str()),
            Value::Array(_) | Value::Object(_) => Dimension::literal(name.as_str(), value.clone()),
            other => {
                return Err(Error::validation(format!(
                    "parameter '{}' (index {}) must have a value of type string, mapping or list, got a {}",
                    name,
                    position,
                    type_name(other)
                )))
            }
        };
        dimensions.push(dimension);
    }

    Ok(dimensions)
}

/// Check the preconditions that must hold before any evaluation happens.
pub fn validate(dimensions: &[Dimension]) -> Result<()> {
    if dimensions.is_empty() {
        return Err(Error::validation("at least one dimension is required"));
    }

    let mut seen = HashSet::new();
    for dimension in dimensions {
        if !seen.insert(dimension.name.as_str()) {
            return Err(Error::validation(format!(
                "the variable '{}' appears more than once",
                dimension.name
            )));
        }
        if let DimensionSource::Literal(values) = &dimension.source {
            if matches!(Shape::of(values), Shape::Scalar(_)) {
                return Err(Error::validation(format!(
                    "literal values for '{}' must be a list or mapping, got a {}",
                    dimension.name,
                    type_name(values)
                )));
            }
        }
    }
    Ok(())
}

/// Expand every combination of the dimensions
///
/// Returns one record per complete assignment, in depth-first order.
pub fn expand<E: Evaluator + ?Sized>(
    dimensions: &[Dimension],
    context: &Map<String, Value>,
    evaluator: &E,
) -> Result<Vec<Map<String, Value>>> {
    expand_iter(dimensions, context, evaluator)?.collect()
}

/// Lazily expand the dimensions
///
/// Yields records in the same order as [`expand`]. Validation happens up
/// front; an evaluation failure is yielded once, after which the iterator is
/// exhausted.
pub fn expand_iter<'a, E: Evaluator + ?Sized>(
    dimensions: &'a [Dimension],
    context: &'a Map<String, Value>,
    evaluator: &'a E,
) -> Result<Expander<'a, E>> {
    validate(dimensions)?;
    Ok(Expander {
        dimensions,
        context,
        evaluator,
        stack: Vec::with_capacity(dimensions.len()),
        assignment: Map::new(),
        started: false,
        finished: false,
    })
}

/// Depth-first walk over the expansion tree
pub struct Expander<'a, E: ?Sized> {
    dimensions: &'a [Dimension],
    context: &'a Map<String, Value>,
    evaluator: &'a E,
    stack: Vec<std::vec::IntoIter<Value>>,
    assignment: Map<String, Value>,
    started: bool,
    finished: bool,
}

impl<E: Evaluator + ?Sized> Expander<'_, E> {
    fn candidates(&self, depth: usize) -> Result<Vec<Value>> {
        let dimension = &self.dimensions[depth];
        let evaluated;
        let values = match &dimension.source {
            DimensionSource::Literal(values) => values,
            DimensionSource::Expression(expression) => {
                trace!(
                    "evaluating '{}' for dimension '{}' with item {}",
                    expression,
                    dimension.name,
                    Value::Object(self.assignment.clone())
                );
                let mut variables = self.context.clone();
                variables.insert(
                    ITEM_VARIABLE.to_string(),
                    Value::Object(self.assignment.clone()),
                );
                evaluated = self
                    .evaluator
                    .evaluate(expression, &variables)
                    .map_err(|err| self.evaluation_error(dimension, expression, err.to_string()))?;
                &evaluated
            }
        };

        match Shape::of(values) {
            Shape::Sequence(items) => Ok(items.to_vec()),
            Shape::Mapping(entries) => {
                let mut entries: Vec<(&String, &Value)> = entries.iter().collect();
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));
                Ok(entries
                    .into_iter()
                    .map(|(key, value)| json!({"key": key, "value": value}))
                    .collect())
            }
            Shape::Scalar(other) => {
                let message = format!(
                    "expression for '{}' is of type {}, which is not a list or mapping",
                    dimension.name,
                    type_name(other)
                );
                Err(match &dimension.source {
                    DimensionSource::Expression(expression) => {
                        self.evaluation_error(dimension, expression, message)
                    }
                    DimensionSource::Literal(_) => Error::validation(message),
                })
            }
        }
    }

    fn evaluation_error(&self, dimension: &Dimension, expression: &str, message: String) -> Error {
        Error::Evaluation {
            dimension: dimension.name.clone(),
            expression: expression.to_string(),
            assignment: Value::Object(self.assignment.clone()).to_string(),
            message,
        }
    }

    fn descend(&mut self) -> Result<()> {
        let bindings = self.candidates(self.stack.len())?;
        self.stack.push(bindings.into_iter());
        Ok(())
    }

    fn fail(&mut self, err: Error) -> Option<Result<Map<String, Value>>> {
        self.finished = true;
        self.stack.clear();
        Some(Err(err))
    }
}

impl<E: Evaluator + ?Sized> Iterator for Expander<'_, E> {
    type Item = Result<Map<String, Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if !self.started {
            self.started = true;
            if let Err(err) = self.descend() {
                return self.fail(err);
            }
        }

        let dimensions = self.dimensions;
        loop {
            let depth = match self.stack.len() {
                0 => {
                    self.finished = true;
                    return None;
                }
                len => len - 1,
            };
            let name = &dimensions[depth].name;

            match self.stack[depth].next() {
                None => {
                    self.stack.pop();
                    self.assignment.shift_remove(name);
                }
                Some(binding) => {
                    self.assignment.insert(name.clone(), binding);
                    if depth + 1 == dimensions.len() {
                        return Some(Ok(self.assignment.clone()));
                    }
                    if let Err(err) = self.descend() {
                        return self.fail(err);
                    }
                }
            }
        }
    }
}
