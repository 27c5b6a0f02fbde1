//! Default expression evaluator
//!
//! [`PathEvaluator`] resolves an expression as a variable path, e.g.
//! `item.host.value.ports` or `{{ groups["web servers"] }}`. The first path
//! segment names a variable and the rest navigate into it. An expression
//! starting with `[` or `{` is read as an inline flow literal instead.

pub mod path;

use serde_json::{Map, Value};

use crate::dependent::Evaluator;
use crate::error::{Error, Result};
use path::{lookup, parse_path, PathSegment};

/// Evaluates variable paths against the expansion context
#[derive(Debug, Default, Clone)]
pub struct PathEvaluator;

impl PathEvaluator {
    pub fn new() -> Self {
        Self
    }

    fn resolve(&self, expression: &str, variables: &Map<String, Value>) -> Result<Value> {
        let body = strip_delimiters(expression);
        if body.starts_with('[') || body.starts_with('{') {
            return serde_yaml::from_str(body).map_err(|err| Error::Expression {
                expression: expression.to_string(),
                message: format!("invalid inline literal: {}", err),
            });
        }

        let segments = parse_path(body)?;
        let (root, rest) = match segments.split_first() {
            Some((PathSegment::Key(root), rest)) => (root, rest),
            Some((PathSegment::Index(_), _)) | None => {
                return Err(Error::Expression {
                    expression: expression.to_string(),
                    message: "expression must start with a variable name".to_string(),
                })
            }
        };

        let value = variables.get(root).ok_or_else(|| Error::Expression {
            expression: expression.to_string(),
            message: format!("undefined variable '{}'", root),
        })?;

        lookup(value, rest).cloned().map_err(|position| {
            let resolved: Vec<String> = segments[..=position + 1]
                .iter()
                .map(|segment| segment.to_string())
                .collect();
            Error::Expression {
                expression: expression.to_string(),
                message: format!("'{}' is undefined", resolved.join(".")),
            }
        })
    }
}

impl Evaluator for PathEvaluator {
    fn evaluate(&self, expression: &str, variables: &Map<String, Value>) -> Result<Value> {
        self.resolve(expression, variables)
    }
}

fn strip_delimiters(expression: &str) -> &str {
    let trimmed = expression.trim();
    trimmed
        .strip_prefix("{{")
        .and_then(|inner| inner.strip_suffix("}}"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn variables() -> Map<String, Value> {
        json!({
            "item": {"host": {"key": "web", "value": {"ports": [80, 443]}}},
            "groups": {"web servers": ["a", "b"]},
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_resolves_item_path() {
        let value = PathEvaluator::new()
            .evaluate("item.host.value.ports", &variables())
            .unwrap();
        assert_eq!(value, json!([80, 443]));
    }

    #[test]
    fn test_strips_template_delimiters() {
        let value = PathEvaluator::new()
            .evaluate(r#"{{ groups["web servers"] }}"#, &variables())
            .unwrap();
        assert_eq!(value, json!(["a", "b"]));
    }

    #[test]
    fn test_inline_literals() {
        let evaluator = PathEvaluator::new();
        assert_eq!(evaluator.evaluate("[1, 2]", &Map::new()).unwrap(), json!([1, 2]));
        assert_eq!(
            evaluator.evaluate("{{ {a: 1} }}", &Map::new()).unwrap(),
            json!({"a": 1})
        );
    }

    #[test]
    fn test_undefined_variable() {
        let err = PathEvaluator::new()
            .evaluate("missing.key", &variables())
            .unwrap_err();
        assert!(err.to_string().contains("undefined variable 'missing'"));
    }

    #[test]
    fn test_undefined_nested_key_names_the_path() {
        let err = PathEvaluator::new()
            .evaluate("item.host.nope.deeper", &variables())
            .unwrap_err();
        assert!(err.to_string().contains("'item.host.nope' is undefined"));
    }

    #[test]
    fn test_empty_expression() {
        let err = PathEvaluator::new().evaluate("{{ }}", &variables()).unwrap_err();
        assert!(err.to_string().contains("must start with a variable name"));
    }

    #[test]
    fn test_malformed_path_is_an_expression_error() {
        let err = PathEvaluator::new()
            .evaluate("{{ item.host[value] }}", &variables())
            .unwrap_err();
        assert!(matches!(err, Error::Expression { .. }));
        assert!(err.to_string().contains("'value' is not a list index"));
    }
}
