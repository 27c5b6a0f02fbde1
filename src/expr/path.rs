//! Variable path parsing and lookup
//!
//! Path expressions like `item.server.value` or `hosts[0]["dotted.name"]` are
//! parsed into a sequence of [`PathSegment`]s and resolved against a JSON
//! value without modifying it.

use serde_json::Value;

use crate::error::{Error, Result};

/// Represents a segment in a path expression for navigating nested structures
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    /// A named key for accessing mapping members
    Key(String),
    /// A numeric index for accessing sequence elements
    Index(usize),
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(idx) => write!(f, "[{}]", idx),
        }
    }
}

/// Split a variable path into segments
///
/// A path is a name followed by any mix of `.name`, `[index]` and
/// `["quoted key"]` (or `['quoted key']`) accessors. Quoted keys may contain
/// dots and spaces.
///
/// # Examples
///
/// ```
/// use dependent_merge::expr::path::{parse_path, PathSegment};
///
/// let segments = parse_path("item.hosts[0]").unwrap();
/// assert_eq!(segments.len(), 3);
/// assert_eq!(segments[2], PathSegment::Index(0));
/// ```
pub fn parse_path(path: &str) -> Result<Vec<PathSegment>> {
    let mut segments = Vec::new();
    let mut rest = path.trim();

    while !rest.is_empty() {
        if let Some(inner) = rest.strip_prefix('[') {
            let (segment, remaining) = bracket_segment(path, inner)?;
            segments.push(segment);
            rest = remaining;
            continue;
        }

        let name_start = if segments.is_empty() {
            rest
        } else {
            rest.strip_prefix('.')
                .ok_or_else(|| invalid(path, format!("expected '.' or '[' before '{}'", rest)))?
        };
        let end = name_start.find(['.', '[']).unwrap_or(name_start.len());
        let name = name_start[..end].trim();
        if name.is_empty() {
            return Err(invalid(path, "empty name in path"));
        }
        segments.push(PathSegment::Key(name.to_string()));
        rest = &name_start[end..];
    }

    Ok(segments)
}

fn bracket_segment<'a>(path: &str, inner: &'a str) -> Result<(PathSegment, &'a str)> {
    let inner = inner.trim_start();
    if let Some(quote) = inner.chars().next().filter(|c| matches!(*c, '"' | '\'')) {
        let body = &inner[1..];
        let close = body
            .find(quote)
            .ok_or_else(|| invalid(path, "unterminated quoted key"))?;
        let after = body[close + 1..]
            .trim_start()
            .strip_prefix(']')
            .ok_or_else(|| invalid(path, "expected ']' after quoted key"))?;
        return Ok((PathSegment::Key(body[..close].to_string()), after));
    }

    let close = inner.find(']').ok_or_else(|| invalid(path, "unclosed '['"))?;
    let text = inner[..close].trim();
    let index = text
        .parse::<usize>()
        .map_err(|_| invalid(path, format!("'{}' is not a list index", text)))?;
    Ok((PathSegment::Index(index), &inner[close + 1..]))
}

fn invalid(path: &str, message: impl Into<String>) -> Error {
    Error::Expression {
        expression: path.to_string(),
        message: message.into(),
    }
}

/// Follow `path` through `value`.
///
/// Keys index into mappings and indices into sequences. A key segment that
/// spells a number also indexes a sequence, so `hosts.0` and `hosts[0]` are
/// equivalent. Returns the segment position that could not be resolved on
/// failure.
pub fn lookup<'a>(value: &'a Value, path: &[PathSegment]) -> std::result::Result<&'a Value, usize> {
    let mut current = value;
    for (position, segment) in path.iter().enumerate() {
        let next = match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => map.get(key),
            (PathSegment::Key(key), Value::Array(items)) => {
                key.parse::<usize>().ok().and_then(|idx| items.get(idx))
            }
            (PathSegment::Index(idx), Value::Array(items)) => items.get(*idx),
            (PathSegment::Index(idx), Value::Object(map)) => map.get(&idx.to_string()),
            _ => None,
        };
        current = next.ok_or(position)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_path_simple_dot_notation() {
        let segments = parse_path("foo.bar.baz").unwrap();
        assert_eq!(
            segments,
            vec![
                PathSegment::Key("foo".to_string()),
                PathSegment::Key("bar".to_string()),
                PathSegment::Key("baz".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_path_mixed() {
        let segments = parse_path("servers[0].host").unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], PathSegment::Key("servers".to_string()));
        assert_eq!(segments[1], PathSegment::Index(0));
        assert_eq!(segments[2], PathSegment::Key("host".to_string()));
    }

    #[test]
    fn test_parse_path_quoted_key() {
        let segments = parse_path(r#"config["special.key"]"#).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1], PathSegment::Key("special.key".to_string()));

        let segments = parse_path("config['single']").unwrap();
        assert_eq!(segments[1], PathSegment::Key("single".to_string()));
    }

    #[test]
    fn test_parse_path_empty() {
        assert!(parse_path("").unwrap().is_empty());
        assert!(parse_path("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_path_rejects_malformed_paths() {
        for (path, fragment) in [
            ("a..b", "empty name"),
            ("a.", "empty name"),
            ("a[0]b", "expected '.' or '['"),
            ("a[x]", "'x' is not a list index"),
            ("a[1", "unclosed '['"),
            ("a[\"k]", "unterminated quoted key"),
            ("a['k' x]", "expected ']'"),
        ] {
            let err = parse_path(path).unwrap_err();
            assert!(
                err.to_string().contains(fragment),
                "{}: {} should contain {}",
                path,
                err,
                fragment
            );
        }
    }

    #[test]
    fn test_lookup_nested() {
        let value = json!({"item": {"host": {"key": "a", "value": [1, 2]}}});
        let path = parse_path("item.host.value[1]").unwrap();
        assert_eq!(lookup(&value, &path), Ok(&json!(2)));
    }

    #[test]
    fn test_lookup_numeric_key_on_sequence() {
        let value = json!({"hosts": ["x", "y"]});
        assert_eq!(lookup(&value, &parse_path("hosts.1").unwrap()), Ok(&json!("y")));
    }

    #[test]
    fn test_lookup_reports_failing_segment() {
        let value = json!({"item": {"host": "a"}});
        assert_eq!(lookup(&value, &parse_path("item.port").unwrap()), Err(1));
        assert_eq!(lookup(&value, &parse_path("item.host.name").unwrap()), Err(2));
    }
}
