//! # Document Loading and Rendering
//!
//! Inputs to every command are plain data documents: JSON, YAML or TOML.
//! They are all read into a `serde_json::Value` so the merge and expansion
//! engines only ever see one value model. Output is rendered as JSON or YAML.
//!
//! The format of a file is chosen from its extension: `.json`, `.toml`, and
//! anything else is read as YAML (which also accepts JSON).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Formats a document can be read from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Json,
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// Pick a format from a file extension, defaulting to YAML.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => DocumentFormat::Json,
            Some("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// Formats results can be written in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(Error::validation(format!(
                "invalid output format '{}', expected json or yaml",
                other
            ))),
        }
    }
}

/// Parse document text in the given format
///
/// # Examples
///
/// ```
/// use dependent_merge::config::{parse_document, DocumentFormat};
///
/// let value = parse_document("a: [1, 2]", DocumentFormat::Yaml).unwrap();
/// assert_eq!(value["a"][1], 2);
/// ```
pub fn parse_document(content: &str, format: DocumentFormat) -> Result<Value> {
    Ok(match format {
        DocumentFormat::Json => serde_json::from_str(content)?,
        DocumentFormat::Yaml => {
            if content.trim().is_empty() {
                Value::Null
            } else {
                serde_yaml::from_str(content)?
            }
        }
        DocumentFormat::Toml => toml::from_str(content)?,
    })
}

/// Read and parse a document from disk, choosing the format by extension.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    parse_document(&content, DocumentFormat::from_path(path))
}

/// Read a document that must hold a mapping, such as a variables file.
pub fn load_mapping<P: AsRef<Path>>(path: P) -> Result<Map<String, Value>> {
    let path = path.as_ref();
    match load_document(path)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(Error::validation(format!(
            "{} must contain a mapping, found a {}",
            path.display(),
            crate::merge::type_name(&other)
        ))),
    }
}

/// Render a value in the requested output format
pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).map_err(|err| {
            Error::Serialization {
                message: format!("Failed to serialize JSON: {}", err),
            }
        }),
        OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|err| Error::Serialization {
            message: format!("Failed to serialize YAML: {}", err),
        }),
    }
}
