//! # Error Handling
//!
//! This module defines the centralized error type for `dependent-merge`. It
//! uses the `thiserror` library to describe every failure mode of the merge
//! and expansion engines with enough context to be surfaced verbatim.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum representing all possible errors.
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Errors fall into two groups:
//!
//! - Caller contract violations (`Validation`, `MissingKey`): malformed
//!   dimension specifications, duplicate names, records without the key field,
//!   arguments of the wrong shape.
//! - Collaborator failures (`Evaluation`, `Expression`): the expression
//!   evaluator failed, or produced something that is not a collection.
//!
//! None of these are retryable. Every error aborts the call that raised it and
//! no partial output is returned.

use thiserror::Error;

/// Main error type for dependent-merge operations
#[derive(Error, Debug)]
pub enum Error {
    /// The caller passed arguments that violate an operation's contract.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A record handed to a keyed merge lacks the key field.
    #[error("Missing key field '{index}' in record {record}")]
    MissingKey { index: String, record: String },

    /// Evaluating a dependent dimension failed.
    ///
    /// Carries the dimension name, the expression text and the partial
    /// assignment that was in scope when evaluation was attempted.
    #[error("Evaluation error for dimension '{dimension}' (expression: {expression}, item: {assignment}): {message}")]
    Evaluation {
        dimension: String,
        expression: String,
        assignment: String,
        message: String,
    },

    /// The expression evaluator could not resolve an expression.
    #[error("Expression error in '{expression}': {message}")]
    Expression { expression: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON parsing error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A TOML parsing error, wrapped from `toml::de::Error`.
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// An error occurred during serialization.
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
