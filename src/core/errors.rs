/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Refusal raised by a guarded operation invoked after its owner was disposed
///
/// Carries the short type name of the disposed owner.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(rename_all = "snake_case")]
#[error("{type_name} is disposed")]
#[diagnostic(
    code(dispose::disposed),
    help("The owner has been disposed. Create a new instance instead of reusing this one.")
)]
pub struct DisposedError {
    pub type_name: String,
}

impl DisposedError {
    /// Create a refusal for the given owner type name
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }

    /// Create a refusal naming `T`
    pub fn of<T: ?Sized>() -> Self {
        Self::new(super::types::short_type_name::<T>())
    }
}

/// Configuration errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Invalid configuration document: {0}")]
    #[diagnostic(
        code(config::invalid_document),
        help("The configuration must be a JSON object matching DisposeConfig.")
    )]
    InvalidDocument(String),

    #[error("Invalid value for {key}: {value}")]
    #[diagnostic(
        code(config::invalid_value),
        help("Check the environment variable; see DisposeConfig::from_env for accepted values.")
    )]
    InvalidValue { key: String, value: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::InvalidDocument(err.to_string())
    }
}
