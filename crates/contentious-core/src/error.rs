//! Error types for the contentious workspace.
//!
//! Two classes of failure exist: template syntax errors, which surface at
//! template compile time and are fatal, and validation errors reported by a
//! content store when saving, which are recoverable and carry a per-field
//! message map for the HTTP boundary to serialize.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Key used for errors that are not attached to a specific field.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// A validation failure reported by a content store on save.
///
/// Carries a field name → message map. Errors that do not belong to a
/// particular field are filed under [`NON_FIELD_ERRORS`].
///
/// # Examples
///
/// ```
/// use contentious_core::ValidationError;
///
/// let err = ValidationError::for_field("href", "Enter a valid URL.");
/// assert_eq!(err.field_errors.get("href").unwrap(), "Enter a valid URL.");
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ValidationError {
    /// Per-field error messages, keyed by field name.
    pub field_errors: HashMap<String, String>,
}

impl ValidationError {
    /// Creates a validation error for a single field.
    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(field.into(), message.into());
        Self { field_errors }
    }

    /// Creates a validation error not attached to any field.
    pub fn non_field(message: impl Into<String>) -> Self {
        Self::for_field(NON_FIELD_ERRORS, message)
    }

    /// Creates a validation error from a ready-made field → message map.
    pub fn with_field_errors(field_errors: HashMap<String, String>) -> Self {
        Self { field_errors }
    }

    /// Adds a field error, keeping any already recorded.
    #[must_use]
    pub fn and_field(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.field_errors.insert(field.into(), message.into());
        self
    }

    /// Returns true if no messages were recorded.
    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.field_errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for the contentious workspace.
#[derive(Error, Debug)]
pub enum ContentiousError {
    /// A malformed tag declaration or template. Fatal at compile time.
    #[error("Template syntax error: {0}")]
    TemplateSyntax(String),

    /// A content store rejected a save.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl ContentiousError {
    /// Shorthand for a [`ContentiousError::TemplateSyntax`] with a formatted message.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::TemplateSyntax(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_field() {
        let err = ValidationError::for_field("src", "Enter a valid URL.");
        assert_eq!(err.field_errors.len(), 1);
        assert_eq!(err.field_errors["src"], "Enter a valid URL.");
    }

    #[test]
    fn test_non_field() {
        let err = ValidationError::non_field("Something went wrong.");
        assert_eq!(err.field_errors[NON_FIELD_ERRORS], "Something went wrong.");
    }

    #[test]
    fn test_and_field_accumulates() {
        let err = ValidationError::for_field("href", "bad").and_field("src", "also bad");
        assert_eq!(err.field_errors.len(), 2);
    }

    #[test]
    fn test_display_joins_messages() {
        let err = ValidationError::for_field("href", "bad");
        assert_eq!(err.to_string(), "href: bad");
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let err = ValidationError::for_field("onclick", "Sorry, rabbits() is not valid.");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["onclick"], "Sorry, rabbits() is not valid.");
    }

    #[test]
    fn test_contentious_error_from_validation() {
        let err: ContentiousError = ValidationError::non_field("no").into();
        assert!(matches!(err, ContentiousError::Validation(_)));
    }

    #[test]
    fn test_syntax_error_display() {
        let err = ContentiousError::syntax("editable tag expects an 'editable' kwarg.");
        assert!(err.to_string().contains("editable"));
    }
}
