//! Core idea types for vidjot.
//!
//! This module defines the one persisted record type and the form input
//! that creates or edits it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A video idea.
///
/// The id is assigned by the storage layer on insert; `date` defaults to the
/// moment the idea was created and is not touched by later edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    /// Unique identifier (assigned by storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Short title of the idea.
    pub title: String,

    /// Free-form description.
    pub details: String,

    /// When the idea was created.
    pub date: DateTime<Utc>,
}

impl Idea {
    /// Create a new, not yet stored idea dated now.
    #[must_use]
    pub fn new(title: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            details: details.into(),
            date: Utc::now(),
        }
    }
}

/// A validation failure on the idea form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// The title was missing or empty.
    MissingTitle,
    /// The details were missing or empty.
    MissingDetails,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "Please add a title"),
            Self::MissingDetails => write!(f, "Please add some details"),
        }
    }
}

/// Submitted idea form fields, as posted by the add and edit forms.
///
/// Fields are optional so that a form with a missing field still
/// deserializes and can be re-rendered with errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IdeaInput {
    /// Submitted title.
    pub title: Option<String>,
    /// Submitted details.
    pub details: Option<String>,
}

impl IdeaInput {
    /// Build an input from concrete values.
    #[must_use]
    pub fn new(title: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            details: Some(details.into()),
        }
    }

    /// Collect every validation error, title first.
    #[must_use]
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if is_blank(self.title.as_deref()) {
            errors.push(FieldError::MissingTitle);
        }
        if is_blank(self.details.as_deref()) {
            errors.push(FieldError::MissingDetails);
        }
        errors
    }

    /// Validate and turn the input into an unsaved [`Idea`].
    ///
    /// # Errors
    ///
    /// Returns the collected field errors if any field is missing.
    pub fn into_idea(self) -> std::result::Result<Idea, Vec<FieldError>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Idea::new(
            self.title.unwrap_or_default(),
            self.details.unwrap_or_default(),
        ))
    }

    /// Submitted title, or empty when absent.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Submitted details, or empty when absent.
    #[must_use]
    pub fn details(&self) -> &str {
        self.details.as_deref().unwrap_or_default()
    }
}

impl From<&Idea> for IdeaInput {
    fn from(idea: &Idea) -> Self {
        Self::new(idea.title.clone(), idea.details.clone())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idea_new() {
        let before = Utc::now();
        let idea = Idea::new("Title", "Details");

        assert!(idea.id.is_none());
        assert_eq!(idea.title, "Title");
        assert_eq!(idea.details, "Details");
        assert!(idea.date >= before);
    }

    #[test]
    fn test_idea_serialize_skips_missing_id() {
        let idea = Idea::new("Title", "Details");
        let json = serde_json::to_string(&idea).unwrap();
        assert!(!json.contains("\"id\""));
        assert!(json.contains("\"title\":\"Title\""));
    }

    #[test]
    fn test_field_error_messages() {
        assert_eq!(FieldError::MissingTitle.to_string(), "Please add a title");
        assert_eq!(
            FieldError::MissingDetails.to_string(),
            "Please add some details"
        );
    }

    #[test]
    fn test_validate_complete_input() {
        assert!(IdeaInput::new("a", "b").validate().is_empty());
    }

    #[test]
    fn test_validate_collects_all_errors_in_order() {
        let errors = IdeaInput::default().validate();
        assert_eq!(
            errors,
            vec![FieldError::MissingTitle, FieldError::MissingDetails]
        );
    }

    #[test]
    fn test_validate_empty_strings_are_missing() {
        let errors = IdeaInput::new("", "details").validate();
        assert_eq!(errors, vec![FieldError::MissingTitle]);

        let errors = IdeaInput::new("title", "").validate();
        assert_eq!(errors, vec![FieldError::MissingDetails]);
    }

    #[test]
    fn test_into_idea() {
        let idea = IdeaInput::new("My video", "About Rust").into_idea().unwrap();
        assert_eq!(idea.title, "My video");
        assert_eq!(idea.details, "About Rust");
        assert!(idea.id.is_none());
    }

    #[test]
    fn test_into_idea_rejects_missing_fields() {
        let input = IdeaInput {
            title: Some("only a title".to_string()),
            details: None,
        };
        assert_eq!(input.into_idea(), Err(vec![FieldError::MissingDetails]));
    }

    #[test]
    fn test_input_accessors_default_to_empty() {
        let input = IdeaInput::default();
        assert_eq!(input.title(), "");
        assert_eq!(input.details(), "");
    }

    #[test]
    fn test_input_from_idea() {
        let idea = Idea::new("t", "d");
        let input = IdeaInput::from(&idea);
        assert_eq!(input, IdeaInput::new("t", "d"));
    }

    #[test]
    fn test_input_deserializes_partial_form() {
        let input: IdeaInput = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(input.title.as_deref(), Some("x"));
        assert!(input.details.is_none());
    }
}
