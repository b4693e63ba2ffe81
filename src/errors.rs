use thiserror::Error;

use crate::catalog::{EventCategory, Field};

/// Field-level validation failure. Shown inline next to the field and never
/// sent to the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {}", .field.label(), .message)]
pub struct ValidationError {
    pub field: Field,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Raw text that could not be converted to the field's type. The submission
/// adapter turns these into absent values instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot read `{raw}` as {expected} for {field}")]
pub struct CoercionError {
    pub field: Field,
    pub raw: String,
    pub expected: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionErrorKind {
    /// The backend refused the payload.
    Rejected,
    Network,
    Unauthorized,
}

/// Failure reported by the mutation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SubmissionError {
    pub kind: SubmissionErrorKind,
    pub message: String,
}

impl SubmissionError {
    pub fn new(kind: SubmissionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(SubmissionErrorKind::Rejected, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(SubmissionErrorKind::Network, message)
    }
}

impl From<std::io::Error> for SubmissionError {
    fn from(err: std::io::Error) -> Self {
        SubmissionError::network(err.to_string())
    }
}

impl From<serde_json::Error> for SubmissionError {
    fn from(err: serde_json::Error) -> Self {
        SubmissionError::rejected(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Unknown event type `{code}` for {category}{}", suggestion_hint(.suggestion))]
    UnknownDiscriminator {
        category: EventCategory,
        code: String,
        suggestion: Option<String>,
    },
    #[error("Unknown event category `{0}`")]
    UnknownCategory(String),
    #[error("No baseline event type registered for {0}")]
    MissingBaseline(EventCategory),
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(code) => format!(" (did you mean `{}`?)", code),
        None => String::new(),
    }
}

/// Errors raised by the form controller. Submission failures are not part of
/// this type; they are reported through the notifier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("{}", join_validation(.0))]
    Validation(Vec<ValidationError>),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("Select an event category first")]
    CategoryNotSelected,
    #[error("The event category is fixed for this form")]
    CategoryLocked,
    #[error("Select an event type first")]
    DiscriminatorNotSelected,
    #[error("Step {index} does not exist (form has {total} steps)")]
    StepOutOfRange { index: usize, total: usize },
    #[error("Already at the last step")]
    NoNextStep,
    #[error("Submit is only available on the last step (currently on step {index})")]
    NotTerminalStep { index: usize },
    #[error("A submission is already in progress")]
    SubmissionInFlight,
    #[error("No submission is in progress")]
    NoSubmissionInFlight,
    #[error("Could not build payload: {0}")]
    Payload(String),
    #[error("The form is closed")]
    Closed,
}

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl FormError {
    /// Field errors carried by a validation failure.
    pub fn field_errors(&self) -> &[ValidationError] {
        match self {
            FormError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// User-facing CLI error wrapper.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_discriminator_mentions_suggestion() {
        let err = CatalogError::UnknownDiscriminator {
            category: EventCategory::Weather,
            code: "FRO".into(),
            suggestion: Some("FR".into()),
        };
        assert_eq!(
            err.to_string(),
            "Unknown event type `FRO` for weather (did you mean `FR`?)"
        );
    }

    #[test]
    fn validation_error_displays_label_and_message() {
        let err = ValidationError::new(Field::LowerTemperature, "Enter a number");
        assert_eq!(err.to_string(), "Lowest temperature: Enter a number");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn validation_errors_join_with_labels() {
        let err = FormError::Validation(vec![
            ValidationError::new(Field::FuelAmount, "This field is required"),
            ValidationError::new(Field::EquipmentName, "This field is required"),
        ]);
        assert_eq!(
            err.to_string(),
            "Fuel amount (l): This field is required; Equipment: This field is required"
        );
        assert_eq!(err.field_errors().len(), 2);
    }
}
