//! Collaborators the form controller talks to. The controller only depends on
//! these traits; concrete backends live elsewhere.

pub mod outbox;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Field;
use crate::errors::SubmissionError;
use crate::form::FormContext;
use crate::submission::SubmissionPayload;

pub use outbox::OutboxClient;

/// Server record returned by a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub resource: String,
    pub created_at: DateTime<Utc>,
}

/// Remote create call.
pub trait MutationClient {
    fn create(&mut self, payload: &SubmissionPayload) -> Result<Record, SubmissionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStatus {
    Success,
    Error,
    Info,
}

/// Toast-style feedback shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub status: NotificationStatus,
    pub duration_ms: u64,
}

impl Notification {
    pub fn new(
        status: NotificationStatus,
        title: impl Into<String>,
        description: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status,
            duration_ms,
        }
    }
}

pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

pub trait Navigator {
    fn go_to(&mut self, path: &str);
}

/// Navigator that only records and logs where the UI was sent.
#[derive(Debug, Default)]
pub struct LogNavigator {
    pub history: Vec<String>,
}

impl Navigator for LogNavigator {
    fn go_to(&mut self, path: &str) {
        tracing::info!(path, "navigating");
        self.history.push(path.to_string());
    }
}

/// Request for the options of a reference field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionQuery {
    pub field: Field,
    pub context: FormContext,
}

/// Snapshot of a remote query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryState::Failed(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Ready(data) => Some(data),
            _ => None,
        }
    }
}

/// Source of dropdown options such as crop types.
pub trait OptionSource {
    fn fetch(&mut self, query: &OptionQuery) -> QueryState<Vec<String>>;
}

/// Option source backed by a fixed table.
#[derive(Debug, Clone, Default)]
pub struct StaticOptionSource {
    options: BTreeMap<Field, Vec<String>>,
}

impl StaticOptionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, options: Vec<String>) -> Self {
        self.options.insert(field, options);
        self
    }
}

impl OptionSource for StaticOptionSource {
    fn fetch(&mut self, query: &OptionQuery) -> QueryState<Vec<String>> {
        match self.options.get(&query.field) {
            Some(options) => QueryState::Ready(options.clone()),
            None => QueryState::Failed(format!("no options for {}", query.field.label())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_source_serves_configured_fields() {
        let mut source =
            StaticOptionSource::new().with(Field::CropType, vec!["Maize".into(), "Wheat".into()]);
        let query = OptionQuery {
            field: Field::CropType,
            context: FormContext::default(),
        };
        assert_eq!(source.fetch(&query).data().map(Vec::len), Some(2));

        let missing = OptionQuery {
            field: Field::YieldUnit,
            context: FormContext::default(),
        };
        assert!(source.fetch(&missing).is_error());
    }

    #[test]
    fn log_navigator_keeps_history() {
        let mut navigator = LogNavigator::default();
        navigator.go_to("/productions");
        assert_eq!(navigator.history, vec!["/productions".to_string()]);
    }
}
