//! Wizard form state, step definitions, and the controller driving them.

pub mod controller;
pub mod steps;
pub mod validation;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{EventCategory, Field};

pub use controller::{
    DiscriminatorChange, FormController, FormSettings, SubmitOutcome, VisibleField, WizardStatus,
};
pub use steps::{FlowDefinition, FlowTarget, StepFields, StepRule, WizardStep};
pub use validation::ValidationPolicy;

/// Values and position of one open wizard. Owned by exactly one controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub values: BTreeMap<Field, String>,
    pub current_step: usize,
    pub category: Option<EventCategory>,
    pub discriminator: Option<String>,
}

impl FormState {
    pub fn value(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Parsed date value, `None` when blank or malformed.
    pub fn date(&self, field: Field) -> Option<NaiveDate> {
        self.value(field)
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), validation::DATE_FORMAT).ok())
    }
}

/// Records the form is opened against: the current company, establishment,
/// parcel and production, plus the reference date used for defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormContext {
    pub company: Option<u64>,
    pub establishment: Option<u64>,
    pub parcel: Option<u64>,
    pub production: Option<u64>,
    pub today: NaiveDate,
}

impl FormContext {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            ..Self::default()
        }
    }

    pub fn with_company(mut self, id: u64) -> Self {
        self.company = Some(id);
        self
    }

    pub fn with_establishment(mut self, id: u64) -> Self {
        self.establishment = Some(id);
        self
    }

    pub fn with_parcel(mut self, id: u64) -> Self {
        self.parcel = Some(id);
        self
    }

    pub fn with_production(mut self, id: u64) -> Self {
        self.production = Some(id);
        self
    }

    /// Context ids that are set, keyed by wire name.
    pub fn ids(&self) -> Vec<(&'static str, u64)> {
        [
            ("company", self.company),
            ("establishment", self.establishment),
            ("parcel", self.parcel),
            ("production", self.production),
        ]
        .into_iter()
        .filter_map(|(key, id)| id.map(|id| (key, id)))
        .collect()
    }
}
