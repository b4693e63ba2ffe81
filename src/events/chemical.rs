use serde::{Deserialize, Serialize};

use crate::catalog::{EventCategory, EventTypeDescriptor, Field};
use crate::submission::FieldReader;

const CATEGORY: EventCategory = EventCategory::Chemical;

const REQUIRED: &[Field] = &[Field::ProductName, Field::Volume];
const OPTIONAL: &[Field] = &[
    Field::Concentration,
    Field::Area,
    Field::WayOfApplication,
    Field::TimePeriod,
    Field::Observation,
];

/// Product application shared by every chemical event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemicalApplication {
    pub commercial_name: Option<String>,
    pub volume: Option<f64>,
    pub concentration: Option<f64>,
    pub area: Option<f64>,
    pub way_of_application: Option<String>,
    pub time_period: Option<String>,
    pub observation: Option<String>,
}

impl ChemicalApplication {
    fn read(r: &mut FieldReader<'_>) -> Self {
        Self {
            commercial_name: r.text(Field::ProductName),
            volume: r.decimal(Field::Volume),
            concentration: r.decimal(Field::Concentration),
            area: r.decimal(Field::Area),
            way_of_application: r.choice(Field::WayOfApplication),
            time_period: r.text(Field::TimePeriod),
            observation: r.text(Field::Observation),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChemicalEvent {
    #[serde(rename = "FE")]
    Fertilizer(ChemicalApplication),
    #[serde(rename = "PE")]
    Pesticide(ChemicalApplication),
    #[serde(rename = "FU")]
    Fungicide(ChemicalApplication),
    #[serde(rename = "HE")]
    Herbicide(ChemicalApplication),
}

impl ChemicalEvent {
    pub(crate) fn descriptors() -> Vec<EventTypeDescriptor> {
        let base = |code: &'static str, name: &'static str| {
            EventTypeDescriptor::new(CATEGORY, code, name)
                .require(REQUIRED)
                .optional(OPTIONAL)
        };
        vec![
            base("FE", "Fertilizer").with_default(Field::WayOfApplication, "broadcast"),
            base("PE", "Pesticide").with_default(Field::WayOfApplication, "foliar"),
            base("FU", "Fungicide").with_default(Field::WayOfApplication, "foliar"),
            base("HE", "Herbicide").with_default(Field::WayOfApplication, "foliar"),
        ]
    }

    pub(crate) fn read(code: &str, r: &mut FieldReader<'_>) -> Option<Self> {
        match code {
            "FE" => Some(Self::Fertilizer(ChemicalApplication::read(r))),
            "PE" => Some(Self::Pesticide(ChemicalApplication::read(r))),
            "FU" => Some(Self::Fungicide(ChemicalApplication::read(r))),
            "HE" => Some(Self::Herbicide(ChemicalApplication::read(r))),
            _ => None,
        }
    }
}
