//! Typed event payloads, one enum per category and one variant per event type
//! code. Each variant carries exactly the fields its catalog descriptor lists,
//! serialized under their wire names with the code as the `type` tag.

mod business;
mod chemical;
mod equipment;
mod general;
mod pest;
mod production;
mod soil;
mod weather;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::{EventCategory, EventTypeDescriptor};
use crate::submission::FieldReader;

pub use business::BusinessEvent;
pub use chemical::{ChemicalApplication, ChemicalEvent};
pub use equipment::EquipmentEvent;
pub use general::GeneralEvent;
pub use pest::PestManagementEvent;
pub use production::ProductionEvent;
pub use soil::SoilManagementEvent;
pub use weather::WeatherEvent;

pub(crate) fn builtin_descriptors() -> Vec<EventTypeDescriptor> {
    let mut descriptors = Vec::new();
    descriptors.extend(WeatherEvent::descriptors());
    descriptors.extend(ChemicalEvent::descriptors());
    descriptors.extend(ProductionEvent::descriptors());
    descriptors.extend(EquipmentEvent::descriptors());
    descriptors.extend(SoilManagementEvent::descriptors());
    descriptors.extend(PestManagementEvent::descriptors());
    descriptors.extend(BusinessEvent::descriptors());
    descriptors.extend(GeneralEvent::descriptors());
    descriptors
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    Weather(WeatherEvent),
    Chemical(ChemicalEvent),
    Production(ProductionEvent),
    Equipment(EquipmentEvent),
    SoilManagement(SoilManagementEvent),
    PestManagement(PestManagementEvent),
    Business(BusinessEvent),
    General(GeneralEvent),
}

impl EventPayload {
    /// Builds the variant for `code`, or `None` if the category has no such
    /// type.
    pub fn read(category: EventCategory, code: &str, reader: &mut FieldReader<'_>) -> Option<Self> {
        let code = code.trim().to_ascii_uppercase();
        match category {
            EventCategory::Weather => WeatherEvent::read(&code, reader).map(Self::Weather),
            EventCategory::Chemical => ChemicalEvent::read(&code, reader).map(Self::Chemical),
            EventCategory::Production => {
                ProductionEvent::read(&code, reader).map(Self::Production)
            }
            EventCategory::Equipment => EquipmentEvent::read(&code, reader).map(Self::Equipment),
            EventCategory::SoilManagement => {
                SoilManagementEvent::read(&code, reader).map(Self::SoilManagement)
            }
            EventCategory::PestManagement => {
                PestManagementEvent::read(&code, reader).map(Self::PestManagement)
            }
            EventCategory::Business => BusinessEvent::read(&code, reader).map(Self::Business),
            EventCategory::General => GeneralEvent::read(&code, reader).map(Self::General),
        }
    }

    pub fn category(&self) -> EventCategory {
        match self {
            EventPayload::Weather(_) => EventCategory::Weather,
            EventPayload::Chemical(_) => EventCategory::Chemical,
            EventPayload::Production(_) => EventCategory::Production,
            EventPayload::Equipment(_) => EventCategory::Equipment,
            EventPayload::SoilManagement(_) => EventCategory::SoilManagement,
            EventPayload::PestManagement(_) => EventCategory::PestManagement,
            EventPayload::Business(_) => EventCategory::Business,
            EventPayload::General(_) => EventCategory::General,
        }
    }

    /// JSON object body keyed by wire name, including the `type` tag.
    pub fn to_body(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "event payload serialized to a non-object: {}",
                other
            ))),
        }
    }
}
