use serde::{Deserialize, Serialize};

use crate::catalog::{EventCategory, EventTypeDescriptor, Field};
use crate::submission::FieldReader;

const CATEGORY: EventCategory = EventCategory::Production;

/// Field work performed on a running production.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProductionEvent {
    #[serde(rename = "PL")]
    Planting {
        plant_density: Option<f64>,
        observation: Option<String>,
    },
    #[serde(rename = "HA")]
    Harvesting {
        yield_amount: Option<f64>,
        yield_unit: Option<String>,
        observation: Option<String>,
    },
    #[serde(rename = "IR")]
    Irrigation {
        water_volume: Option<f64>,
        irrigation_method: Option<String>,
        duration_hours: Option<f64>,
        observation: Option<String>,
    },
    #[serde(rename = "PR")]
    Pruning { observation: Option<String> },
    #[serde(rename = "TI")]
    Tillage {
        tillage_depth: Option<f64>,
        observation: Option<String>,
    },
}

impl ProductionEvent {
    pub(crate) fn descriptors() -> Vec<EventTypeDescriptor> {
        vec![
            EventTypeDescriptor::new(CATEGORY, "PL", "Planting")
                .optional(&[Field::PlantDensity, Field::Observation]),
            EventTypeDescriptor::new(CATEGORY, "HA", "Harvesting")
                .require(&[Field::YieldAmount])
                .optional(&[Field::YieldUnit, Field::Observation])
                .with_default(Field::YieldUnit, "kg"),
            EventTypeDescriptor::new(CATEGORY, "IR", "Irrigation")
                .require(&[Field::WaterVolume])
                .optional(&[Field::IrrigationMethod, Field::DurationHours, Field::Observation])
                .with_default(Field::IrrigationMethod, "drip"),
            EventTypeDescriptor::new(CATEGORY, "PR", "Pruning").optional(&[Field::Observation]),
            EventTypeDescriptor::new(CATEGORY, "TI", "Tillage")
                .optional(&[Field::TillageDepth, Field::Observation]),
        ]
    }

    pub(crate) fn read(code: &str, r: &mut FieldReader<'_>) -> Option<Self> {
        let event = match code {
            "PL" => Self::Planting {
                plant_density: r.decimal(Field::PlantDensity),
                observation: r.text(Field::Observation),
            },
            "HA" => Self::Harvesting {
                yield_amount: r.decimal(Field::YieldAmount),
                yield_unit: r.choice(Field::YieldUnit),
                observation: r.text(Field::Observation),
            },
            "IR" => Self::Irrigation {
                water_volume: r.decimal(Field::WaterVolume),
                irrigation_method: r.choice(Field::IrrigationMethod),
                duration_hours: r.decimal(Field::DurationHours),
                observation: r.text(Field::Observation),
            },
            "PR" => Self::Pruning {
                observation: r.text(Field::Observation),
            },
            "TI" => Self::Tillage {
                tillage_depth: r.decimal(Field::TillageDepth),
                observation: r.text(Field::Observation),
            },
            _ => return None,
        };
        Some(event)
    }
}
