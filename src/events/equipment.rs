use serde::{Deserialize, Serialize};

use crate::catalog::{EventCategory, EventTypeDescriptor, Field};
use crate::submission::FieldReader;

const CATEGORY: EventCategory = EventCategory::Equipment;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EquipmentEvent {
    #[serde(rename = "MN")]
    Maintenance {
        equipment_name: Option<String>,
        maintenance_cost: Option<f64>,
        hours_used: Option<f64>,
        observation: Option<String>,
    },
    #[serde(rename = "FC")]
    FuelConsumption {
        equipment_name: Option<String>,
        fuel_amount: Option<f64>,
        fuel_type: Option<String>,
        hours_used: Option<f64>,
        observation: Option<String>,
    },
    #[serde(rename = "RE")]
    Repair {
        equipment_name: Option<String>,
        maintenance_cost: Option<f64>,
        observation: Option<String>,
    },
    #[serde(rename = "CA")]
    Calibration {
        equipment_name: Option<String>,
        observation: Option<String>,
    },
}

impl EquipmentEvent {
    pub(crate) fn descriptors() -> Vec<EventTypeDescriptor> {
        vec![
            EventTypeDescriptor::new(CATEGORY, "MN", "Maintenance")
                .require(&[Field::EquipmentName])
                .optional(&[Field::MaintenanceCost, Field::HoursUsed, Field::Observation]),
            EventTypeDescriptor::new(CATEGORY, "FC", "Fuel consumption")
                .require(&[Field::EquipmentName, Field::FuelAmount])
                .optional(&[Field::FuelType, Field::HoursUsed, Field::Observation])
                .with_default(Field::FuelType, "diesel"),
            EventTypeDescriptor::new(CATEGORY, "RE", "Repair")
                .require(&[Field::EquipmentName])
                .optional(&[Field::MaintenanceCost, Field::Observation]),
            EventTypeDescriptor::new(CATEGORY, "CA", "Calibration")
                .require(&[Field::EquipmentName])
                .optional(&[Field::Observation]),
        ]
    }

    pub(crate) fn read(code: &str, r: &mut FieldReader<'_>) -> Option<Self> {
        let event = match code {
            "MN" => Self::Maintenance {
                equipment_name: r.text(Field::EquipmentName),
                maintenance_cost: r.decimal(Field::MaintenanceCost),
                hours_used: r.decimal(Field::HoursUsed),
                observation: r.text(Field::Observation),
            },
            "FC" => Self::FuelConsumption {
                equipment_name: r.text(Field::EquipmentName),
                fuel_amount: r.decimal(Field::FuelAmount),
                fuel_type: r.choice(Field::FuelType),
                hours_used: r.decimal(Field::HoursUsed),
                observation: r.text(Field::Observation),
            },
            "RE" => Self::Repair {
                equipment_name: r.text(Field::EquipmentName),
                maintenance_cost: r.decimal(Field::MaintenanceCost),
                observation: r.text(Field::Observation),
            },
            "CA" => Self::Calibration {
                equipment_name: r.text(Field::EquipmentName),
                observation: r.text(Field::Observation),
            },
            _ => return None,
        };
        Some(event)
    }
}
