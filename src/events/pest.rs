use serde::{Deserialize, Serialize};

use crate::catalog::{EventCategory, EventTypeDescriptor, Field};
use crate::submission::FieldReader;

const CATEGORY: EventCategory = EventCategory::PestManagement;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PestManagementEvent {
    #[serde(rename = "SC")]
    Scouting {
        pest_name: Option<String>,
        damage_percentage: Option<f64>,
        observation: Option<String>,
    },
    #[serde(rename = "BC")]
    BiologicalControl {
        control_agent: Option<String>,
        area: Option<f64>,
        observation: Option<String>,
    },
    #[serde(rename = "TR")]
    TrapMonitoring {
        trap_count: Option<i64>,
        pest_name: Option<String>,
        observation: Option<String>,
    },
    #[serde(rename = "OU")]
    Outbreak {
        pest_name: Option<String>,
        damage_percentage: Option<f64>,
        area: Option<f64>,
        observation: Option<String>,
    },
}

impl PestManagementEvent {
    pub(crate) fn descriptors() -> Vec<EventTypeDescriptor> {
        vec![
            EventTypeDescriptor::new(CATEGORY, "SC", "Scouting")
                .require(&[Field::PestName])
                .optional(&[Field::DamagePercentage, Field::Observation]),
            EventTypeDescriptor::new(CATEGORY, "BC", "Biological control")
                .require(&[Field::ControlAgent])
                .optional(&[Field::Area, Field::Observation]),
            EventTypeDescriptor::new(CATEGORY, "TR", "Trap monitoring")
                .require(&[Field::TrapCount])
                .optional(&[Field::PestName, Field::Observation]),
            EventTypeDescriptor::new(CATEGORY, "OU", "Outbreak")
                .require(&[Field::PestName, Field::DamagePercentage])
                .optional(&[Field::Area, Field::Observation]),
        ]
    }

    pub(crate) fn read(code: &str, r: &mut FieldReader<'_>) -> Option<Self> {
        let event = match code {
            "SC" => Self::Scouting {
                pest_name: r.text(Field::PestName),
                damage_percentage: r.decimal(Field::DamagePercentage),
                observation: r.text(Field::Observation),
            },
            "BC" => Self::BiologicalControl {
                control_agent: r.text(Field::ControlAgent),
                area: r.decimal(Field::Area),
                observation: r.text(Field::Observation),
            },
            "TR" => Self::TrapMonitoring {
                trap_count: r.integer(Field::TrapCount),
                pest_name: r.text(Field::PestName),
                observation: r.text(Field::Observation),
            },
            "OU" => Self::Outbreak {
                pest_name: r.text(Field::PestName),
                damage_percentage: r.decimal(Field::DamagePercentage),
                area: r.decimal(Field::Area),
                observation: r.text(Field::Observation),
            },
            _ => return None,
        };
        Some(event)
    }
}
