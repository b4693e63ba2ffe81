use serde::{Deserialize, Serialize};

use crate::catalog::{EventCategory, EventTypeDescriptor, Field};
use crate::submission::FieldReader;

const CATEGORY: EventCategory = EventCategory::SoilManagement;

/// Soil management work. Every type carries a `method` whose suggested value
/// differs per type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SoilManagementEvent {
    #[serde(rename = "ST")]
    SoilTesting {
        method: Option<String>,
        ph_level: Option<f64>,
        organic_matter: Option<f64>,
        observation: Option<String>,
    },
    #[serde(rename = "CC")]
    CoverCrop {
        cover_crop_species: Option<String>,
        method: Option<String>,
        area: Option<f64>,
        observation: Option<String>,
    },
    #[serde(rename = "CO")]
    Composting {
        amendment_type: Option<String>,
        method: Option<String>,
        application_rate: Option<f64>,
        area: Option<f64>,
        observation: Option<String>,
    },
    #[serde(rename = "ER")]
    ErosionControl {
        method: Option<String>,
        area: Option<f64>,
        observation: Option<String>,
    },
}

impl SoilManagementEvent {
    pub(crate) fn descriptors() -> Vec<EventTypeDescriptor> {
        vec![
            EventTypeDescriptor::new(CATEGORY, "ST", "Soil testing")
                .optional(&[
                    Field::Method,
                    Field::PhLevel,
                    Field::OrganicMatter,
                    Field::Observation,
                ])
                .with_default(Field::Method, "Laboratory analysis"),
            EventTypeDescriptor::new(CATEGORY, "CC", "Cover crop")
                .require(&[Field::CoverCropSpecies])
                .optional(&[Field::Method, Field::Area, Field::Observation])
                .with_default(Field::Method, "Broadcast seeding"),
            EventTypeDescriptor::new(CATEGORY, "CO", "Composting")
                .require(&[Field::AmendmentType])
                .optional(&[
                    Field::Method,
                    Field::ApplicationRate,
                    Field::Area,
                    Field::Observation,
                ])
                .with_default(Field::AmendmentType, "Compost")
                .with_default(Field::Method, "Surface application"),
            EventTypeDescriptor::new(CATEGORY, "ER", "Erosion control")
                .optional(&[Field::Method, Field::Area, Field::Observation])
                .with_default(Field::Method, "Contour planting"),
        ]
    }

    pub(crate) fn read(code: &str, r: &mut FieldReader<'_>) -> Option<Self> {
        let event = match code {
            "ST" => Self::SoilTesting {
                method: r.text(Field::Method),
                ph_level: r.decimal(Field::PhLevel),
                organic_matter: r.decimal(Field::OrganicMatter),
                observation: r.text(Field::Observation),
            },
            "CC" => Self::CoverCrop {
                cover_crop_species: r.text(Field::CoverCropSpecies),
                method: r.text(Field::Method),
                area: r.decimal(Field::Area),
                observation: r.text(Field::Observation),
            },
            "CO" => Self::Composting {
                amendment_type: r.text(Field::AmendmentType),
                method: r.text(Field::Method),
                application_rate: r.decimal(Field::ApplicationRate),
                area: r.decimal(Field::Area),
                observation: r.text(Field::Observation),
            },
            "ER" => Self::ErosionControl {
                method: r.text(Field::Method),
                area: r.decimal(Field::Area),
                observation: r.text(Field::Observation),
            },
            _ => return None,
        };
        Some(event)
    }
}
