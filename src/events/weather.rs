use serde::{Deserialize, Serialize};

use crate::catalog::{EventCategory, EventTypeDescriptor, Field};
use crate::submission::FieldReader;

const CATEGORY: EventCategory = EventCategory::Weather;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WeatherEvent {
    #[serde(rename = "FR")]
    Frost {
        lower_temperature: Option<f64>,
        way_of_protection: Option<String>,
        observation: Option<String>,
    },
    #[serde(rename = "DR")]
    Drought {
        water_deficit: Option<f64>,
        observation: Option<String>,
    },
    #[serde(rename = "HA")]
    Hailstorm {
        hail_size: Option<f64>,
        observation: Option<String>,
    },
    #[serde(rename = "HT")]
    HighTemperature {
        upper_temperature: Option<f64>,
        way_of_protection: Option<String>,
        observation: Option<String>,
    },
    #[serde(rename = "TS")]
    TropicalStorm {
        wind_speed: Option<f64>,
        precipitation: Option<f64>,
        observation: Option<String>,
    },
    #[serde(rename = "HW")]
    HighWinds {
        wind_speed: Option<f64>,
        observation: Option<String>,
    },
    #[serde(rename = "HH")]
    HighHumidity {
        humidity: Option<f64>,
        observation: Option<String>,
    },
    #[serde(rename = "LH")]
    LowHumidity {
        humidity: Option<f64>,
        observation: Option<String>,
    },
}

impl WeatherEvent {
    pub(crate) fn descriptors() -> Vec<EventTypeDescriptor> {
        vec![
            EventTypeDescriptor::new(CATEGORY, "FR", "Frost")
                .require(&[Field::LowerTemperature])
                .optional(&[Field::WayOfProtection, Field::Observation]),
            EventTypeDescriptor::new(CATEGORY, "DR", "Drought")
                .require(&[Field::WaterDeficit])
                .optional(&[Field::Observation]),
            EventTypeDescriptor::new(CATEGORY, "HA", "Hailstorm")
                .optional(&[Field::HailSize, Field::Observation]),
            EventTypeDescriptor::new(CATEGORY, "HT", "High temperature")
                .require(&[Field::UpperTemperature])
                .optional(&[Field::WayOfProtection, Field::Observation]),
            EventTypeDescriptor::new(CATEGORY, "TS", "Tropical storm")
                .optional(&[Field::WindSpeed, Field::Precipitation, Field::Observation]),
            EventTypeDescriptor::new(CATEGORY, "HW", "High winds")
                .require(&[Field::WindSpeed])
                .optional(&[Field::Observation]),
            EventTypeDescriptor::new(CATEGORY, "HH", "High humidity")
                .require(&[Field::Humidity])
                .optional(&[Field::Observation]),
            EventTypeDescriptor::new(CATEGORY, "LH", "Low humidity")
                .require(&[Field::Humidity])
                .optional(&[Field::Observation]),
        ]
    }

    pub(crate) fn read(code: &str, r: &mut FieldReader<'_>) -> Option<Self> {
        let event = match code {
            "FR" => Self::Frost {
                lower_temperature: r.decimal(Field::LowerTemperature),
                way_of_protection: r.text(Field::WayOfProtection),
                observation: r.text(Field::Observation),
            },
            "DR" => Self::Drought {
                water_deficit: r.decimal(Field::WaterDeficit),
                observation: r.text(Field::Observation),
            },
            "HA" => Self::Hailstorm {
                hail_size: r.decimal(Field::HailSize),
                observation: r.text(Field::Observation),
            },
            "HT" => Self::HighTemperature {
                upper_temperature: r.decimal(Field::UpperTemperature),
                way_of_protection: r.text(Field::WayOfProtection),
                observation: r.text(Field::Observation),
            },
            "TS" => Self::TropicalStorm {
                wind_speed: r.decimal(Field::WindSpeed),
                precipitation: r.decimal(Field::Precipitation),
                observation: r.text(Field::Observation),
            },
            "HW" => Self::HighWinds {
                wind_speed: r.decimal(Field::WindSpeed),
                observation: r.text(Field::Observation),
            },
            "HH" => Self::HighHumidity {
                humidity: r.decimal(Field::Humidity),
                observation: r.text(Field::Observation),
            },
            "LH" => Self::LowHumidity {
                humidity: r.decimal(Field::Humidity),
                observation: r.text(Field::Observation),
            },
            _ => return None,
        };
        Some(event)
    }
}
