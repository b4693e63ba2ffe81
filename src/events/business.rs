use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{EventCategory, EventTypeDescriptor, Field};
use crate::submission::FieldReader;

const CATEGORY: EventCategory = EventCategory::Business;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BusinessEvent {
    #[serde(rename = "HS")]
    HarvestSale {
        buyer_name: Option<String>,
        revenue_amount: Option<f64>,
        quantity_sold: Option<f64>,
        observation: Option<String>,
    },
    #[serde(rename = "IN")]
    Inspection {
        inspector_name: Option<String>,
        observation: Option<String>,
    },
    #[serde(rename = "CE")]
    Certification {
        certification_name: Option<String>,
        expiration_date: Option<NaiveDate>,
        observation: Option<String>,
    },
}

impl BusinessEvent {
    pub(crate) fn descriptors() -> Vec<EventTypeDescriptor> {
        vec![
            EventTypeDescriptor::new(CATEGORY, "HS", "Harvest sale")
                .require(&[Field::BuyerName, Field::RevenueAmount])
                .optional(&[Field::QuantitySold, Field::Observation]),
            EventTypeDescriptor::new(CATEGORY, "IN", "Inspection")
                .require(&[Field::InspectorName])
                .optional(&[Field::Observation]),
            EventTypeDescriptor::new(CATEGORY, "CE", "Certification")
                .require(&[Field::CertificationName])
                .optional(&[Field::ExpirationDate, Field::Observation]),
        ]
    }

    pub(crate) fn read(code: &str, r: &mut FieldReader<'_>) -> Option<Self> {
        let event = match code {
            "HS" => Self::HarvestSale {
                buyer_name: r.text(Field::BuyerName),
                revenue_amount: r.decimal(Field::RevenueAmount),
                quantity_sold: r.decimal(Field::QuantitySold),
                observation: r.text(Field::Observation),
            },
            "IN" => Self::Inspection {
                inspector_name: r.text(Field::InspectorName),
                observation: r.text(Field::Observation),
            },
            "CE" => Self::Certification {
                certification_name: r.text(Field::CertificationName),
                expiration_date: r.date(Field::ExpirationDate),
                observation: r.text(Field::Observation),
            },
            _ => return None,
        };
        Some(event)
    }
}
