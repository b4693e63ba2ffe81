use serde::{Deserialize, Serialize};

use crate::catalog::{EventCategory, EventTypeDescriptor, Field};
use crate::submission::FieldReader;

/// Catch-all for events that fit no other category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    #[serde(rename = "OT")]
    Other {
        event_name: Option<String>,
        observation: Option<String>,
    },
}

impl GeneralEvent {
    pub(crate) fn descriptors() -> Vec<EventTypeDescriptor> {
        vec![EventTypeDescriptor::new(EventCategory::General, "OT", "Other")
            .require(&[Field::EventName])
            .optional(&[Field::Observation])]
    }

    pub(crate) fn read(code: &str, r: &mut FieldReader<'_>) -> Option<Self> {
        match code {
            "OT" => Some(Self::Other {
                event_name: r.text(Field::EventName),
                observation: r.text(Field::Observation),
            }),
            _ => None,
        }
    }
}
