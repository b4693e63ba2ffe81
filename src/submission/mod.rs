//! Turns form state into the payload a mutation endpoint expects.
//!
//! Adaptation never fails on bad field content: values that cannot be read as
//! their field's type are sent as `null` and listed in
//! [`SubmissionPayload::dropped`].

mod reader;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::{Catalog, EventCategory, EventTypeDescriptor, Field};
use crate::errors::{CatalogError, FormError};
use crate::events::EventPayload;
use crate::form::{FlowDefinition, FlowTarget, FormContext, FormState, ValidationPolicy};

pub use reader::{coerce, FieldReader};

/// Remote collection a payload is created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Event(EventCategory),
    Production,
    ProductionFinish,
    Establishment,
}

impl Resource {
    pub fn path(&self) -> String {
        match self {
            Resource::Event(category) => format!("events/{}", category.as_str()),
            Resource::Production => "productions".into(),
            Resource::ProductionFinish => "productions/finish".into(),
            Resource::Establishment => "establishments".into(),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Write-once request body, built right before the mutation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionPayload {
    pub resource: Resource,
    /// Typed event for event flows.
    #[serde(skip)]
    pub event: Option<EventPayload>,
    /// Exactly the active descriptor's fields (events) or the flow's fields
    /// (records), keyed by wire name.
    pub body: Map<String, Value>,
    /// Fixed-step fields that accompany an event, such as its date.
    pub shared: Map<String, Value>,
    pub context: FormContext,
    pub dropped: Vec<Field>,
}

impl SubmissionPayload {
    /// Value of a body or shared key; `null` counts as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body
            .get(key)
            .or_else(|| self.shared.get(key))
            .filter(|value| !value.is_null())
    }

    /// Single flat JSON object: context ids, then shared fields, then body.
    pub fn to_wire(&self) -> Value {
        let mut wire = Map::new();
        for (key, id) in self.context.ids() {
            wire.insert(key.to_string(), Value::from(id));
        }
        wire.extend(self.shared.clone());
        wire.extend(self.body.clone());
        Value::Object(wire)
    }
}

/// Result of adapting event values against one descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptedEvent {
    pub event: EventPayload,
    pub body: Map<String, Value>,
    pub dropped: Vec<Field>,
}

/// Builds the typed event for `descriptor` from raw values. Fields outside the
/// descriptor are ignored.
pub fn adapt_event(
    values: &BTreeMap<Field, String>,
    descriptor: &EventTypeDescriptor,
    policy: &ValidationPolicy,
) -> Result<AdaptedEvent, FormError> {
    let mut reader = FieldReader::new(values, policy);
    let event = EventPayload::read(descriptor.category, descriptor.code, &mut reader).ok_or_else(
        || CatalogError::UnknownDiscriminator {
            category: descriptor.category,
            code: descriptor.code.to_string(),
            suggestion: None,
        },
    )?;
    let body = event
        .to_body()
        .map_err(|err| FormError::Payload(err.to_string()))?;
    Ok(AdaptedEvent {
        event,
        body,
        dropped: reader.into_dropped(),
    })
}

/// Coerces `fields` into a JSON map keyed by wire name; unreadable values
/// become `null` and are appended to `dropped`.
pub fn adapt_fields(
    values: &BTreeMap<Field, String>,
    fields: &[Field],
    policy: &ValidationPolicy,
    dropped: &mut Vec<Field>,
) -> Map<String, Value> {
    let mut reader = FieldReader::new(values, policy);
    let map = fields
        .iter()
        .map(|field| (field.wire_name().to_string(), reader.json(*field)))
        .collect();
    dropped.extend(reader.into_dropped());
    map
}

/// Builds the payload for a flow from its current state.
pub fn build_payload(
    state: &FormState,
    flow: &FlowDefinition,
    context: &FormContext,
    policy: &ValidationPolicy,
    catalog: &Catalog,
) -> Result<SubmissionPayload, FormError> {
    match flow.target {
        FlowTarget::Event { .. } => {
            let category = state.category.ok_or(FormError::CategoryNotSelected)?;
            let code = state
                .discriminator
                .as_deref()
                .ok_or(FormError::DiscriminatorNotSelected)?;
            let descriptor = catalog.lookup(category, code)?;
            let AdaptedEvent {
                event,
                body,
                mut dropped,
            } = adapt_event(&state.values, descriptor, policy)?;
            let shared_fields: Vec<Field> = flow
                .fixed_fields()
                .into_iter()
                .filter(|field| !matches!(field, Field::Type | Field::EventCategory))
                .collect();
            let shared = adapt_fields(&state.values, &shared_fields, policy, &mut dropped);
            Ok(SubmissionPayload {
                resource: Resource::Event(category),
                event: Some(event),
                body,
                shared,
                context: context.clone(),
                dropped,
            })
        }
        FlowTarget::Record(resource) => {
            let mut dropped = Vec::new();
            let body = adapt_fields(&state.values, &flow.fixed_fields(), policy, &mut dropped);
            Ok(SubmissionPayload {
                resource,
                event: None,
                body,
                shared: Map::new(),
                context: context.clone(),
                dropped,
            })
        }
    }
}
