//! Built-in wizard flows.

use chrono::NaiveDate;

use crate::catalog::{EventCategory, Field};
use crate::errors::ValidationError;
use crate::form::{FlowDefinition, FlowTarget, FormState, WizardStep};
use crate::submission::Resource;

/// Single-step tab for one event category. Opens on the category baseline.
pub fn event_tab(category: EventCategory) -> FlowDefinition {
    let title = match category {
        EventCategory::Weather => "Weather event",
        EventCategory::Chemical => "Chemical application",
        EventCategory::Production => "Production task",
        EventCategory::Equipment => "Equipment event",
        EventCategory::SoilManagement => "Soil management",
        EventCategory::PestManagement => "Pest management",
        EventCategory::Business => "Business event",
        EventCategory::General => "General event",
    };
    let target = FlowTarget::Event {
        category: Some(category),
    };
    FlowDefinition::new("event_tab", target).step(WizardStep::descriptor(
        title,
        "Pick the event type and fill in its details.",
        true,
    ))
}

/// Three-step event wizard: type, details, then date and notes.
pub fn quick_add_event(category: Option<EventCategory>, today: NaiveDate) -> FlowDefinition {
    let first = match category {
        Some(_) => WizardStep::fixed("Event type", "Choose what happened.").require(&[Field::Type]),
        None => WizardStep::fixed("Event type", "Choose the category and what happened.")
            .require(&[Field::EventCategory, Field::Type]),
    };
    FlowDefinition::new("quick_add_event", FlowTarget::Event { category })
        .step(first)
        .step(WizardStep::descriptor(
            "Details",
            "Fields for the selected event type.",
            false,
        ))
        .step(
            WizardStep::fixed("Date & notes", "When it happened and anything else worth noting.")
                .require(&[Field::Date])
                .optional(&[Field::Description])
                .with_rule(move |state| not_after(state, Field::Date, today)),
        )
        .default_today(Field::Date)
        .on_success("/events")
        .on_cancel("/events")
}

pub fn quick_start_production() -> FlowDefinition {
    FlowDefinition::new(
        "quick_start_production",
        FlowTarget::Record(Resource::Production),
    )
    .step(
        WizardStep::fixed("Crop", "What is being grown.")
            .require(&[Field::CropType, Field::ProductionName]),
    )
    .step(
        WizardStep::fixed("Schedule", "Start date and expected harvest.")
            .require(&[Field::StartDate])
            .optional(&[Field::EstimatedHarvestDate, Field::Area])
            .with_rule(harvest_not_before_start),
    )
    .step(WizardStep::fixed("Notes", "Optional remarks.").optional(&[Field::Observation]))
    .default_today(Field::StartDate)
    .on_success("/productions")
    .on_cancel("/productions")
}

pub fn finish_production(today: NaiveDate) -> FlowDefinition {
    FlowDefinition::new(
        "finish_production",
        FlowTarget::Record(Resource::ProductionFinish),
    )
    .step(
        WizardStep::fixed("Harvest", "Closing date and total yield.")
            .require(&[Field::FinishDate, Field::YieldAmount])
            .optional(&[Field::YieldUnit])
            .with_rule(move |state| not_after(state, Field::FinishDate, today)),
    )
    .step(
        WizardStep::fixed("Quality", "Grade and remarks.")
            .optional(&[Field::QualityGrade, Field::Observation]),
    )
    .with_default(Field::YieldUnit, "kg")
    .default_today(Field::FinishDate)
    .on_success("/productions")
    .on_cancel("/productions")
}

pub fn register_establishment() -> FlowDefinition {
    FlowDefinition::new(
        "register_establishment",
        FlowTarget::Record(Resource::Establishment),
    )
    .step(
        WizardStep::fixed("Identity", "Name and location.")
            .require(&[Field::EstablishmentName, Field::Country])
            .optional(&[Field::City]),
    )
    .step(
        WizardStep::fixed("Land", "Size and description.")
            .optional(&[Field::Area, Field::Description]),
    )
    .with_direct_jump()
    .on_success("/establishments")
    .on_cancel("/establishments")
}

fn not_after(state: &FormState, field: Field, today: NaiveDate) -> Result<(), ValidationError> {
    match state.date(field) {
        Some(date) if date > today => Err(ValidationError::new(
            field,
            format!("Date cannot be after {}", today.format("%Y-%m-%d")),
        )),
        _ => Ok(()),
    }
}

fn harvest_not_before_start(state: &FormState) -> Result<(), ValidationError> {
    match (
        state.date(Field::StartDate),
        state.date(Field::EstimatedHarvestDate),
    ) {
        (Some(start), Some(harvest)) if harvest < start => Err(ValidationError::new(
            Field::EstimatedHarvestDate,
            "Harvest date cannot be before the start date",
        )),
        _ => Ok(()),
    }
}
