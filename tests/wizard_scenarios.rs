mod common;

use std::collections::BTreeSet;

use agrotrace_core::{
    catalog::{Catalog, EventCategory, Field},
    errors::{FormError, SubmissionError},
    flows,
    form::{FormController, FormSettings, SubmitOutcome, WizardStatus},
    init,
    services::NotificationStatus,
};
use common::{context, today, RecordingNavigator, RecordingNotifier, StubClient};

fn visible(controller: &FormController, step: usize) -> BTreeSet<Field> {
    controller
        .visible_fields(step)
        .unwrap()
        .into_iter()
        .map(|visible| visible.field)
        .collect()
}

fn open(flow: agrotrace_core::form::FlowDefinition) -> FormController {
    FormController::new(flow, context(), FormSettings::default()).unwrap()
}

#[test]
fn fuel_consumption_shows_fuel_fields_only() {
    init();
    let mut controller = open(flows::event_tab(EventCategory::Equipment));
    controller.set_discriminator("FC").unwrap();

    let fields = visible(&controller, 0);
    assert!(fields.contains(&Field::FuelAmount));
    assert!(fields.contains(&Field::FuelType));
    assert!(!fields.contains(&Field::MaintenanceCost));
}

#[test]
fn maintenance_shows_cost_and_hides_fuel_fields() {
    let mut controller = open(flows::event_tab(EventCategory::Equipment));
    controller.set_discriminator("FC").unwrap();
    controller.set_discriminator("MN").unwrap();

    let fields = visible(&controller, 0);
    assert!(fields.contains(&Field::MaintenanceCost));
    assert!(!fields.contains(&Field::FuelAmount));
    assert!(!fields.contains(&Field::FuelType));
}

#[test]
fn frost_payload_carries_only_frost_fields() {
    let mut controller = open(flows::event_tab(EventCategory::Weather));
    controller.set_field(Field::Type, "FR").unwrap();
    controller.set_field(Field::LowerTemperature, "28").unwrap();

    let mut client = StubClient::default();
    let outcome = controller
        .submit(
            &mut client,
            &mut RecordingNotifier::default(),
            &mut RecordingNavigator::default(),
        )
        .unwrap();
    assert!(matches!(outcome, SubmitOutcome::Submitted(_)));

    let payload = &client.payloads[0];
    let keys: BTreeSet<&str> = payload.body.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        BTreeSet::from(["type", "lower_temperature", "way_of_protection", "observation"])
    );
    assert_eq!(payload.body["type"], "FR");
    assert_eq!(payload.body["lower_temperature"], 28.0);
    assert!(payload.shared.is_empty());
}

#[test]
fn blank_required_field_keeps_wizard_on_first_step() {
    let mut controller = open(flows::quick_add_event(None, today()));

    let err = controller.go_next().unwrap_err();
    assert_eq!(controller.current_step(), 0);
    assert!(err
        .field_errors()
        .iter()
        .any(|error| error.field == Field::EventCategory));
    assert!(controller.error(Field::EventCategory).is_some());
}

#[test]
fn successful_submit_resets_values_and_closes() {
    let mut controller = open(flows::quick_add_event(None, today()));
    let initial = controller.state().clone();

    controller.set_field(Field::EventCategory, "equipment").unwrap();
    controller.set_field(Field::Type, "FC").unwrap();
    assert_eq!(controller.go_next().unwrap(), 1);
    controller.set_field(Field::EquipmentName, "Tractor 2").unwrap();
    controller.set_field(Field::FuelAmount, "35").unwrap();
    assert_eq!(controller.go_next().unwrap(), 2);

    let mut client = StubClient::default();
    let mut notifier = RecordingNotifier::default();
    let mut navigator = RecordingNavigator::default();
    let outcome = controller
        .submit(&mut client, &mut notifier, &mut navigator)
        .unwrap();

    assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
    assert_eq!(controller.status(), WizardStatus::Closed);
    assert_eq!(controller.state(), &initial);
    assert_eq!(navigator.paths, vec!["/events".to_string()]);
    assert_eq!(notifier.seen[0].status, NotificationStatus::Success);
    assert_eq!(notifier.seen[0].title, "Event created");

    let payload = &client.payloads[0];
    assert_eq!(payload.body["fuel_amount"], 35.0);
    assert_eq!(payload.body["fuel_type"], "diesel");
    assert_eq!(payload.get("date").unwrap(), "2024-05-14");
    let wire = payload.to_wire();
    assert_eq!(wire["company"], 7);
    assert_eq!(wire["establishment"], 3);
}

#[test]
fn validation_never_reports_fields_outside_required_set() {
    let catalog = Catalog::global();
    for descriptor in catalog.all() {
        let mut controller = open(flows::event_tab(descriptor.category));
        controller.set_discriminator(descriptor.code).unwrap();
        if let Err(err) = controller.validate_step(0) {
            for error in err.field_errors() {
                assert!(
                    descriptor.is_required(error.field),
                    "{}/{} reported {}",
                    descriptor.category,
                    descriptor.code,
                    error.field
                );
            }
        }
    }
}

#[test]
fn setting_the_same_value_twice_is_idempotent() {
    let mut controller = open(flows::event_tab(EventCategory::Equipment));
    controller.set_field(Field::EquipmentName, "Harvester").unwrap();
    let once = controller.state().clone();
    controller.set_field(Field::EquipmentName, "Harvester").unwrap();
    assert_eq!(controller.state(), &once);
}

#[test]
fn unknown_in_numeric_field_is_sent_as_null() {
    let mut controller = open(flows::event_tab(EventCategory::Equipment));
    controller.set_discriminator("FC").unwrap();
    controller.set_field(Field::EquipmentName, "Tractor 1").unwrap();
    controller.set_field(Field::FuelAmount, "40").unwrap();
    controller.set_field(Field::HoursUsed, "unknown").unwrap();

    let payload = controller.begin_submission().unwrap();
    assert!(payload.body["hours_used"].is_null());
    assert_eq!(payload.get("hours_used"), None);
    assert!(!payload.dropped.contains(&Field::HoursUsed));
}

#[test]
fn unreadable_number_in_optional_field_is_dropped() {
    let mut controller = open(flows::event_tab(EventCategory::Equipment));
    controller.set_discriminator("FC").unwrap();
    controller.set_field(Field::EquipmentName, "Tractor 1").unwrap();
    controller.set_field(Field::FuelAmount, "40").unwrap();
    controller.set_field(Field::HoursUsed, "a few").unwrap();

    let payload = controller.begin_submission().unwrap();
    assert!(payload.body["hours_used"].is_null());
    assert_eq!(payload.dropped, vec![Field::HoursUsed]);
}

#[test]
fn placeholder_in_required_field_blocks_submission() {
    let mut controller = open(flows::event_tab(EventCategory::Weather));
    controller.set_field(Field::LowerTemperature, "n/a").unwrap();

    let err = controller.begin_submission().unwrap_err();
    assert!(matches!(err, FormError::Validation(_)));
    assert_eq!(controller.status(), WizardStatus::Open);
}

#[test]
fn edits_are_rejected_while_submission_is_in_flight() {
    let mut controller = open(flows::event_tab(EventCategory::Weather));
    controller.set_field(Field::LowerTemperature, "-2").unwrap();
    controller.begin_submission().unwrap();

    assert!(controller.is_submitting());
    assert_eq!(
        controller.set_field(Field::Observation, "late"),
        Err(FormError::SubmissionInFlight)
    );
    assert_eq!(
        controller.begin_submission().unwrap_err(),
        FormError::SubmissionInFlight
    );
    assert_eq!(
        controller.cancel(&mut RecordingNavigator::default()),
        Err(FormError::SubmissionInFlight)
    );
}

#[test]
fn rejected_submission_notifies_and_keeps_values() {
    let mut controller = open(flows::quick_start_production());
    controller.set_field(Field::CropType, "Maize").unwrap();
    controller.set_field(Field::ProductionName, "North field 2024").unwrap();
    controller.go_to_step(2).unwrap();

    let mut client = StubClient::failing(SubmissionError::network("Service unavailable"));
    let mut notifier = RecordingNotifier::default();
    let mut navigator = RecordingNavigator::default();
    let outcome = controller
        .submit(&mut client, &mut notifier, &mut navigator)
        .unwrap();

    assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
    assert_eq!(controller.status(), WizardStatus::Open);
    assert_eq!(controller.value(Field::ProductionName), Some("North field 2024"));
    assert_eq!(notifier.seen[0].status, NotificationStatus::Error);
    assert_eq!(notifier.seen[0].description, "Service unavailable");
    assert!(navigator.paths.is_empty());

    client.fail_with = None;
    let retry = controller
        .submit(&mut client, &mut notifier, &mut navigator)
        .unwrap();
    assert!(matches!(retry, SubmitOutcome::Submitted(_)));
    assert_eq!(notifier.seen[1].title, "Production started");
    assert_eq!(navigator.paths, vec!["/productions".to_string()]);
}

#[test]
fn going_back_from_first_step_stays_put() {
    let mut controller = open(flows::quick_add_event(Some(EventCategory::Weather), today()));
    assert_eq!(controller.go_previous().unwrap(), 0);
    assert_eq!(controller.current_step(), 0);
}

#[test]
fn sequential_flows_validate_skipped_steps_on_jump() {
    let mut controller = open(flows::quick_start_production());
    assert!(controller.go_to_step(2).is_err());
    assert_eq!(controller.current_step(), 0);
    assert!(controller.error(Field::CropType).is_some());
}

#[test]
fn establishment_flow_allows_direct_jumps() {
    let mut controller = open(flows::register_establishment());
    assert_eq!(controller.go_to_step(1).unwrap(), 1);

    let err = controller.begin_submission().unwrap_err();
    let fields: Vec<Field> = err.field_errors().iter().map(|e| e.field).collect();
    assert_eq!(fields, vec![Field::EstablishmentName, Field::Country]);
}

#[test]
fn submit_is_only_available_on_last_step() {
    let mut controller = open(flows::quick_add_event(Some(EventCategory::Weather), today()));
    assert_eq!(
        controller.begin_submission().unwrap_err(),
        FormError::NotTerminalStep { index: 0 }
    );
}

#[test]
fn future_dates_are_rejected_on_the_last_step() {
    let mut controller = open(flows::quick_add_event(Some(EventCategory::Weather), today()));
    controller.set_field(Field::LowerTemperature, "-1").unwrap();
    controller.go_next().unwrap();
    controller.go_next().unwrap();
    controller.set_field(Field::Date, "2024-06-01").unwrap();

    let err = controller.begin_submission().unwrap_err();
    assert_eq!(err.field_errors()[0].field, Field::Date);
}

#[test]
fn cancel_discards_values_and_navigates_away() {
    let mut controller = open(flows::finish_production(today()));
    controller.set_field(Field::YieldAmount, "1200").unwrap();

    let mut navigator = RecordingNavigator::default();
    controller.cancel(&mut navigator).unwrap();

    assert_eq!(controller.status(), WizardStatus::Closed);
    assert_eq!(controller.value(Field::YieldAmount), None);
    assert_eq!(controller.value(Field::YieldUnit), Some("kg"));
    assert_eq!(navigator.paths, vec!["/productions".to_string()]);
}
