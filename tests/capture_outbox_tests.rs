mod common;

use std::fs;

use agrotrace_core::{
    capture::{normalize, Resolution},
    catalog::{Catalog, EventCategory, Field},
    config::Config,
    flows,
    form::{FormController, SubmitOutcome},
};
use common::{context, setup_test_env, today, RecordingNavigator, RecordingNotifier};
use regex::Regex;
use serde_json::{json, Value};

fn seeded(raw: Value) -> FormController {
    let capture = normalize(&raw, Catalog::global());
    let mut controller = FormController::new(
        flows::quick_add_event(None, today()),
        context(),
        Config::default().form_settings(),
    )
    .unwrap();
    controller.seed_from_capture(&capture).unwrap();
    controller
}

fn read_document(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn captured_frost_lands_in_outbox() {
    let (_, mut outbox) = setup_test_env();
    let mut controller = seeded(json!({
        "event_type": "Frost",
        "details": { "lower_temperature": "-3.5", "way_of_protection": "sprinklers" },
        "notes": "Hit the lower vineyard before dawn"
    }));
    controller.go_to_step(2).unwrap();

    let outcome = controller
        .submit(
            &mut outbox,
            &mut RecordingNotifier::default(),
            &mut RecordingNavigator::default(),
        )
        .unwrap();
    let SubmitOutcome::Submitted(record) = outcome else {
        panic!("expected submission, got {:?}", outcome);
    };
    assert_eq!(record.resource, "events/weather");

    let pending = outbox.pending().unwrap();
    assert_eq!(pending.len(), 1);
    let name = pending[0].file_name().unwrap().to_string_lossy().into_owned();
    let pattern =
        Regex::new(r"^\d{8}_\d{6}_events-weather_[0-9a-f]{8}\.json$").expect("valid name pattern");
    assert!(pattern.is_match(&name), "unexpected outbox name {name}");
    assert!(name.contains(&record.id.simple().to_string()[..8]));

    let document = read_document(&pending[0]);
    let payload = &document["payload"];
    assert_eq!(payload["type"], "FR");
    assert_eq!(payload["lower_temperature"], -3.5);
    assert_eq!(payload["way_of_protection"], "sprinklers");
    assert_eq!(payload["observation"], "Hit the lower vineyard before dawn");
    assert_eq!(payload["date"], "2024-05-14");
    assert_eq!(payload["company"], 7);
    assert_eq!(document["id"], record.id.to_string());
}

#[test]
fn production_type_capture_fills_irrigation_defaults() {
    let controller = seeded(json!({
        "production_type": "Irrigation",
        "water_volume": 120
    }));
    assert_eq!(controller.state().category, Some(EventCategory::Production));
    assert_eq!(controller.value(Field::Type), Some("IR"));
    assert_eq!(controller.value(Field::IrrigationMethod), Some("drip"));
    assert_eq!(controller.value(Field::WaterVolume), Some("120"));
}

#[test]
fn unresolvable_capture_becomes_general_event() {
    let raw = json!({ "event_type": "meteor shower", "text": "Strange lights over the barn" });
    let capture = normalize(&raw, Catalog::global());
    assert_eq!(capture.category, EventCategory::General);
    assert_eq!(capture.code, "OT");
    assert_eq!(capture.resolution, Resolution::Fallback);

    let mut controller = seeded(raw);
    controller.go_to_step(2).unwrap();
    let payload = controller.begin_submission().unwrap();
    assert_eq!(payload.body["type"], "OT");
    assert_eq!(payload.body["event_name"], "Strange lights over the barn");
}

#[test]
fn bad_numbers_in_capture_are_dropped_from_the_document() {
    let (_, mut outbox) = setup_test_env();
    let mut controller = seeded(json!({
        "category": "equipment",
        "type": "FC",
        "equipment_name": "Tractor 4",
        "fuel_amount": "60",
        "hours_used": "a couple"
    }));
    controller.go_to_step(2).unwrap();
    controller
        .submit(
            &mut outbox,
            &mut RecordingNotifier::default(),
            &mut RecordingNavigator::default(),
        )
        .unwrap();

    let document = read_document(&outbox.pending().unwrap()[0]);
    assert!(document["payload"]["hours_used"].is_null());
    assert_eq!(document["payload"]["fuel_amount"], 60.0);
    assert_eq!(document["dropped"], json!(["hours_used"]));
}

#[test]
fn config_round_trips_through_manager() {
    let (manager, _) = setup_test_env();
    assert_eq!(manager.load().unwrap(), Config::default());

    let mut config = Config::default();
    config.notification_duration_ms = 2500;
    config.sentinels.push("tbd".into());
    manager.save(&config).unwrap();

    let loaded = manager.load().unwrap();
    assert_eq!(loaded, config);
    assert!(loaded.validation_policy().is_sentinel(" TBD "));
    assert_eq!(loaded.form_settings().notification_duration_ms, 2500);
}

#[test]
fn configured_crop_types_restrict_the_crop_field() {
    let config = Config::default();
    let mut controller =
        FormController::new(flows::quick_start_production(), context(), config.form_settings())
            .unwrap();
    let mut source = config.option_source();
    let loaded = controller.load_options(Field::CropType, &mut source);
    assert!(loaded.data().unwrap().contains(&"Maize".to_string()));

    controller.set_field(Field::CropType, "Rice").unwrap();
    controller.set_field(Field::ProductionName, "Paddy").unwrap();
    assert!(controller.go_next().is_err());
    assert!(controller.error(Field::CropType).is_some());

    controller.set_field(Field::CropType, "maize").unwrap();
    assert_eq!(controller.go_next().unwrap(), 1);
}
