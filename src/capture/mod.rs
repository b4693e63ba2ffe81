//! Normalizes loosely shaped event captures (voice or import drafts) into a
//! category, an event type code and field values.
//!
//! Accepted shapes:
//!
//! * `{"category": "weather", "type": "FR", ...}`
//! * `{"event_type": "weather" | "FR" | "Frost", ...}`
//! * `{"production_type": "Irrigation" | "IR", ...}`
//!
//! Field values may also sit in a nested `details` or `fields` object.
//! Anything that cannot be resolved becomes a general `OT` event.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::catalog::{Catalog, EventCategory, EventTypeDescriptor, Field};

const NESTED_KEYS: &[&str] = &["details", "fields"];
const CATEGORY_KEYS: &[&str] = &["category", "event_category"];
const CODE_KEYS: &[&str] = &["type", "event_type", "code"];
const PRODUCTION_KEY: &str = "production_type";
const FREE_TEXT_KEYS: &[&str] = &["description", "notes", "text"];
const FALLBACK_NAME: &str = "Captured event";
const EVENT_NAME_LIMIT: usize = 60;

/// Keyword hints used to reclassify captures that resolved to a general
/// `OT` event. Matched against the lowercased free text.
const KEYWORD_HINTS: &[(&str, EventCategory, &str)] = &[
    ("irrigat", EventCategory::Production, "IR"),
    ("harvest", EventCategory::Production, "HA"),
    ("prun", EventCategory::Production, "PR"),
    ("frost", EventCategory::Weather, "FR"),
    ("hail", EventCategory::Weather, "HA"),
    ("fertili", EventCategory::Chemical, "FE"),
    ("herbicide", EventCategory::Chemical, "HE"),
    ("scouting", EventCategory::PestManagement, "SC"),
    ("fuel", EventCategory::Equipment, "FC"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Category and code named a catalog entry.
    Exact,
    /// Derived from a category alone or from keyword hints.
    Inferred,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCapture {
    pub category: EventCategory,
    pub code: String,
    pub values: BTreeMap<Field, String>,
    pub resolution: Resolution,
}

struct Hints {
    category: Option<EventCategory>,
    code: Option<String>,
    production: Option<String>,
}

pub fn normalize(raw: &Value, catalog: &Catalog) -> NormalizedCapture {
    let flat = flatten(raw);
    let hints = read_hints(&flat);
    let values = read_values(&flat);

    let (descriptor, mut resolution) = match resolve(&hints, catalog) {
        Some(resolved) => resolved,
        None => match catalog.baseline(EventCategory::General) {
            Ok(descriptor) => (descriptor, Resolution::Fallback),
            Err(_) => {
                return NormalizedCapture {
                    category: EventCategory::General,
                    code: EventCategory::General.baseline_code().to_string(),
                    values,
                    resolution: Resolution::Fallback,
                }
            }
        },
    };
    let mut category = descriptor.category;
    let mut code = descriptor.code;

    if category == EventCategory::General && code == EventCategory::General.baseline_code() {
        let text = values
            .get(&Field::Observation)
            .map(|text| text.to_ascii_lowercase())
            .unwrap_or_default();
        if let Some((_, hinted_category, hinted_code)) = KEYWORD_HINTS
            .iter()
            .find(|(keyword, _, _)| text.contains(keyword))
        {
            if let Ok(hinted) = catalog.lookup(*hinted_category, hinted_code) {
                category = hinted.category;
                code = hinted.code;
                resolution = Resolution::Inferred;
            }
        }
    }

    let mut values = values;
    if category == EventCategory::General && !values.contains_key(&Field::EventName) {
        let name = values
            .get(&Field::Observation)
            .map(|text| text.chars().take(EVENT_NAME_LIMIT).collect::<String>())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_NAME.to_string());
        values.insert(Field::EventName, name);
    }

    if resolution != Resolution::Exact {
        tracing::warn!(category = %category, code, ?resolution, "capture resolved loosely");
    }
    NormalizedCapture {
        category,
        code: code.to_string(),
        values,
        resolution,
    }
}

fn flatten(raw: &Value) -> Map<String, Value> {
    let mut flat = Map::new();
    match raw {
        Value::Object(object) => {
            for key in NESTED_KEYS {
                if let Some(Value::Object(nested)) = object.get(*key) {
                    for (key, value) in nested {
                        flat.insert(key.to_ascii_lowercase(), value.clone());
                    }
                }
            }
            for (key, value) in object {
                if !NESTED_KEYS.contains(&key.as_str()) {
                    flat.insert(key.to_ascii_lowercase(), value.clone());
                }
            }
        }
        Value::String(text) => {
            flat.insert("description".into(), Value::String(text.clone()));
        }
        _ => {}
    }
    flat
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn first_text(flat: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| flat.get(*key).and_then(as_text))
}

fn read_hints(flat: &Map<String, Value>) -> Hints {
    let mut category = first_text(flat, CATEGORY_KEYS).and_then(|raw| EventCategory::parse(&raw));
    let mut code = first_text(flat, CODE_KEYS);
    // `event_type` sometimes carries the category itself.
    if let Some(raw) = &code {
        if let Some(named) = EventCategory::parse(raw) {
            category.get_or_insert(named);
            code = None;
        }
    }
    Hints {
        category,
        code,
        production: flat.get(PRODUCTION_KEY).and_then(as_text),
    }
}

fn read_values(flat: &Map<String, Value>) -> BTreeMap<Field, String> {
    let mut values = BTreeMap::new();
    for (key, value) in flat {
        let reserved = CATEGORY_KEYS.contains(&key.as_str())
            || CODE_KEYS.contains(&key.as_str())
            || key == PRODUCTION_KEY;
        if reserved {
            continue;
        }
        let Some(text) = as_text(value) else {
            continue;
        };
        if FREE_TEXT_KEYS.contains(&key.as_str()) {
            values.entry(Field::Observation).or_insert(text);
            continue;
        }
        match Field::from_key(key) {
            Some(field) => {
                values.insert(field, text);
            }
            None => tracing::debug!(key = key.as_str(), "ignoring unknown capture key"),
        }
    }
    values
}

fn resolve<'c>(
    hints: &Hints,
    catalog: &'c Catalog,
) -> Option<(&'c EventTypeDescriptor, Resolution)> {
    if let Some(task) = &hints.production {
        return by_code_or_name(catalog, Some(EventCategory::Production), task)
            .map(|descriptor| (descriptor, Resolution::Exact))
            .or_else(|| {
                catalog
                    .baseline(EventCategory::Production)
                    .ok()
                    .map(|descriptor| (descriptor, Resolution::Fallback))
            });
    }
    match (hints.category, &hints.code) {
        (Some(category), Some(code)) => by_code_or_name(catalog, Some(category), code)
            .map(|descriptor| (descriptor, Resolution::Exact))
            .or_else(|| {
                catalog
                    .baseline(category)
                    .ok()
                    .map(|descriptor| (descriptor, Resolution::Fallback))
            }),
        (Some(category), None) => catalog
            .baseline(category)
            .ok()
            .map(|descriptor| (descriptor, Resolution::Inferred)),
        (None, Some(code)) => {
            by_code_or_name(catalog, None, code).map(|descriptor| (descriptor, Resolution::Exact))
        }
        (None, None) => None,
    }
}

/// Single descriptor matching `raw` as a code, then as a name. Codes shared
/// by several categories are ambiguous without a category.
fn by_code_or_name<'c>(
    catalog: &'c Catalog,
    category: Option<EventCategory>,
    raw: &str,
) -> Option<&'c EventTypeDescriptor> {
    if let Some(category) = category {
        if let Ok(descriptor) = catalog.lookup(category, raw) {
            return Some(descriptor);
        }
    } else {
        let matches = catalog.find_code(raw);
        match matches.as_slice() {
            [single] => return Some(*single),
            [] => {}
            _ => {
                tracing::debug!(code = raw, "event type code is ambiguous without a category");
                return None;
            }
        }
    }
    match catalog.find_by_name(category, raw).as_slice() {
        [single] => Some(*single),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn run(raw: Value) -> NormalizedCapture {
        normalize(&raw, Catalog::global())
    }

    #[test]
    fn category_and_code_resolve_exactly() {
        let capture = run(json!({
            "category": "weather",
            "type": "fr",
            "lower_temperature": -2,
            "notes": "Covered the seedlings"
        }));
        assert_eq!(capture.category, EventCategory::Weather);
        assert_eq!(capture.code, "FR");
        assert_eq!(capture.resolution, Resolution::Exact);
        assert_eq!(capture.values[&Field::LowerTemperature], "-2");
        assert_eq!(capture.values[&Field::Observation], "Covered the seedlings");
    }

    #[test]
    fn production_type_accepts_task_names() {
        let capture = run(json!({
            "production_type": "Irrigation",
            "details": { "water_volume": "1200" }
        }));
        assert_eq!(capture.category, EventCategory::Production);
        assert_eq!(capture.code, "IR");
        assert_eq!(capture.values[&Field::WaterVolume], "1200");
    }

    #[test]
    fn event_type_may_name_a_category() {
        let capture = run(json!({ "event_type": "pests", "pest_name": "Aphids" }));
        assert_eq!(capture.category, EventCategory::PestManagement);
        assert_eq!(capture.code, "SC");
        assert_eq!(capture.resolution, Resolution::Inferred);
    }

    #[test]
    fn shared_code_without_category_is_not_guessed() {
        let capture = run(json!({ "type": "HA", "description": "Storm passed" }));
        assert_eq!(capture.category, EventCategory::General);
        assert_eq!(capture.code, "OT");
        assert_eq!(capture.resolution, Resolution::Fallback);
        assert_eq!(capture.values[&Field::EventName], "Storm passed");
    }

    #[test]
    fn keywords_reclassify_unstructured_text() {
        let capture = run(json!({ "text": "Irrigated the north block for 3 hours" }));
        assert_eq!(capture.category, EventCategory::Production);
        assert_eq!(capture.code, "IR");
        assert_eq!(capture.resolution, Resolution::Inferred);
    }

    #[test]
    fn keywords_reclassify_explicit_general_events() {
        let capture = run(json!({
            "category": "general",
            "description": "Irrigated the lower terraces overnight"
        }));
        assert_eq!(capture.category, EventCategory::Production);
        assert_eq!(capture.code, "IR");
        assert_eq!(capture.resolution, Resolution::Inferred);
        assert!(!capture.values.contains_key(&Field::EventName));
    }

    #[test]
    fn nested_keys_are_case_insensitive() {
        let capture = run(json!({
            "Category": "Weather",
            "details": { "Type": "FR", "Lower_Temperature": "-4" }
        }));
        assert_eq!(capture.category, EventCategory::Weather);
        assert_eq!(capture.code, "FR");
        assert_eq!(capture.resolution, Resolution::Exact);
        assert_eq!(capture.values[&Field::LowerTemperature], "-4");
    }

    #[test]
    fn unknown_code_in_known_category_uses_baseline() {
        let capture = run(json!({ "category": "soil", "type": "XX" }));
        assert_eq!(capture.category, EventCategory::SoilManagement);
        assert_eq!(capture.code, "ST");
        assert_eq!(capture.resolution, Resolution::Fallback);
    }
}
