//! Field-set catalog: which fields each event type shows, requires, and
//! pre-fills.
//!
//! The catalog is keyed by `(category, code)`; the same two-letter code may
//! exist in more than one category (`HA` is both a hailstorm and a harvest).
//! The built-in catalog is assembled once per process and never mutated.

mod field;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use strsim::levenshtein;

use crate::errors::CatalogError;
use crate::events;

pub use field::{Field, FieldKind};

/// Maximum edit distance for "did you mean" suggestions.
const SUGGESTION_DISTANCE: usize = 3;

static CATALOG: OnceLock<Catalog> = OnceLock::new();

/// Top-level grouping of event types, one per event tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Weather,
    Chemical,
    Production,
    Equipment,
    SoilManagement,
    PestManagement,
    Business,
    General,
}

impl EventCategory {
    pub const ALL: [EventCategory; 8] = [
        EventCategory::Weather,
        EventCategory::Chemical,
        EventCategory::Production,
        EventCategory::Equipment,
        EventCategory::SoilManagement,
        EventCategory::PestManagement,
        EventCategory::Business,
        EventCategory::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Weather => "weather",
            EventCategory::Chemical => "chemical",
            EventCategory::Production => "production",
            EventCategory::Equipment => "equipment",
            EventCategory::SoilManagement => "soil_management",
            EventCategory::PestManagement => "pest_management",
            EventCategory::Business => "business",
            EventCategory::General => "general",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventCategory::Weather => "Weather",
            EventCategory::Chemical => "Chemical",
            EventCategory::Production => "Production",
            EventCategory::Equipment => "Equipment",
            EventCategory::SoilManagement => "Soil management",
            EventCategory::PestManagement => "Pest management",
            EventCategory::Business => "Business",
            EventCategory::General => "General",
        }
    }

    /// Code used when a requested type is unknown for this category.
    pub fn baseline_code(&self) -> &'static str {
        match self {
            EventCategory::Weather => "FR",
            EventCategory::Chemical => "FE",
            EventCategory::Production => "PL",
            EventCategory::Equipment => "MN",
            EventCategory::SoilManagement => "ST",
            EventCategory::PestManagement => "SC",
            EventCategory::Business => "HS",
            EventCategory::General => "OT",
        }
    }

    /// Accepts wire names, labels, and a few short aliases.
    pub fn parse(input: &str) -> Option<EventCategory> {
        let normalized = input.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        let found = EventCategory::ALL.into_iter().find(|category| {
            category.as_str() == normalized
                || category.label().to_ascii_lowercase().replace(' ', "_") == normalized
        });
        found.or(match normalized.as_str() {
            "soil" => Some(EventCategory::SoilManagement),
            "pest" | "pests" => Some(EventCategory::PestManagement),
            "chemicals" => Some(EventCategory::Chemical),
            "other" => Some(EventCategory::General),
            _ => None,
        })
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventCategory::parse(s).ok_or_else(|| CatalogError::UnknownCategory(s.trim().to_string()))
    }
}

/// Field set for one event type.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTypeDescriptor {
    pub category: EventCategory,
    pub code: &'static str,
    pub name: &'static str,
    pub required: Vec<Field>,
    pub optional: Vec<Field>,
    pub defaults: BTreeMap<Field, String>,
}

impl EventTypeDescriptor {
    /// Starts a descriptor whose only field is the discriminator itself.
    pub fn new(category: EventCategory, code: &'static str, name: &'static str) -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert(Field::Type, code.to_string());
        Self {
            category,
            code,
            name,
            required: vec![Field::Type],
            optional: Vec::new(),
            defaults,
        }
    }

    pub fn require(mut self, fields: &[Field]) -> Self {
        self.required.extend_from_slice(fields);
        self
    }

    pub fn optional(mut self, fields: &[Field]) -> Self {
        self.optional.extend_from_slice(fields);
        self
    }

    pub fn with_default(mut self, field: Field, value: impl Into<String>) -> Self {
        self.defaults.insert(field, value.into());
        self
    }

    /// Required fields first, then optional, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.required.iter().chain(self.optional.iter()).copied()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.required.contains(&field) || self.optional.contains(&field)
    }

    pub fn is_required(&self, field: Field) -> bool {
        self.required.contains(&field)
    }

    pub fn default_for(&self, field: Field) -> Option<&str> {
        self.defaults.get(&field).map(String::as_str)
    }

    /// Returns the violated invariants, if any.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for field in &self.required {
            if self.optional.contains(field) {
                problems.push(format!("{} is both required and optional", field));
            }
        }
        if !self.is_required(Field::Type) {
            problems.push("discriminator field `type` must be required".into());
        }
        if self.default_for(Field::Type) != Some(self.code) {
            problems.push("discriminator default must equal the code".into());
        }
        for field in self.defaults.keys() {
            if !self.contains(*field) {
                problems.push(format!("default for {} is outside the field set", field));
            }
        }
        problems
    }
}

/// Read-only lookup table of event type descriptors.
#[derive(Debug)]
pub struct Catalog {
    entries: Vec<EventTypeDescriptor>,
    by_key: HashMap<(EventCategory, String), usize>,
}

impl Catalog {
    /// Builds a catalog; a later descriptor with the same key replaces an
    /// earlier one.
    pub fn new(descriptors: Vec<EventTypeDescriptor>) -> Self {
        let mut entries: Vec<EventTypeDescriptor> = Vec::with_capacity(descriptors.len());
        let mut by_key = HashMap::new();
        for descriptor in descriptors {
            let key = (descriptor.category, descriptor.code.to_ascii_uppercase());
            if let Some(&index) = by_key.get(&key) {
                tracing::warn!(
                    category = %descriptor.category,
                    code = descriptor.code,
                    "duplicate event type descriptor replaced"
                );
                entries[index] = descriptor;
            } else {
                by_key.insert(key, entries.len());
                entries.push(descriptor);
            }
        }
        Self { entries, by_key }
    }

    /// Built-in descriptors for every event tab.
    pub fn builtin() -> Self {
        Self::new(events::builtin_descriptors())
    }

    /// Process-wide catalog, built on first use.
    pub fn global() -> &'static Catalog {
        CATALOG.get_or_init(Catalog::builtin)
    }

    pub fn lookup(
        &self,
        category: EventCategory,
        code: &str,
    ) -> Result<&EventTypeDescriptor, CatalogError> {
        let key = (category, code.trim().to_ascii_uppercase());
        self.by_key
            .get(&key)
            .map(|&index| &self.entries[index])
            .ok_or_else(|| CatalogError::UnknownDiscriminator {
                category,
                code: code.trim().to_string(),
                suggestion: self.suggest(category, code),
            })
    }

    /// Resolves `code`, falling back to the category baseline. The flag is
    /// `true` when the fallback was used.
    pub fn lookup_or_baseline(
        &self,
        category: EventCategory,
        code: &str,
    ) -> Result<(&EventTypeDescriptor, bool), CatalogError> {
        match self.lookup(category, code) {
            Ok(descriptor) => Ok((descriptor, false)),
            Err(err) => {
                tracing::warn!(
                    %err,
                    baseline = category.baseline_code(),
                    "falling back to baseline event type"
                );
                self.lookup(category, category.baseline_code())
                    .map(|descriptor| (descriptor, true))
                    .map_err(|_| CatalogError::MissingBaseline(category))
            }
        }
    }

    pub fn baseline(&self, category: EventCategory) -> Result<&EventTypeDescriptor, CatalogError> {
        self.lookup(category, category.baseline_code())
            .map_err(|_| CatalogError::MissingBaseline(category))
    }

    pub fn descriptors(&self, category: EventCategory) -> Vec<&EventTypeDescriptor> {
        self.entries
            .iter()
            .filter(|descriptor| descriptor.category == category)
            .collect()
    }

    pub fn all(&self) -> &[EventTypeDescriptor] {
        &self.entries
    }

    /// Categories defining `code`.
    pub fn find_code(&self, code: &str) -> Vec<&EventTypeDescriptor> {
        let code = code.trim().to_ascii_uppercase();
        EventCategory::ALL
            .iter()
            .filter_map(|category| self.by_key.get(&(*category, code.clone())))
            .map(|&index| &self.entries[index])
            .collect()
    }

    /// Descriptors whose human name matches `name`, optionally restricted to
    /// one category.
    pub fn find_by_name(
        &self,
        category: Option<EventCategory>,
        name: &str,
    ) -> Vec<&EventTypeDescriptor> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', " ");
        self.entries
            .iter()
            .filter(|descriptor| category.map_or(true, |c| descriptor.category == c))
            .filter(|descriptor| descriptor.name.to_ascii_lowercase() == normalized)
            .collect()
    }

    fn suggest(&self, category: EventCategory, input: &str) -> Option<String> {
        let needle = input.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return None;
        }
        let mut candidates: Vec<(usize, &str)> = self
            .descriptors(category)
            .into_iter()
            .flat_map(|descriptor| {
                [
                    (levenshtein(&descriptor.code.to_ascii_lowercase(), &needle), descriptor.code),
                    (levenshtein(&descriptor.name.to_ascii_lowercase(), &needle), descriptor.code),
                ]
            })
            .collect();
        candidates.sort_by_key(|(distance, _)| *distance);
        candidates
            .first()
            .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
            .map(|(_, code)| code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_descriptors_hold_invariants() {
        let catalog = Catalog::builtin();
        for descriptor in catalog.all() {
            let problems = descriptor.check_invariants();
            assert!(
                problems.is_empty(),
                "{}/{}: {:?}",
                descriptor.category,
                descriptor.code,
                problems
            );
        }
    }

    #[test]
    fn every_category_has_its_baseline() {
        let catalog = Catalog::builtin();
        for category in EventCategory::ALL {
            let baseline = catalog.baseline(category).expect("baseline present");
            assert_eq!(baseline.code, category.baseline_code());
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let catalog = Catalog::builtin();
        let descriptor = catalog.lookup(EventCategory::Equipment, " fc ").unwrap();
        assert_eq!(descriptor.code, "FC");
    }

    #[test]
    fn unknown_code_reports_suggestion() {
        let catalog = Catalog::builtin();
        match catalog.lookup(EventCategory::Weather, "Frots") {
            Err(CatalogError::UnknownDiscriminator { suggestion, .. }) => {
                assert_eq!(suggestion.as_deref(), Some("FR"));
            }
            other => panic!("unexpected lookup result: {:?}", other),
        }
    }

    #[test]
    fn unknown_soil_type_falls_back_to_soil_testing() {
        let catalog = Catalog::builtin();
        let (descriptor, fell_back) = catalog
            .lookup_or_baseline(EventCategory::SoilManagement, "XX")
            .unwrap();
        assert!(fell_back);
        assert_eq!(descriptor.code, "ST");
        assert_eq!(descriptor.name, "Soil testing");
    }

    #[test]
    fn shared_codes_are_reported_per_category() {
        let catalog = Catalog::builtin();
        let matches = catalog.find_code("HA");
        let categories: Vec<_> = matches.iter().map(|d| d.category).collect();
        assert_eq!(
            categories,
            vec![EventCategory::Weather, EventCategory::Production]
        );
    }

    #[test]
    fn later_duplicates_replace_earlier_ones() {
        let catalog = Catalog::new(vec![
            EventTypeDescriptor::new(EventCategory::General, "OT", "Other"),
            EventTypeDescriptor::new(EventCategory::General, "OT", "Misc"),
        ]);
        assert_eq!(catalog.all().len(), 1);
        assert_eq!(catalog.lookup(EventCategory::General, "OT").unwrap().name, "Misc");
    }

    #[test]
    fn category_parse_accepts_aliases() {
        assert_eq!(EventCategory::parse("Soil management"), Some(EventCategory::SoilManagement));
        assert_eq!(EventCategory::parse("pest"), Some(EventCategory::PestManagement));
        assert_eq!(EventCategory::parse("pest-management"), Some(EventCategory::PestManagement));
        assert!("volcano".parse::<EventCategory>().is_err());
    }
}
