//! Presence and format checks for individual fields.

use chrono::NaiveDate;

use crate::catalog::{Catalog, EventCategory, Field, FieldKind};
use crate::errors::ValidationError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Placeholder strings rejected unless configured otherwise.
pub const DEFAULT_SENTINELS: &[&str] = &["unknown", "n/a"];

/// Rules shared by validation and coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    sentinels: Vec<String>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINELS.iter().map(|s| s.to_string()))
    }
}

impl ValidationPolicy {
    pub fn new(sentinels: impl IntoIterator<Item = String>) -> Self {
        Self {
            sentinels: sentinels
                .into_iter()
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Machine-suggested placeholder text such as `unknown` or `n/a`.
    pub fn is_sentinel(&self, raw: &str) -> bool {
        let normalized = raw.trim().to_ascii_lowercase();
        self.sentinels.iter().any(|s| *s == normalized)
    }

    /// Blank or placeholder content, treated as no value at all.
    pub fn is_absent(&self, raw: &str) -> bool {
        raw.trim().is_empty() || self.is_sentinel(raw)
    }

    pub fn sentinels(&self) -> &[String] {
        &self.sentinels
    }
}

/// Extra facts a check needs beyond the raw text.
pub struct CheckContext<'a> {
    pub policy: &'a ValidationPolicy,
    pub catalog: &'a Catalog,
    pub category: Option<EventCategory>,
    /// Loaded options for reference fields; `None` while still loading.
    pub options: Option<&'a [String]>,
}

/// Validates a required field's raw value.
pub fn check_required(
    field: Field,
    raw: Option<&str>,
    ctx: &CheckContext<'_>,
) -> Result<(), ValidationError> {
    let raw = raw.unwrap_or_default();
    if raw.trim().is_empty() {
        return Err(ValidationError::new(field, "This field is required"));
    }
    if ctx.policy.is_sentinel(raw) {
        return Err(ValidationError::new(
            field,
            format!("`{}` is a placeholder; enter a real value", raw.trim()),
        ));
    }
    check_format(field, raw, ctx)
}

/// Format check for a non-empty value.
pub fn check_format(
    field: Field,
    raw: &str,
    ctx: &CheckContext<'_>,
) -> Result<(), ValidationError> {
    let trimmed = raw.trim();
    match field.kind() {
        FieldKind::Text => Ok(()),
        FieldKind::Decimal => parse_decimal(field, trimmed)
            .map(|_| ())
            .ok_or_else(|| ValidationError::new(field, numeric_message(field))),
        FieldKind::Integer => trimmed
            .parse::<i64>()
            .map(|_| ())
            .map_err(|_| ValidationError::new(field, "Enter a whole number (e.g., 12)")),
        FieldKind::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .map(|_| ())
            .map_err(|_| ValidationError::new(field, "Use YYYY-MM-DD format")),
        FieldKind::Choice(options) => canonical_choice(options, trimmed)
            .map(|_| ())
            .ok_or_else(|| {
                ValidationError::new(
                    field,
                    format!("Value must be one of: {}", options.join(", ")),
                )
            }),
        FieldKind::Category => EventCategory::parse(trimmed)
            .map(|_| ())
            .ok_or_else(|| ValidationError::new(field, "Select a valid event category")),
        FieldKind::Discriminator => {
            let Some(category) = ctx.category else {
                return Err(ValidationError::new(field, "Select an event category first"));
            };
            ctx.catalog
                .lookup(category, trimmed)
                .map(|_| ())
                .map_err(|err| ValidationError::new(field, err.to_string()))
        }
        FieldKind::Reference => match ctx.options {
            Some(options) if !options.is_empty() => canonical_choice_owned(options, trimmed)
                .map(|_| ())
                .ok_or_else(|| {
                    ValidationError::new(field, format!("Select a valid {}", field.label()))
                }),
            _ => Ok(()),
        },
    }
}

/// Parses a decimal, enforcing the field's natural range.
pub fn parse_decimal(field: Field, raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    match field.range() {
        Some((min, max)) if value < min || value > max => None,
        _ => Some(value),
    }
}

fn numeric_message(field: Field) -> String {
    match field.range() {
        Some((min, max)) => format!("Enter a number between {} and {}", min, max),
        None => "Enter a numeric value".to_string(),
    }
}

/// Matches a choice case-insensitively and returns the option's spelling.
pub fn canonical_choice(options: &[&'static str], raw: &str) -> Option<&'static str> {
    let normalized = raw.trim().to_ascii_lowercase();
    options
        .iter()
        .copied()
        .find(|candidate| candidate.to_ascii_lowercase() == normalized)
}

pub fn canonical_choice_owned<'a>(options: &'a [String], raw: &str) -> Option<&'a str> {
    let normalized = raw.trim().to_ascii_lowercase();
    options
        .iter()
        .find(|candidate| candidate.to_ascii_lowercase() == normalized)
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(policy: &'a ValidationPolicy, catalog: &'a Catalog) -> CheckContext<'a> {
        CheckContext {
            policy,
            catalog,
            category: Some(EventCategory::Equipment),
            options: None,
        }
    }

    #[test]
    fn sentinels_are_rejected_case_insensitively() {
        let policy = ValidationPolicy::default();
        let catalog = Catalog::builtin();
        let err = check_required(Field::EquipmentName, Some("  N/A "), &ctx(&policy, &catalog))
            .unwrap_err();
        assert_eq!(err.field, Field::EquipmentName);
        assert!(err.message.contains("placeholder"));
    }

    #[test]
    fn blank_values_are_missing() {
        let policy = ValidationPolicy::default();
        let catalog = Catalog::builtin();
        let err = check_required(Field::FuelAmount, Some("   "), &ctx(&policy, &catalog))
            .unwrap_err();
        assert_eq!(err.message, "This field is required");
        assert!(check_required(Field::FuelAmount, None, &ctx(&policy, &catalog)).is_err());
    }

    #[test]
    fn numeric_and_range_checks() {
        let policy = ValidationPolicy::default();
        let catalog = Catalog::builtin();
        let context = ctx(&policy, &catalog);
        assert!(check_required(Field::FuelAmount, Some("12.5"), &context).is_ok());
        assert!(check_required(Field::FuelAmount, Some("twelve"), &context).is_err());
        assert!(check_required(Field::DamagePercentage, Some("140"), &context).is_err());
        assert!(check_required(Field::TrapCount, Some("3.5"), &context).is_err());
    }

    #[test]
    fn discriminator_checked_against_active_category() {
        let policy = ValidationPolicy::default();
        let catalog = Catalog::builtin();
        let context = ctx(&policy, &catalog);
        assert!(check_required(Field::Type, Some("fc"), &context).is_ok());
        assert!(check_required(Field::Type, Some("FR"), &context).is_err());
    }

    #[test]
    fn reference_fields_accept_anything_until_options_load() {
        let policy = ValidationPolicy::default();
        let catalog = Catalog::builtin();
        let mut context = ctx(&policy, &catalog);
        assert!(check_required(Field::CropType, Some("Quinoa"), &context).is_ok());
        let loaded = vec!["Maize".to_string(), "Wheat".to_string()];
        context.options = Some(&loaded);
        assert!(check_required(Field::CropType, Some("wheat"), &context).is_ok());
        assert!(check_required(Field::CropType, Some("Quinoa"), &context).is_err());
    }

    #[test]
    fn custom_sentinels_replace_defaults() {
        let policy = ValidationPolicy::new(vec!["TBD".to_string()]);
        assert!(policy.is_sentinel("tbd"));
        assert!(!policy.is_sentinel("unknown"));
    }
}
