use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{Number, Value};

use crate::catalog::{Field, FieldKind};
use crate::errors::CoercionError;
use crate::form::validation::{canonical_choice, parse_decimal, ValidationPolicy, DATE_FORMAT};

/// Converts one raw form value to its JSON representation.
///
/// Blank and placeholder values are `Ok(None)`; text that cannot be read as the
/// field's kind is a [`CoercionError`].
pub fn coerce(
    field: Field,
    raw: &str,
    policy: &ValidationPolicy,
) -> Result<Option<Value>, CoercionError> {
    if policy.is_absent(raw) {
        return Ok(None);
    }
    let trimmed = raw.trim();
    let failure = |expected: &'static str| CoercionError {
        field,
        raw: trimmed.to_string(),
        expected,
    };
    match field.kind() {
        FieldKind::Text | FieldKind::Reference | FieldKind::Category => {
            Ok(Some(Value::String(trimmed.to_string())))
        }
        FieldKind::Discriminator => Ok(Some(Value::String(trimmed.to_ascii_uppercase()))),
        FieldKind::Decimal => parse_decimal(field, trimmed)
            .and_then(Number::from_f64)
            .map(|n| Some(Value::Number(n)))
            .ok_or_else(|| failure("a number")),
        FieldKind::Integer => trimmed
            .parse::<i64>()
            .map(|n| Some(Value::from(n)))
            .map_err(|_| failure("a whole number")),
        FieldKind::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .map(|d| Some(Value::String(d.format(DATE_FORMAT).to_string())))
            .map_err(|_| failure("a YYYY-MM-DD date")),
        FieldKind::Choice(options) => canonical_choice(options, trimmed)
            .map(|c| Some(Value::String(c.to_string())))
            .ok_or_else(|| failure("one of the listed options")),
    }
}

/// Typed access to form values for payload construction.
///
/// Every accessor degrades to `None` on bad input and remembers which fields
/// were dropped that way.
pub struct FieldReader<'a> {
    values: &'a BTreeMap<Field, String>,
    policy: &'a ValidationPolicy,
    dropped: Vec<Field>,
}

impl<'a> FieldReader<'a> {
    pub fn new(values: &'a BTreeMap<Field, String>, policy: &'a ValidationPolicy) -> Self {
        Self {
            values,
            policy,
            dropped: Vec::new(),
        }
    }

    pub fn dropped(&self) -> &[Field] {
        &self.dropped
    }

    pub fn into_dropped(self) -> Vec<Field> {
        self.dropped
    }

    fn read(&mut self, field: Field) -> Option<Value> {
        let raw = self.values.get(&field)?;
        match coerce(field, raw, self.policy) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(%err, "dropping value that failed coercion");
                self.dropped.push(field);
                None
            }
        }
    }

    pub fn text(&mut self, field: Field) -> Option<String> {
        match self.read(field)? {
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    pub fn decimal(&mut self, field: Field) -> Option<f64> {
        self.read(field).and_then(|v| v.as_f64())
    }

    pub fn integer(&mut self, field: Field) -> Option<i64> {
        self.read(field).and_then(|v| v.as_i64())
    }

    pub fn date(&mut self, field: Field) -> Option<NaiveDate> {
        self.read(field)
            .and_then(|v| v.as_str().and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok()))
    }

    /// Canonical spelling of a choice field.
    pub fn choice(&mut self, field: Field) -> Option<String> {
        self.text(field)
    }

    /// Untyped JSON value, `Null` when absent.
    pub fn json(&mut self, field: Field) -> Value {
        self.read(field).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_in_numeric_field_is_absent_not_text() {
        let policy = ValidationPolicy::default();
        assert_eq!(coerce(Field::FuelAmount, "unknown", &policy), Ok(None));
    }

    #[test]
    fn garbage_numbers_are_coercion_errors() {
        let policy = ValidationPolicy::default();
        let err = coerce(Field::HoursUsed, "about ten", &policy).unwrap_err();
        assert_eq!(err.field, Field::HoursUsed);
        assert_eq!(err.expected, "a number");
    }

    #[test]
    fn reader_records_dropped_fields() {
        let policy = ValidationPolicy::default();
        let mut values = BTreeMap::new();
        values.insert(Field::FuelAmount, "12.5".to_string());
        values.insert(Field::HoursUsed, "lots".to_string());
        values.insert(Field::FuelType, "Diesel".to_string());
        let mut reader = FieldReader::new(&values, &policy);
        assert_eq!(reader.decimal(Field::FuelAmount), Some(12.5));
        assert_eq!(reader.decimal(Field::HoursUsed), None);
        assert_eq!(reader.choice(Field::FuelType).as_deref(), Some("diesel"));
        assert_eq!(reader.decimal(Field::MaintenanceCost), None);
        assert_eq!(reader.dropped(), &[Field::HoursUsed]);
    }

    #[test]
    fn dates_are_normalized() {
        let policy = ValidationPolicy::default();
        assert_eq!(
            coerce(Field::Date, " 2025-03-07 ", &policy),
            Ok(Some(Value::String("2025-03-07".into())))
        );
        assert!(coerce(Field::Date, "07/03/2025", &policy).is_err());
    }
}
