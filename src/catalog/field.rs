use std::fmt;

use serde::{Deserialize, Serialize};

const WAYS_OF_APPLICATION: &[&str] = &["broadcast", "foliar", "drip", "banded", "injection"];
const YIELD_UNITS: &[&str] = &["kg", "t", "lb", "bu"];
const IRRIGATION_METHODS: &[&str] = &["drip", "sprinkler", "flood", "pivot"];
const FUEL_TYPES: &[&str] = &["diesel", "gasoline", "biodiesel", "electric"];

/// Supported data kinds for form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Decimal,
    Integer,
    /// Calendar date in `YYYY-MM-DD` form.
    Date,
    Choice(&'static [&'static str]),
    /// Event type code resolved against the catalog for the active category.
    Discriminator,
    /// Event category wire name.
    Category,
    /// Options supplied at runtime by an [`OptionSource`](crate::services::OptionSource).
    Reference,
}

impl FieldKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Decimal | FieldKind::Integer)
    }
}

macro_rules! fields {
    ($( $variant:ident => $key:literal, $label:literal, $kind:expr; )*) => {
        /// Every field any flow can render.
        ///
        /// Fields are addressed through this enum rather than free-form string
        /// keys, so a misspelt field name is a compile error instead of a
        /// silently dropped value.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum Field {
            $( $variant, )*
        }

        impl Field {
            pub const ALL: &'static [Field] = &[ $( Field::$variant, )* ];

            /// Internal key used by form state and capture normalization.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Field::$variant => $key, )*
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $( Field::$variant => $label, )*
                }
            }

            pub fn kind(&self) -> FieldKind {
                match self {
                    $( Field::$variant => $kind, )*
                }
            }
        }
    };
}

fields! {
    Type => "type", "Type", FieldKind::Discriminator;
    EventCategory => "event_category", "Event category", FieldKind::Category;
    Observation => "observation", "Observation", FieldKind::Text;
    Description => "description", "Description", FieldKind::Text;
    Date => "date", "Date (YYYY-MM-DD)", FieldKind::Date;

    LowerTemperature => "lower_temperature", "Lowest temperature", FieldKind::Decimal;
    UpperTemperature => "upper_temperature", "Highest temperature", FieldKind::Decimal;
    WayOfProtection => "way_of_protection", "Way of protection", FieldKind::Text;
    WaterDeficit => "water_deficit", "Water deficit (mm)", FieldKind::Decimal;
    HailSize => "hail_size", "Hail size (mm)", FieldKind::Decimal;
    WindSpeed => "wind_speed", "Wind speed (km/h)", FieldKind::Decimal;
    Precipitation => "precipitation", "Precipitation (mm)", FieldKind::Decimal;
    Humidity => "humidity", "Relative humidity (%)", FieldKind::Decimal;

    ProductName => "product_name", "Commercial name", FieldKind::Text;
    Volume => "volume", "Volume", FieldKind::Decimal;
    Concentration => "concentration", "Concentration", FieldKind::Decimal;
    Area => "area", "Area (ha)", FieldKind::Decimal;
    WayOfApplication => "way_of_application", "Way of application", FieldKind::Choice(WAYS_OF_APPLICATION);
    TimePeriod => "time_period", "Time period", FieldKind::Text;

    PlantDensity => "plant_density", "Plant density", FieldKind::Decimal;
    YieldAmount => "yield_amount", "Yield", FieldKind::Decimal;
    YieldUnit => "yield_unit", "Yield unit", FieldKind::Choice(YIELD_UNITS);
    WaterVolume => "water_volume", "Water volume (m3)", FieldKind::Decimal;
    IrrigationMethod => "irrigation_method", "Irrigation method", FieldKind::Choice(IRRIGATION_METHODS);
    DurationHours => "duration_hours", "Duration (hours)", FieldKind::Decimal;
    TillageDepth => "tillage_depth", "Tillage depth (cm)", FieldKind::Decimal;

    EquipmentName => "equipment_name", "Equipment", FieldKind::Text;
    MaintenanceCost => "maintenance_cost", "Maintenance cost", FieldKind::Decimal;
    HoursUsed => "hours_used", "Hours used", FieldKind::Decimal;
    FuelAmount => "fuel_amount", "Fuel amount (l)", FieldKind::Decimal;
    FuelType => "fuel_type", "Fuel type", FieldKind::Choice(FUEL_TYPES);

    Method => "method", "Method", FieldKind::Text;
    PhLevel => "ph_level", "pH level", FieldKind::Decimal;
    OrganicMatter => "organic_matter", "Organic matter (%)", FieldKind::Decimal;
    CoverCropSpecies => "cover_crop_species", "Cover crop species", FieldKind::Text;
    AmendmentType => "amendment_type", "Amendment type", FieldKind::Text;
    ApplicationRate => "application_rate", "Application rate (t/ha)", FieldKind::Decimal;

    PestName => "pest_name", "Pest", FieldKind::Text;
    DamagePercentage => "damage_percentage", "Damage (%)", FieldKind::Decimal;
    ControlAgent => "control_agent", "Control agent", FieldKind::Text;
    TrapCount => "trap_count", "Trap count", FieldKind::Integer;

    BuyerName => "buyer_name", "Buyer", FieldKind::Text;
    RevenueAmount => "revenue_amount", "Revenue", FieldKind::Decimal;
    QuantitySold => "quantity_sold", "Quantity sold", FieldKind::Decimal;
    InspectorName => "inspector_name", "Inspector", FieldKind::Text;
    CertificationName => "certification_name", "Certification", FieldKind::Text;
    ExpirationDate => "expiration_date", "Expiration date (YYYY-MM-DD)", FieldKind::Date;

    EventName => "event_name", "Event name", FieldKind::Text;

    CropType => "crop_type", "Crop", FieldKind::Reference;
    ProductionName => "production_name", "Production name", FieldKind::Text;
    StartDate => "start_date", "Start date (YYYY-MM-DD)", FieldKind::Date;
    EstimatedHarvestDate => "estimated_harvest_date", "Estimated harvest date (YYYY-MM-DD)", FieldKind::Date;
    FinishDate => "finish_date", "Finish date (YYYY-MM-DD)", FieldKind::Date;
    QualityGrade => "quality_grade", "Quality grade", FieldKind::Text;

    EstablishmentName => "establishment_name", "Establishment name", FieldKind::Text;
    Country => "country", "Country", FieldKind::Text;
    City => "city", "City", FieldKind::Text;
}

impl Field {
    /// Key used in the outgoing payload when it differs from the internal key.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Field::ProductName => "commercial_name",
            other => other.as_str(),
        }
    }

    /// Resolves an internal key or wire name.
    pub fn from_key(key: &str) -> Option<Field> {
        let normalized = key.trim().to_ascii_lowercase();
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == normalized || field.wire_name() == normalized)
    }

    /// Inclusive bounds for numeric fields that have a natural range.
    pub fn range(&self) -> Option<(f64, f64)> {
        match self {
            Field::Humidity | Field::DamagePercentage | Field::OrganicMatter => Some((0.0, 100.0)),
            Field::PhLevel => Some((0.0, 14.0)),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        let mut keys: Vec<_> = Field::ALL.iter().map(Field::as_str).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), Field::ALL.len());
    }

    #[test]
    fn from_key_accepts_wire_names() {
        assert_eq!(Field::from_key("commercial_name"), Some(Field::ProductName));
        assert_eq!(Field::from_key(" Fuel_Amount "), Some(Field::FuelAmount));
        assert_eq!(Field::from_key("nonsense"), None);
    }

    #[test]
    fn serde_uses_internal_key() {
        let json = serde_json::to_string(&Field::LowerTemperature).unwrap();
        assert_eq!(json, "\"lower_temperature\"");
    }
}
