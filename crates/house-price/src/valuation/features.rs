use super::normalize::{bathroom_count_label, coerce_number, parse_rooms, toilet_count_label};
use serde::{Deserialize, Serialize};

/// A raw feature value as supplied by a form, a CSV cell, or a JSON client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl FeatureValue {
    /// Numeric reading of the value; text goes through the locale-aware coercion.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(value) if value.is_finite() => Some(*value),
            FeatureValue::Number(_) => None,
            FeatureValue::Text(text) => coerce_number(text),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for FeatureValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i32> for FeatureValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Structural description of one property, built per estimation call.
///
/// Only `living_area` is required by the estimator; every other field degrades to a
/// zero-effect default when absent or unparseable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyFeatures {
    pub living_area: Option<FeatureValue>,
    pub rooms: Option<FeatureValue>,
    pub build_year: Option<FeatureValue>,
    pub lot_size: Option<FeatureValue>,
    pub garden_area: Option<FeatureValue>,
    pub neighborhood_price_m2: Option<FeatureValue>,
    pub bathrooms: Option<FeatureValue>,
    pub toilets: Option<FeatureValue>,
    pub city: Option<String>,
    pub energy_label: Option<String>,
    pub build_type: Option<String>,
    pub house_type: Option<String>,
    pub condition: Option<String>,
    pub micro_location: Option<String>,
    pub position: Option<String>,
}

impl PropertyFeatures {
    pub fn with_living_area(living_area: impl Into<FeatureValue>) -> Self {
        Self {
            living_area: Some(living_area.into()),
            ..Self::default()
        }
    }

    pub fn living_area_m2(&self) -> Option<f64> {
        number(&self.living_area)
    }

    /// Room text reads its first digit run: `"5 kamers (3 slaapkamers)"` -> 5.
    pub fn rooms_count(&self) -> Option<f64> {
        match self.rooms.as_ref()? {
            FeatureValue::Number(rooms) if rooms.is_finite() => Some(*rooms),
            FeatureValue::Number(_) => None,
            FeatureValue::Text(text) => parse_rooms(text),
        }
    }

    pub fn build_year_value(&self) -> Option<f64> {
        number(&self.build_year)
    }

    pub fn lot_size_m2(&self) -> Option<f64> {
        number(&self.lot_size)
    }

    pub fn garden_area_m2(&self) -> Option<f64> {
        number(&self.garden_area)
    }

    pub fn neighborhood_price(&self) -> Option<f64> {
        number(&self.neighborhood_price_m2)
    }

    /// Bathroom table key; numeric counts are bucketed, text is used verbatim.
    pub fn bathroom_label(&self) -> Option<String> {
        count_label(&self.bathrooms, bathroom_count_label)
    }

    /// Toilet table key; numeric counts are bucketed, text is used verbatim.
    pub fn toilet_label(&self) -> Option<String> {
        count_label(&self.toilets, toilet_count_label)
    }
}

fn number(value: &Option<FeatureValue>) -> Option<f64> {
    value.as_ref().and_then(FeatureValue::as_number)
}

fn count_label(value: &Option<FeatureValue>, bucket: fn(f64) -> &'static str) -> Option<String> {
    match value.as_ref()? {
        FeatureValue::Number(count) if count.is_finite() => Some(bucket(*count).to_string()),
        FeatureValue::Number(_) => None,
        FeatureValue::Text(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_fields_accept_numbers_and_locale_text() {
        let features: PropertyFeatures = serde_json::from_str(
            r#"{"living_area": "108 m²", "lot_size": 140.0, "neighborhood_price_m2": "5.863"}"#,
        )
        .expect("features parse");

        assert_eq!(features.living_area_m2(), Some(108.0));
        assert_eq!(features.lot_size_m2(), Some(140.0));
        assert_eq!(features.neighborhood_price(), Some(5863.0));
        assert_eq!(features.rooms_count(), None);
    }

    #[test]
    fn count_labels_bucket_numbers_and_keep_text() {
        let features = PropertyFeatures {
            bathrooms: Some(FeatureValue::Number(4.0)),
            toilets: Some(FeatureValue::from(" 2 ")),
            ..PropertyFeatures::default()
        };

        assert_eq!(features.bathroom_label().as_deref(), Some("3+"));
        assert_eq!(features.toilet_label().as_deref(), Some("2"));
    }

    #[test]
    fn room_text_counts_rooms_not_bedrooms() {
        let features = PropertyFeatures {
            rooms: Some(FeatureValue::from("5 kamers (3 slaapkamers)")),
            ..PropertyFeatures::default()
        };
        assert_eq!(features.rooms_count(), Some(5.0));

        let numeric = PropertyFeatures {
            rooms: Some(FeatureValue::Number(3.5)),
            ..PropertyFeatures::default()
        };
        assert_eq!(numeric.rooms_count(), Some(3.5));
    }

    #[test]
    fn unparseable_living_area_reads_as_missing() {
        let features = PropertyFeatures::with_living_area("onbekend");
        assert_eq!(features.living_area_m2(), None);
    }
}
