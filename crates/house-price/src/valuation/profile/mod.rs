mod defaults;
mod store;

pub use store::{ProfileError, ProfileStore};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Signed fractional adjustment per canonical category label.
pub type AdjustmentTable = BTreeMap<String, f64>;

/// Inclusive build-year range; an absent bound is open-ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildYearBucket {
    #[serde(default)]
    pub min_year: Option<i32>,
    #[serde(default)]
    pub max_year: Option<i32>,
    #[serde(default)]
    pub adjustment: f64,
}

impl BuildYearBucket {
    pub fn contains(&self, year: f64) -> bool {
        let above_min = self.min_year.map_or(true, |min| year >= f64::from(min));
        let below_max = self.max_year.map_or(true, |max| year <= f64::from(max));
        above_min && below_max
    }
}

/// Every coefficient, lookup table, clamp bound and rule toggle of the valuation model.
///
/// Estimation only ever reads a profile. Editing or calibration produces a new value
/// which is then saved as a whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketProfile {
    pub reference_year: i32,
    pub current_year: i32,
    pub annual_growth_rate: f64,

    pub base_price_m2: f64,
    pub city_base_price_m2: BTreeMap<String, f64>,
    pub neighborhood_price_weight: f64,
    pub micro_segment_base_uplift: AdjustmentTable,

    pub area_full_price_m2: f64,
    pub area_extra_weight: f64,

    pub small_home_reference_m2: f64,
    pub small_home_uplift_at_50m2: f64,
    pub small_home_uplift_cap: f64,

    pub room_area_m2: f64,
    pub room_adjustment_per_room: f64,
    pub room_overcrowding_threshold: f64,
    pub room_overcrowding_penalty_per_room: f64,
    pub room_adjustment_cap: f64,

    pub max_adjustment: f64,
    pub min_adjustment: f64,

    pub energy_label_adjustments: AdjustmentTable,
    pub build_type_adjustments: AdjustmentTable,
    pub house_type_adjustments: AdjustmentTable,
    pub condition_adjustments: AdjustmentTable,
    pub position_adjustments: AdjustmentTable,
    pub bathroom_adjustments: AdjustmentTable,
    pub toilet_count_adjustments: AdjustmentTable,

    pub garden_adjustments_apartment: AdjustmentTable,
    pub garden_adjustments_house: AdjustmentTable,

    pub lot_size_ratio_median: f64,
    pub lot_size_ratio_weight: f64,
    pub lot_size_ratio_clamp: f64,

    pub micro_location_disable_lot_size_adjustment: BTreeSet<String>,
    pub micro_location_disable_position_adjustment: BTreeSet<String>,
    pub micro_location_house_type_neutralize: BTreeMap<String, BTreeSet<String>>,

    pub build_year_buckets: Vec<BuildYearBucket>,

    pub renovation_roi: f64,
    pub renovation_roi_saturation: f64,
    pub renovation_cap: f64,
    pub renovation_label_step_uplift: f64,
    pub renovation_label_cap: f64,
    pub renovation_category_weights: BTreeMap<String, f64>,

    pub condition_step1_budget_per_m2: f64,
    pub condition_step2_budget_per_m2: f64,
    pub condition_step3_budget_per_m2: f64,
    pub condition_step4_budget_per_m2: f64,

    pub estimate_uncertainty_base: f64,
    pub estimate_uncertainty_per_adjustment: f64,
}

impl MarketProfile {
    /// Parses a profile document. Missing keys take their default value.
    pub fn from_json_str(document: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(document)
    }

    /// Canonical document: pretty JSON, sorted table keys, trailing newline.
    ///
    /// Reloading and re-saving a canonical document reproduces it byte for byte. Documents
    /// written elsewhere (insertion-ordered tables, no trailing newline) are rewritten into
    /// canonical form on their first save.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        let mut document = serde_json::to_string_pretty(self)?;
        document.push('\n');
        Ok(document)
    }

    /// City price when known and positive, otherwise `None`.
    pub fn city_price(&self, city: &str) -> Option<f64> {
        self.city_base_price_m2
            .get(city.trim())
            .copied()
            .filter(|price| *price > 0.0)
    }

    pub fn micro_segment_uplift(&self, segment: &str) -> f64 {
        self.micro_segment_base_uplift
            .get(segment.trim())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn disables_lot_size(&self, segment: &str) -> bool {
        self.micro_location_disable_lot_size_adjustment
            .contains(segment.trim())
    }

    pub fn disables_position(&self, segment: &str) -> bool {
        self.micro_location_disable_position_adjustment
            .contains(segment.trim())
    }

    pub fn neutralizes_house_type(&self, segment: &str, house_type: &str) -> bool {
        self.micro_location_house_type_neutralize
            .get(segment.trim())
            .is_some_and(|types| types.contains(house_type.trim()))
    }

    /// Positive condition-step thresholds in ascending order.
    pub fn condition_thresholds(&self) -> Vec<f64> {
        let mut thresholds: Vec<f64> = [
            self.condition_step1_budget_per_m2,
            self.condition_step2_budget_per_m2,
            self.condition_step3_budget_per_m2,
            self.condition_step4_budget_per_m2,
        ]
        .into_iter()
        .filter(|value| *value > 0.0)
        .collect();
        thresholds.sort_by(f64::total_cmp);
        thresholds
    }

    pub fn renovation_weight(&self, category: &str) -> f64 {
        self.renovation_category_weights
            .get(category)
            .copied()
            .unwrap_or(1.0)
    }
}

/// Looks up a category label; empty or unknown labels contribute nothing.
pub fn table_lookup(table: &AdjustmentTable, label: Option<&str>) -> f64 {
    match label.map(str::trim) {
        Some(key) if !key.is_empty() => table.get(key).copied().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_year_bucket_bounds_are_inclusive() {
        let bucket = BuildYearBucket {
            min_year: Some(1931),
            max_year: Some(1970),
            adjustment: -0.03,
        };
        assert!(bucket.contains(1931.0));
        assert!(bucket.contains(1970.0));
        assert!(!bucket.contains(1971.0));

        let open = BuildYearBucket {
            min_year: None,
            max_year: Some(1930),
            adjustment: 0.0,
        };
        assert!(open.contains(1600.0));
    }

    #[test]
    fn foreign_document_is_canonicalised_once() {
        let foreign = r#"{"energy_label_adjustments": {"A4": 0.06, "A": 0.04, "G": -0.08}}"#;
        let canonical = MarketProfile::from_json_str(foreign)
            .and_then(|profile| profile.to_json_string())
            .expect("foreign profile rewrites");

        assert_ne!(canonical, foreign);
        assert!(canonical.ends_with("}\n"));
        let a = canonical.find("\"A\"").expect("A present");
        let a4 = canonical.find("\"A4\"").expect("A4 present");
        assert!(a < a4);

        let resaved = MarketProfile::from_json_str(&canonical)
            .and_then(|profile| profile.to_json_string())
            .expect("canonical profile rewrites");
        assert_eq!(resaved, canonical);
    }

    #[test]
    fn partial_document_fills_defaults() {
        let profile = MarketProfile::from_json_str(r#"{"base_price_m2": 4200.0}"#)
            .expect("partial profile parses");
        assert_eq!(profile.base_price_m2, 4200.0);
        assert_eq!(profile.area_full_price_m2, MarketProfile::default().area_full_price_m2);
    }

    #[test]
    fn deprecated_keys_are_ignored() {
        let profile = MarketProfile::from_json_str(
            r#"{"roof_adjustments": {"Flat": -0.02}, "floors_adjustments": {}}"#,
        )
        .expect("older profile parses");
        assert_eq!(profile, MarketProfile::default());
    }

    #[test]
    fn condition_thresholds_drop_zero_and_sort() {
        let profile = MarketProfile {
            condition_step1_budget_per_m2: 600.0,
            condition_step2_budget_per_m2: 0.0,
            condition_step3_budget_per_m2: 150.0,
            condition_step4_budget_per_m2: 900.0,
            ..MarketProfile::default()
        };
        assert_eq!(profile.condition_thresholds(), vec![150.0, 600.0, 900.0]);
    }

    #[test]
    fn table_lookup_treats_blank_labels_as_neutral() {
        let mut table = AdjustmentTable::new();
        table.insert("A".to_string(), 0.04);
        assert_eq!(table_lookup(&table, Some(" A ")), 0.04);
        assert_eq!(table_lookup(&table, Some("")), 0.0);
        assert_eq!(table_lookup(&table, Some("Z")), 0.0);
        assert_eq!(table_lookup(&table, None), 0.0);
    }
}
