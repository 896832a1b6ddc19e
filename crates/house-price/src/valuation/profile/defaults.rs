use super::{AdjustmentTable, BuildYearBucket, MarketProfile};
use std::collections::{BTreeMap, BTreeSet};

const PREMIUM_SEGMENT: &str = "Zeer hoge extra vraag";

fn table(entries: &[(&str, f64)]) -> AdjustmentTable {
    entries
        .iter()
        .map(|(label, value)| ((*label).to_string(), *value))
        .collect()
}

fn labels(entries: &[&str]) -> BTreeSet<String> {
    entries.iter().map(|label| (*label).to_string()).collect()
}

fn bucket(min_year: Option<i32>, max_year: Option<i32>, adjustment: f64) -> BuildYearBucket {
    BuildYearBucket {
        min_year,
        max_year,
        adjustment,
    }
}

impl Default for MarketProfile {
    fn default() -> Self {
        let garden_house = table(&[("10-25", 0.01), ("25-50", 0.02), ("50+", 0.03)]);
        let garden_apartment = table(&[("10-25", 0.03), ("25-50", 0.05), ("50+", 0.07)]);

        let mut neutralize = BTreeMap::new();
        neutralize.insert(
            PREMIUM_SEGMENT.to_string(),
            labels(&["Corner", "Detached", "Semi-detached", "Townhouse"]),
        );

        Self {
            reference_year: 2022,
            current_year: 2026,
            annual_growth_rate: 0.04,

            base_price_m2: 3500.0,
            city_base_price_m2: BTreeMap::new(),
            neighborhood_price_weight: 0.7,
            micro_segment_base_uplift: table(&[
                ("Geen extra vraag", 0.0),
                ("Licht extra vraag", 0.03),
                ("Duidelijk extra vraag", 0.06),
                (PREMIUM_SEGMENT, 0.10),
            ]),

            area_full_price_m2: 80.0,
            area_extra_weight: 0.7,

            small_home_reference_m2: 70.0,
            small_home_uplift_at_50m2: 0.10,
            small_home_uplift_cap: 0.12,

            room_area_m2: 30.0,
            room_adjustment_per_room: 0.02,
            room_overcrowding_threshold: 1.0,
            room_overcrowding_penalty_per_room: 0.03,
            room_adjustment_cap: 0.06,

            max_adjustment: 0.25,
            min_adjustment: -0.2,

            energy_label_adjustments: table(&[
                ("A4", 0.06),
                ("A3", 0.055),
                ("A2", 0.05),
                ("A1", 0.045),
                ("A", 0.04),
                ("B", 0.02),
                ("C", 0.0),
                ("D", -0.02),
                ("E", -0.04),
                ("F", -0.06),
                ("G", -0.08),
            ]),
            build_type_adjustments: table(&[("Bestaande bouw", 0.0), ("Nieuwbouw", 0.05)]),
            house_type_adjustments: table(&[
                ("Apartment", 0.0),
                ("Terraced", 0.0),
                ("Corner", 0.02),
                ("Semi-detached", 0.05),
                ("Detached", 0.10),
                ("Townhouse", 0.06),
                ("Other", 0.0),
            ]),
            condition_adjustments: table(&[
                ("Slecht", -0.12),
                ("Matig", -0.06),
                ("Redelijk", 0.0),
                ("Goed", 0.04),
                ("Uitstekend", 0.08),
            ]),
            position_adjustments: table(&[
                ("Residential", 0.0),
                ("Quiet/Sheltered", 0.02),
                ("Center", 0.03),
                ("Water", 0.05),
                ("Park", 0.03),
                ("Forest", 0.03),
                ("View/Open", 0.02),
                ("Busy road", -0.04),
                ("Other/Unknown", 0.0),
            ]),
            bathroom_adjustments: table(&[("0", -0.05), ("1", 0.0), ("2", 0.02), ("3+", 0.03)]),
            toilet_count_adjustments: table(&[("1", 0.0), ("2", 0.01), ("3+", 0.015)]),

            garden_adjustments_apartment: garden_apartment,
            garden_adjustments_house: garden_house,

            lot_size_ratio_median: 0.0,
            lot_size_ratio_weight: 0.15,
            lot_size_ratio_clamp: 0.06,

            micro_location_disable_lot_size_adjustment: labels(&[PREMIUM_SEGMENT]),
            micro_location_disable_position_adjustment: labels(&[PREMIUM_SEGMENT]),
            micro_location_house_type_neutralize: neutralize,

            build_year_buckets: vec![
                bucket(None, Some(1930), -0.02),
                bucket(Some(1931), Some(1970), -0.03),
                bucket(Some(1971), Some(1990), -0.01),
                bucket(Some(1991), Some(2010), 0.0),
                bucket(Some(2011), None, 0.03),
            ],

            renovation_roi: 0.6,
            renovation_roi_saturation: 0.08,
            renovation_cap: 0.2,
            renovation_label_step_uplift: 0.02,
            renovation_label_cap: 0.08,
            renovation_category_weights: table(&[
                ("kitchen", 0.7),
                ("bathroom", 0.8),
                ("insulation", 1.2),
                ("roof_windows", 1.1),
                ("exterior", 0.6),
                ("other", 1.0),
            ]),

            condition_step1_budget_per_m2: 150.0,
            condition_step2_budget_per_m2: 350.0,
            condition_step3_budget_per_m2: 600.0,
            condition_step4_budget_per_m2: 900.0,

            estimate_uncertainty_base: 0.06,
            estimate_uncertainty_per_adjustment: 0.5,
        }
    }
}
