use super::features::{FeatureValue, PropertyFeatures};
use super::normalize::{normalize_energy_label, HOUSE_TYPE_APARTMENT};
use super::profile::{table_lookup, MarketProfile};
use super::renovation::{suggest_condition, RenovationPlan, RenovationScenario};
use serde::Serialize;
use tracing::debug;

const GARDEN_MIN_AREA_M2: f64 = 10.0;
const SMALL_HOME_ANCHOR_M2: f64 = 50.0;
const MIN_UNCERTAINTY: f64 = 0.02;
const MAX_UNCERTAINTY: f64 = 0.25;
const MIN_ROI_SATURATION: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EstimateError {
    #[error("living_area is required for estimation")]
    MissingLivingArea,
}

/// Independent adjustment fractions; they are summed, never compounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Adjustments {
    pub energy_label: f64,
    pub build_type: f64,
    pub house_type: f64,
    pub garden: f64,
    pub position: f64,
    pub build_year: f64,
    pub rooms: f64,
    pub lot_size: f64,
    pub small_home: f64,
    pub bathrooms: f64,
    pub toilets: f64,
    pub condition: f64,
}

impl Adjustments {
    pub fn entries(&self) -> [(&'static str, f64); 12] {
        [
            ("energy_label", self.energy_label),
            ("build_type", self.build_type),
            ("house_type", self.house_type),
            ("garden", self.garden),
            ("position", self.position),
            ("build_year", self.build_year),
            ("rooms", self.rooms),
            ("lot_size", self.lot_size),
            ("small_home", self.small_home),
            ("bathrooms", self.bathrooms),
            ("toilets", self.toilets),
            ("condition", self.condition),
        ]
    }

    pub fn total(&self) -> f64 {
        self.entries().iter().map(|(_, value)| value).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EstimateRange {
    pub low: f64,
    pub high: f64,
    pub uncertainty_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenovationOutcome {
    pub budget: f64,
    pub label_uplift: f64,
    pub roi_uplift: f64,
    pub total_uplift: f64,
    pub renovated_value: f64,
    pub renovated_range: EstimateRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateResult {
    pub base_price_m2: f64,
    pub living_area: f64,
    pub base_value: f64,
    pub adjustments: Adjustments,
    pub total_adjustment: f64,
    pub market_multiplier: f64,
    pub estimate: f64,
    pub estimate_range: EstimateRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renovation: Option<RenovationOutcome>,
}

/// Current value against the value after a renovation plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioComparison {
    pub current: EstimateResult,
    pub scenario: EstimateResult,
    pub condition_before: Option<String>,
    pub suggested_condition: String,
    pub renovation_budget: f64,
    pub value_delta: f64,
    pub delta_pct: f64,
    /// Value gained per euro of applied budget; absent when no budget is applied.
    pub value_per_euro: Option<f64>,
}

/// Additive-adjustment pricing model over a borrowed, read-only profile.
#[derive(Debug, Clone, Copy)]
pub struct PriceEstimator<'a> {
    profile: &'a MarketProfile,
}

impl<'a> PriceEstimator<'a> {
    pub fn new(profile: &'a MarketProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &MarketProfile {
        self.profile
    }

    /// `(1 + g)^years`; negative horizons count as zero.
    pub fn market_multiplier(&self, years_forward: i32) -> f64 {
        let years = years_forward.max(0);
        (1.0 + self.profile.annual_growth_rate).powi(years)
    }

    /// City or national price, blended with a neighborhood price, lifted by the micro segment.
    pub fn base_price_m2(&self, features: &PropertyFeatures) -> f64 {
        let mut base = features
            .city
            .as_deref()
            .and_then(|city| self.profile.city_price(city))
            .unwrap_or(self.profile.base_price_m2);

        if let Some(neighborhood) = features.neighborhood_price().filter(|price| *price > 0.0) {
            let weight = self.profile.neighborhood_price_weight;
            base = weight * neighborhood + (1.0 - weight) * base;
        }

        base * (1.0 + self.profile.micro_segment_uplift(micro_segment(features)))
    }

    pub fn effective_area(&self, living_area: f64) -> f64 {
        let full_area = self.profile.area_full_price_m2.max(0.0);
        let extra_weight = self.profile.area_extra_weight.clamp(0.0, 1.0);
        if living_area <= full_area {
            living_area
        } else {
            full_area + (living_area - full_area) * extra_weight
        }
    }

    pub fn estimate(
        &self,
        features: &PropertyFeatures,
        years_forward: i32,
    ) -> Result<EstimateResult, EstimateError> {
        let living_area = features
            .living_area_m2()
            .ok_or(EstimateError::MissingLivingArea)?;

        let base_price_m2 = self.base_price_m2(features);
        let base_value = self.effective_area(living_area) * base_price_m2;

        let adjustments = self.adjustments(features, living_area);
        let total_adjustment = adjustments
            .total()
            .max(self.profile.min_adjustment)
            .min(self.profile.max_adjustment);

        let market_multiplier = self.market_multiplier(years_forward);
        let estimate = base_value * (1.0 + total_adjustment) * market_multiplier;

        debug!(
            living_area,
            base_price_m2,
            total_adjustment,
            years_forward,
            estimate,
            "estimated property value"
        );

        Ok(EstimateResult {
            base_price_m2,
            living_area,
            base_value,
            adjustments,
            total_adjustment,
            market_multiplier,
            estimate,
            estimate_range: self.estimate_range(estimate, total_adjustment),
            renovation: None,
        })
    }

    /// Base estimate for the "before" picture with the renovation uplift layered on top.
    ///
    /// The label uplift runs from the label the base estimate was priced with (the scenario's
    /// "before" label, else the property's own label) to the "after" label; without an
    /// "after" label the label is unchanged and contributes nothing.
    pub fn estimate_with_renovation(
        &self,
        features: &PropertyFeatures,
        scenario: &RenovationScenario,
        years_forward: i32,
    ) -> Result<EstimateResult, EstimateError> {
        let mut before = features.clone();
        if let Some(label) = scenario.energy_label_before() {
            before.energy_label = Some(label.to_string());
        }
        let mut result = self.estimate(&before, years_forward)?;
        let base_value = result.estimate;

        let roi_uplift = self.budget_uplift(scenario.budget(), base_value);

        let before_label = normalize_energy_label(before.energy_label.as_deref());
        let label_uplift = match scenario.energy_label_after() {
            Some(after) => {
                let after_label = normalize_energy_label(Some(after));
                let table = &self.profile.energy_label_adjustments;
                let gain = table_lookup(table, Some(&after_label))
                    - table_lookup(table, Some(&before_label));
                gain.max(0.0).min(self.profile.renovation_label_cap)
            }
            None => 0.0,
        };

        let total_uplift = (roi_uplift + label_uplift).clamp(0.0, self.profile.renovation_cap.max(0.0));
        let renovated_value = base_value * (1.0 + total_uplift);

        debug!(
            budget = scenario.budget(),
            roi_uplift,
            label_uplift,
            total_uplift,
            "applied renovation scenario"
        );

        result.renovation = Some(RenovationOutcome {
            budget: scenario.budget(),
            label_uplift,
            roi_uplift,
            total_uplift,
            renovated_value,
            renovated_range: self.estimate_range(renovated_value, result.total_adjustment),
        });
        Ok(result)
    }

    /// Compares the property today with the property after `plan`.
    ///
    /// The budget-driven uplift only applies when the plan does not already lift the
    /// condition tier, so a budget is never counted twice.
    pub fn compare(
        &self,
        features: &PropertyFeatures,
        plan: &RenovationPlan,
    ) -> Result<ScenarioComparison, EstimateError> {
        let living_area = features
            .living_area_m2()
            .ok_or(EstimateError::MissingLivingArea)?;
        let years_forward = i32::try_from(plan.years_forward).unwrap_or(i32::MAX);

        let renovation_budget = plan.renovation_budget(self.profile);
        let condition_before = features
            .condition
            .as_deref()
            .map(str::trim)
            .filter(|condition| !condition.is_empty())
            .map(str::to_string);
        let suggested_condition = suggest_condition(
            condition_before.as_deref().unwrap_or_default(),
            renovation_budget,
            living_area,
            self.profile,
        );

        let applied_budget = if condition_before.as_deref() == Some(suggested_condition.as_str()) {
            renovation_budget
        } else {
            0.0
        };
        let scenario = plan.scenario(applied_budget);

        let current = self.estimate_with_renovation(features, &scenario, years_forward)?;

        let mut planned = features.clone();
        if plan.extra_living_area > 0.0 {
            planned.living_area = Some(FeatureValue::Number(living_area + plan.extra_living_area));
        }
        if plan.extra_rooms > 0.0 {
            if let Some(rooms) = features.rooms_count() {
                planned.rooms = Some(FeatureValue::Number(rooms + plan.extra_rooms));
            }
        }
        planned.condition = Some(suggested_condition.clone());
        let scenario_result = self.estimate_with_renovation(&planned, &scenario, years_forward)?;

        let renovated_value = scenario_result
            .renovation
            .map_or(scenario_result.estimate, |outcome| outcome.renovated_value);
        let value_delta = renovated_value - current.estimate;
        let delta_pct = if current.estimate > 0.0 {
            value_delta / current.estimate
        } else {
            0.0
        };
        let value_per_euro = (scenario.budget() > 0.0).then(|| value_delta / scenario.budget());

        Ok(ScenarioComparison {
            current,
            scenario: scenario_result,
            condition_before,
            suggested_condition,
            renovation_budget,
            value_delta,
            delta_pct,
            value_per_euro,
        })
    }

    fn adjustments(&self, features: &PropertyFeatures, living_area: f64) -> Adjustments {
        let profile = self.profile;
        let segment = micro_segment(features);
        let energy_label = normalize_energy_label(features.energy_label.as_deref());

        let house_type = features.house_type.as_deref().map(str::trim).unwrap_or_default();
        let house_type_adjustment = if profile.neutralizes_house_type(segment, house_type) {
            0.0
        } else {
            table_lookup(&profile.house_type_adjustments, Some(house_type))
        };

        let position = if profile.disables_position(segment) {
            0.0
        } else {
            table_lookup(&profile.position_adjustments, features.position.as_deref())
        };

        Adjustments {
            energy_label: table_lookup(&profile.energy_label_adjustments, Some(&energy_label)),
            build_type: table_lookup(&profile.build_type_adjustments, features.build_type.as_deref()),
            house_type: house_type_adjustment,
            garden: self.garden_adjustment(features.garden_area_m2(), house_type),
            position,
            build_year: self.build_year_adjustment(features.build_year_value()),
            rooms: self.room_adjustment(living_area, features.rooms_count()),
            lot_size: self.lot_size_adjustment(features, living_area),
            small_home: self.small_home_adjustment(living_area),
            bathrooms: table_lookup(
                &profile.bathroom_adjustments,
                features.bathroom_label().as_deref(),
            ),
            toilets: table_lookup(
                &profile.toilet_count_adjustments,
                features.toilet_label().as_deref(),
            ),
            condition: table_lookup(&profile.condition_adjustments, features.condition.as_deref()),
        }
    }

    /// Bucketed garden adjustment; gardens under 10 m² contribute nothing.
    pub fn garden_adjustment(&self, garden_area: Option<f64>, house_type: &str) -> f64 {
        let Some(area) = garden_area.filter(|area| *area >= GARDEN_MIN_AREA_M2) else {
            return 0.0;
        };
        let bucket = if area < 25.0 {
            "10-25"
        } else if area < 50.0 {
            "25-50"
        } else {
            "50+"
        };
        let table = if house_type == HOUSE_TYPE_APARTMENT {
            &self.profile.garden_adjustments_apartment
        } else {
            &self.profile.garden_adjustments_house
        };
        table_lookup(table, Some(bucket))
    }

    fn build_year_adjustment(&self, year: Option<f64>) -> f64 {
        let Some(year) = year else {
            return 0.0;
        };
        self.profile
            .build_year_buckets
            .iter()
            .find(|bucket| bucket.contains(year))
            .map_or(0.0, |bucket| bucket.adjustment)
    }

    fn room_adjustment(&self, living_area: f64, rooms: Option<f64>) -> f64 {
        let profile = self.profile;
        let Some(rooms) = rooms else {
            return 0.0;
        };
        if profile.room_area_m2 <= 0.0 {
            return 0.0;
        }

        let expected = (living_area / profile.room_area_m2).max(1.0);
        let diff = rooms - expected;
        let mut adjustment = diff * profile.room_adjustment_per_room;
        if diff > profile.room_overcrowding_threshold {
            adjustment -=
                (diff - profile.room_overcrowding_threshold) * profile.room_overcrowding_penalty_per_room;
        }
        let cap = profile.room_adjustment_cap.abs();
        adjustment.clamp(-cap, cap)
    }

    fn lot_size_adjustment(&self, features: &PropertyFeatures, living_area: f64) -> f64 {
        let profile = self.profile;
        if profile.disables_lot_size(micro_segment(features)) || profile.lot_size_ratio_median <= 0.0 {
            return 0.0;
        }
        let Some(lot_size) = features.lot_size_m2() else {
            return 0.0;
        };
        if living_area <= 0.0 {
            return 0.0;
        }

        let delta = (lot_size / living_area) / profile.lot_size_ratio_median - 1.0;
        let clamp = profile.lot_size_ratio_clamp.abs();
        (delta * profile.lot_size_ratio_weight).clamp(-clamp, clamp)
    }

    fn small_home_adjustment(&self, living_area: f64) -> f64 {
        let profile = self.profile;
        let reference = profile.small_home_reference_m2;
        if reference <= SMALL_HOME_ANCHOR_M2 || living_area >= reference {
            return 0.0;
        }
        let share = (reference - living_area) / (reference - SMALL_HOME_ANCHOR_M2);
        (profile.small_home_uplift_at_50m2 * share).clamp(0.0, profile.small_home_uplift_cap.max(0.0))
    }

    fn budget_uplift(&self, budget: f64, base_value: f64) -> f64 {
        if budget <= 0.0 || base_value <= 0.0 {
            return 0.0;
        }
        let ratio = budget / base_value;
        let linear = ratio * self.profile.renovation_roi;
        let saturation = self.profile.renovation_roi_saturation.max(MIN_ROI_SATURATION);
        linear / (1.0 + ratio / saturation)
    }

    fn estimate_range(&self, estimate: f64, total_adjustment: f64) -> EstimateRange {
        let uncertainty = (self.profile.estimate_uncertainty_base
            + total_adjustment.abs() * self.profile.estimate_uncertainty_per_adjustment)
            .clamp(MIN_UNCERTAINTY, MAX_UNCERTAINTY);
        EstimateRange {
            low: estimate * (1.0 - uncertainty),
            high: estimate * (1.0 + uncertainty),
            uncertainty_pct: uncertainty,
        }
    }
}

fn micro_segment(features: &PropertyFeatures) -> &str {
    features.micro_location.as_deref().map(str::trim).unwrap_or_default()
}
