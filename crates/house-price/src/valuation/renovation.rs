use super::normalize::normalize_energy_label;
use super::profile::MarketProfile;
use serde::{Deserialize, Serialize};

/// Energy labels from worst to best; the position is the label's ordinal step.
const LABEL_ORDER: [&str; 11] = ["G", "F", "E", "D", "C", "B", "A", "A1", "A2", "A3", "A4"];

/// Condition tiers from worst to best.
pub const CONDITION_ORDER: [&str; 5] = ["Slecht", "Matig", "Redelijk", "Goed", "Uitstekend"];

const DEFAULT_CONDITION: &str = "Redelijk";

/// A planned renovation: how much is spent and which energy label it moves between.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ScenarioInput")]
pub struct RenovationScenario {
    budget: f64,
    energy_label_before: Option<String>,
    energy_label_after: Option<String>,
}

#[derive(Deserialize)]
struct ScenarioInput {
    #[serde(default)]
    budget: f64,
    #[serde(default)]
    energy_label_before: Option<String>,
    #[serde(default)]
    energy_label_after: Option<String>,
}

impl From<ScenarioInput> for RenovationScenario {
    fn from(input: ScenarioInput) -> Self {
        Self::new(input.budget, input.energy_label_before, input.energy_label_after)
    }
}

impl RenovationScenario {
    /// Negative or non-finite budgets are treated as no budget. Blank labels are absent.
    pub fn new(
        budget: f64,
        energy_label_before: Option<String>,
        energy_label_after: Option<String>,
    ) -> Self {
        Self {
            budget: if budget.is_finite() { budget.max(0.0) } else { 0.0 },
            energy_label_before: non_blank(energy_label_before),
            energy_label_after: non_blank(energy_label_after),
        }
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn energy_label_before(&self) -> Option<&str> {
        self.energy_label_before.as_deref()
    }

    pub fn energy_label_after(&self) -> Option<&str> {
        self.energy_label_after.as_deref()
    }

    /// Same labels, different budget.
    pub fn with_budget(&self, budget: f64) -> Self {
        Self::new(
            budget,
            self.energy_label_before.clone(),
            self.energy_label_after.clone(),
        )
    }

    /// Step-based label uplift: each ordinal step gained is worth
    /// `renovation_label_step_uplift`, capped at `renovation_label_cap`.
    pub fn label_uplift(&self, profile: &MarketProfile) -> f64 {
        let before = normalize_energy_label(self.energy_label_before());
        let after = normalize_energy_label(self.energy_label_after());
        if before.is_empty() || after.is_empty() {
            return 0.0;
        }

        let before_step = label_step(&before);
        let after_step = label_step(&after);
        if after_step <= before_step {
            return 0.0;
        }

        let steps = f64::from(after_step - before_step);
        (steps * profile.renovation_label_step_uplift).min(profile.renovation_label_cap)
    }
}

fn non_blank(label: Option<String>) -> Option<String> {
    label
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// 1 for G up to 11 for A4; unknown labels sit below G.
fn label_step(label: &str) -> u32 {
    LABEL_ORDER
        .iter()
        .position(|known| *known == label)
        .map_or(0, |index| index as u32 + 1)
}

/// Renovation budget split over spending categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetAllocation {
    pub kitchen: f64,
    pub bathroom: f64,
    pub insulation: f64,
    pub roof_windows: f64,
    pub exterior: f64,
    pub other: f64,
}

impl BudgetAllocation {
    fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("kitchen", self.kitchen),
            ("bathroom", self.bathroom),
            ("insulation", self.insulation),
            ("roof_windows", self.roof_windows),
            ("exterior", self.exterior),
            ("other", self.other),
        ]
    }

    pub fn total(&self) -> f64 {
        self.entries().iter().map(|(_, amount)| amount.max(0.0)).sum()
    }

    /// Budget weighted by the profile's per-category return factors.
    pub fn weighted_total(&self, profile: &MarketProfile) -> f64 {
        self.entries()
            .iter()
            .map(|(category, amount)| amount.max(0.0) * profile.renovation_weight(category))
            .sum()
    }
}

/// Condition tier expected after spending `budget` on `living_area` m².
///
/// Each condition-step threshold met by the budget per m² lifts the tier by one.
pub fn suggest_condition(
    current: &str,
    budget: f64,
    living_area: f64,
    profile: &MarketProfile,
) -> String {
    let current = current.trim();
    if current.is_empty() {
        return DEFAULT_CONDITION.to_string();
    }
    if living_area <= 0.0 {
        return current.to_string();
    }
    let Some(index) = CONDITION_ORDER.iter().position(|tier| *tier == current) else {
        return current.to_string();
    };

    let budget_per_m2 = if budget > 0.0 { budget / living_area } else { 0.0 };
    let steps = profile
        .condition_thresholds()
        .into_iter()
        .filter(|threshold| budget_per_m2 >= *threshold)
        .count();

    CONDITION_ORDER[(index + steps).min(CONDITION_ORDER.len() - 1)].to_string()
}

/// What-if plan compared against the current state of a property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenovationPlan {
    pub budget: f64,
    /// When present, its weighted total replaces `budget`.
    pub allocation: Option<BudgetAllocation>,
    pub energy_label_before: Option<String>,
    pub energy_label_after: Option<String>,
    pub extra_living_area: f64,
    pub extra_rooms: f64,
    pub years_forward: u32,
}

impl RenovationPlan {
    pub fn renovation_budget(&self, profile: &MarketProfile) -> f64 {
        match &self.allocation {
            Some(allocation) => allocation.weighted_total(profile),
            None => self.budget.max(0.0),
        }
    }

    pub fn scenario(&self, budget: f64) -> RenovationScenario {
        RenovationScenario::new(
            budget,
            self.energy_label_before.clone(),
            self.energy_label_after.clone(),
        )
    }
}
