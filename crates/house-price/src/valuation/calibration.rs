//! Closed-form calibration of a [`MarketProfile`] from historical sales.
//!
//! Everything is a grouped median of price per m². Groups smaller than `min_count`
//! are left out entirely and every category ratio is clamped per call site.

use super::dataset::{CleanedDataset, CleanedSale, DatasetCleaner, DatasetError};
use super::profile::{AdjustmentTable, MarketProfile};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use tracing::{debug, info};

const ENERGY_LABEL_CLAMP: f64 = 0.15;
const BUILD_TYPE_CLAMP: f64 = 0.12;
const HOUSE_TYPE_CLAMP: f64 = 0.20;
const POSITION_CLAMP: f64 = 0.08;
const AUXILIARY_CLAMP: f64 = 0.08;

#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("no sales with a usable price and living area to calibrate from")]
    EmptyDataset,
}

/// Categorical columns of the cleaned table that can be grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryColumn {
    City,
    EnergyLabel,
    BuildType,
    HouseType,
    Garden,
    Roof,
    Position,
    Toilet,
    Floors,
}

impl CategoryColumn {
    fn key(self, sale: &CleanedSale) -> &str {
        match self {
            CategoryColumn::City => &sale.city,
            CategoryColumn::EnergyLabel => &sale.energy_label,
            CategoryColumn::BuildType => &sale.build_type,
            CategoryColumn::HouseType => &sale.house_type_norm,
            CategoryColumn::Garden => &sale.garden_norm,
            CategoryColumn::Roof => &sale.roof_norm,
            CategoryColumn::Position => &sale.position_norm,
            CategoryColumn::Toilet => &sale.toilet_norm,
            CategoryColumn::Floors => &sale.floors_norm,
        }
    }
}

/// Grouped price statistics over a cleaned dataset.
pub struct MarketCalibrator<'a> {
    sales: &'a [CleanedSale],
}

impl<'a> MarketCalibrator<'a> {
    pub fn new(dataset: &'a CleanedDataset) -> Self {
        Self {
            sales: &dataset.sales,
        }
    }

    /// Overall median price per m², or `None` without finite observations.
    pub fn median_price_per_m2(&self) -> Option<f64> {
        median(self.sales.iter().map(|sale| sale.price_per_m2).collect())
    }

    /// Median price per m² per city, for cities with at least `min_count` sales.
    pub fn city_medians(&self, min_count: usize) -> BTreeMap<String, f64> {
        self.grouped_medians(CategoryColumn::City, min_count)
    }

    /// Signed deviation of each category's median from the overall median, clamped
    /// to `[-clamp, clamp]`.
    pub fn category_adjustments(
        &self,
        column: CategoryColumn,
        min_count: usize,
        clamp: f64,
    ) -> AdjustmentTable {
        let Some(base) = self.median_price_per_m2().filter(|base| *base > 0.0) else {
            return AdjustmentTable::new();
        };
        let clamp = clamp.abs();
        self.grouped_medians(column, min_count)
            .into_iter()
            .map(|(category, median)| (category, (median / base - 1.0).clamp(-clamp, clamp)))
            .collect()
    }

    /// Median lot-size to living-area ratio; zero when no sale has a finite ratio.
    pub fn lot_size_ratio_median(&self) -> f64 {
        let ratios = self
            .sales
            .iter()
            .filter_map(|sale| sale.lot_size.map(|lot_size| lot_size / sale.living_area))
            .collect();
        median(ratios).unwrap_or(0.0)
    }

    fn grouped_medians(&self, column: CategoryColumn, min_count: usize) -> BTreeMap<String, f64> {
        let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for sale in self.sales {
            let key = column.key(sale).trim();
            if key.is_empty() {
                continue;
            }
            groups.entry(key).or_default().push(sale.price_per_m2);
        }

        let mut medians = BTreeMap::new();
        for (key, values) in groups {
            if values.len() < min_count {
                debug!(?column, category = key, count = values.len(), min_count, "suppressed small group");
                continue;
            }
            if let Some(value) = median(values) {
                medians.insert(key.to_string(), value);
            }
        }
        medians
    }
}

/// Median of the finite values; even-sized samples average the two middle values.
fn median(mut values: Vec<f64>) -> Option<f64> {
    values.retain(|value| value.is_finite());
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let middle = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[middle - 1] + values[middle]) / 2.0)
    } else {
        Some(values[middle])
    }
}

/// Descriptive statistics that accompany a calibrated profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationReport {
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub rows_used: usize,
    pub min_count: usize,
    pub median_price_per_m2: f64,
    pub cities: usize,
    pub lot_size_ratio_median: f64,
    pub garden_adjustments: AdjustmentTable,
    pub roof_adjustments: AdjustmentTable,
    pub toilet_adjustments: AdjustmentTable,
    pub floors_adjustments: AdjustmentTable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationOutcome {
    pub profile: MarketProfile,
    pub report: CalibrationReport,
}

/// Builds a profile from `dataset`: defaults overlaid with the fitted prices and tables.
pub fn calibrate(
    dataset: &CleanedDataset,
    min_count: usize,
) -> Result<CalibrationOutcome, CalibrationError> {
    let calibrator = MarketCalibrator::new(dataset);
    let base_price_m2 = calibrator
        .median_price_per_m2()
        .ok_or(CalibrationError::EmptyDataset)?;

    let profile = MarketProfile {
        base_price_m2,
        city_base_price_m2: calibrator.city_medians(min_count),
        energy_label_adjustments: calibrator.category_adjustments(
            CategoryColumn::EnergyLabel,
            min_count,
            ENERGY_LABEL_CLAMP,
        ),
        build_type_adjustments: calibrator.category_adjustments(
            CategoryColumn::BuildType,
            min_count,
            BUILD_TYPE_CLAMP,
        ),
        house_type_adjustments: calibrator.category_adjustments(
            CategoryColumn::HouseType,
            min_count,
            HOUSE_TYPE_CLAMP,
        ),
        position_adjustments: calibrator.category_adjustments(
            CategoryColumn::Position,
            min_count,
            POSITION_CLAMP,
        ),
        lot_size_ratio_median: calibrator.lot_size_ratio_median(),
        ..MarketProfile::default()
    };

    let report = CalibrationReport {
        rows_read: dataset.rows_read,
        rows_dropped: dataset.rows_dropped,
        rows_used: dataset.len(),
        min_count,
        median_price_per_m2: base_price_m2,
        cities: profile.city_base_price_m2.len(),
        lot_size_ratio_median: profile.lot_size_ratio_median,
        garden_adjustments: calibrator.category_adjustments(
            CategoryColumn::Garden,
            min_count,
            AUXILIARY_CLAMP,
        ),
        roof_adjustments: calibrator.category_adjustments(
            CategoryColumn::Roof,
            min_count,
            AUXILIARY_CLAMP,
        ),
        toilet_adjustments: calibrator.category_adjustments(
            CategoryColumn::Toilet,
            min_count,
            AUXILIARY_CLAMP,
        ),
        floors_adjustments: calibrator.category_adjustments(
            CategoryColumn::Floors,
            min_count,
            AUXILIARY_CLAMP,
        ),
    };

    info!(
        rows = report.rows_used,
        cities = report.cities,
        base_price_m2,
        "calibrated market profile"
    );

    Ok(CalibrationOutcome { profile, report })
}

/// Cleans a raw CSV export and calibrates from it.
pub fn calibrate_reader<R: Read>(
    reader: R,
    min_count: usize,
) -> Result<CalibrationOutcome, CalibrationError> {
    let dataset = DatasetCleaner::from_reader(reader)?;
    calibrate(&dataset, min_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(city: &str, price_per_m2: f64) -> CleanedSale {
        CleanedSale {
            price: price_per_m2 * 100.0,
            living_area: 100.0,
            price_per_m2,
            lot_size: None,
            build_year: None,
            rooms: None,
            energy_label: String::new(),
            build_type: String::new(),
            house_type: String::new(),
            house_type_norm: "Other".to_string(),
            garden_norm: "Other/Unknown".to_string(),
            roof_norm: "Other/Unknown".to_string(),
            position_norm: "Other/Unknown".to_string(),
            toilet_norm: "1 bath, 0 toilet".to_string(),
            floors_norm: "Unknown".to_string(),
            city: city.to_string(),
            neighborhood_price_m2: None,
        }
    }

    fn dataset(sales: Vec<CleanedSale>) -> CleanedDataset {
        CleanedDataset {
            rows_read: sales.len(),
            rows_dropped: 0,
            sales,
        }
    }

    #[test]
    fn median_averages_middle_pair() {
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(vec![5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(vec![f64::INFINITY, 2.0]), Some(2.0));
        assert_eq!(median(Vec::new()), None);
    }

    #[test]
    fn city_medians_skip_blank_and_small_groups() {
        let data = dataset(vec![
            sale("Delft", 4000.0),
            sale("Delft", 5000.0),
            sale("Gouda", 3000.0),
            sale("", 9000.0),
            sale("", 9000.0),
        ]);
        let medians = MarketCalibrator::new(&data).city_medians(2);
        assert_eq!(medians.len(), 1);
        assert_eq!(medians.get("Delft"), Some(&4500.0));
    }

    #[test]
    fn lot_size_ratio_ignores_missing_and_infinite() {
        let mut with_lot = sale("Delft", 4000.0);
        with_lot.lot_size = Some(150.0);
        let mut zero_area = sale("Delft", 4000.0);
        zero_area.living_area = 0.0;
        zero_area.lot_size = Some(100.0);
        let data = dataset(vec![with_lot, zero_area, sale("Delft", 4000.0)]);
        assert_eq!(MarketCalibrator::new(&data).lot_size_ratio_median(), 1.5);
    }

    #[test]
    fn empty_dataset_cannot_be_calibrated() {
        let error = calibrate(&CleanedDataset::default(), 1).expect_err("empty dataset");
        assert!(matches!(error, CalibrationError::EmptyDataset));
    }
}
