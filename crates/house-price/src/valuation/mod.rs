pub mod calibration;
pub mod dataset;
pub mod estimator;
pub mod features;
pub mod normalize;
pub mod profile;
pub mod renovation;

pub use calibration::{
    calibrate, calibrate_reader, CalibrationError, CalibrationOutcome, CalibrationReport,
    CategoryColumn, MarketCalibrator,
};
pub use dataset::{CleanedDataset, CleanedSale, DatasetCleaner, DatasetError};
pub use estimator::{
    Adjustments, EstimateError, EstimateRange, EstimateResult, PriceEstimator, RenovationOutcome,
    ScenarioComparison,
};
pub use features::{FeatureValue, PropertyFeatures};
pub use profile::{AdjustmentTable, BuildYearBucket, MarketProfile, ProfileError, ProfileStore};
pub use renovation::{
    suggest_condition, BudgetAllocation, RenovationPlan, RenovationScenario, CONDITION_ORDER,
};
