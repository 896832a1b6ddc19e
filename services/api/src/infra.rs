use chrono::NaiveDate;
use house_price::error::AppError;
use house_price::valuation::MarketProfile;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) profile: Arc<MarketProfile>,
    pub(crate) min_count: usize,
}

/// Reads a JSON document such as a feature record or a renovation plan.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let file = File::open(path)?;
    let value = serde_json::from_reader(BufReader::new(file)).map_err(std::io::Error::from)?;
    Ok(value)
}

pub(crate) fn parse_year(raw: &str) -> Result<i32, String> {
    let year = raw
        .trim()
        .parse::<i32>()
        .map_err(|err| format!("failed to parse '{raw}' as a year ({err})"))?;
    NaiveDate::from_ymd_opt(year, 1, 1)
        .map(|_| year)
        .ok_or_else(|| format!("year {year} is out of range"))
}

/// Whole years between the profile's current year and `target_year`; past years count as zero.
pub(crate) fn years_until(profile: &MarketProfile, target_year: i32) -> i32 {
    target_year.saturating_sub(profile.current_year).max(0)
}

/// API and CLI horizons are unsigned; the estimator works in `i32`.
pub(crate) fn horizon(years_forward: u32) -> i32 {
    i32::try_from(years_forward).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_year_rejects_text() {
        assert_eq!(parse_year(" 2030 "), Ok(2030));
        assert!(parse_year("next year").is_err());
    }

    #[test]
    fn years_until_counts_from_profile_year() {
        let profile = MarketProfile::default();
        assert_eq!(years_until(&profile, profile.current_year + 5), 5);
        assert_eq!(years_until(&profile, profile.current_year - 3), 0);
    }
}
