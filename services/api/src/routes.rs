use crate::infra::{horizon, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use house_price::error::AppError;
use house_price::valuation::{
    calibrate_reader, CalibrationOutcome, EstimateResult, MarketProfile, PriceEstimator,
    PropertyFeatures, RenovationPlan, RenovationScenario, ScenarioComparison,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;

#[derive(Debug, Deserialize)]
pub(crate) struct EstimateRequest {
    pub(crate) features: PropertyFeatures,
    #[serde(default)]
    pub(crate) years_forward: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RenovationRequest {
    pub(crate) features: PropertyFeatures,
    #[serde(default)]
    pub(crate) scenario: RenovationScenario,
    #[serde(default)]
    pub(crate) years_forward: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScenarioRequest {
    pub(crate) features: PropertyFeatures,
    #[serde(default)]
    pub(crate) plan: RenovationPlan,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CalibrateRequest {
    pub(crate) csv: String,
    #[serde(default)]
    pub(crate) min_count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EstimateResponse {
    pub(crate) valued_on: NaiveDate,
    pub(crate) horizon_year: i32,
    #[serde(flatten)]
    pub(crate) result: EstimateResult,
}

pub(crate) fn valuation_router() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/profile", axum::routing::get(profile_endpoint))
        .route("/api/v1/estimate", axum::routing::post(estimate_endpoint))
        .route(
            "/api/v1/estimate/renovation",
            axum::routing::post(renovation_endpoint),
        )
        .route("/api/v1/scenario", axum::routing::post(scenario_endpoint))
        .route("/api/v1/calibrate", axum::routing::post(calibrate_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn profile_endpoint(Extension(state): Extension<AppState>) -> Json<MarketProfile> {
    Json(state.profile.as_ref().clone())
}

pub(crate) async fn estimate_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<EstimateRequest>,
) -> Result<Json<EstimateResponse>, AppError> {
    let estimator = PriceEstimator::new(&state.profile);
    let result = estimator.estimate(&payload.features, horizon(payload.years_forward))?;
    Ok(Json(respond(&state.profile, payload.years_forward, result)))
}

pub(crate) async fn renovation_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RenovationRequest>,
) -> Result<Json<EstimateResponse>, AppError> {
    let estimator = PriceEstimator::new(&state.profile);
    let result = estimator.estimate_with_renovation(
        &payload.features,
        &payload.scenario,
        horizon(payload.years_forward),
    )?;
    Ok(Json(respond(&state.profile, payload.years_forward, result)))
}

pub(crate) async fn scenario_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ScenarioRequest>,
) -> Result<Json<ScenarioComparison>, AppError> {
    let comparison = PriceEstimator::new(&state.profile).compare(&payload.features, &payload.plan)?;
    Ok(Json(comparison))
}

/// Fits a profile from an inline CSV export. Nothing is persisted.
pub(crate) async fn calibrate_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<CalibrateRequest>,
) -> Result<Json<CalibrationOutcome>, AppError> {
    let min_count = payload.min_count.unwrap_or(state.min_count);
    let outcome = calibrate_reader(Cursor::new(payload.csv.into_bytes()), min_count)?;
    Ok(Json(outcome))
}

fn respond(profile: &MarketProfile, years_forward: u32, result: EstimateResult) -> EstimateResponse {
    EstimateResponse {
        valued_on: Local::now().date_naive(),
        horizon_year: profile.current_year.saturating_add(horizon(years_forward)),
        result,
    }
}
