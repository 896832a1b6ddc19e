use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::valuation_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use house_price::config::AppConfig;
use house_price::error::AppError;
use house_price::valuation::ProfileStore;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut config: AppConfig, mut args: ServeArgs) -> Result<(), AppError> {
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(profile) = args.profile.take() {
        config.valuation.profile_path = profile;
    }

    let store = ProfileStore::new(
        config.valuation.profile_path.clone(),
        config.valuation.default_profile_path.clone(),
    );
    let profile = store.load_or_default()?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        profile: Arc::new(profile),
        min_count: config.valuation.min_count,
    };

    let app = valuation_router()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        profile = %store.path().display(),
        "house price valuation service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
