use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use primrose::config::AppConfig;
use primrose::error::AppError;
use primrose::telemetry;
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{ApiContext, AppState};
use crate::routes::api_router;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let context = ApiContext::new();
    if let Some(admin) = &config.bootstrap.admin {
        context
            .accounts
            .bootstrap_admin(&admin.username, &admin.email, &admin.password)
            .map_err(|err| AppError::Bootstrap(err.to_string()))?;
    }

    let app = api_router(context)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "listing platform api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
