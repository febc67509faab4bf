use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::{metrics_endpoint, mortgage_router, readiness_endpoint};
use axum::http::Method;
use axum::routing::get;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use mortgage_calc::config::{AppConfig, CorsConfig};
use mortgage_calc::error::AppError;
use mortgage_calc::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = mortgage_router()
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .layer(Extension(app_state))
        .layer(cors_layer(&config.cors))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        origins = config.cors.allowed_origins.len(),
        "mortgage calculator ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(cors.header_values()))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
