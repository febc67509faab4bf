use crate::infra::{AppState, CalculateRequest, ScenarioComparisonRequest};
use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use mortgage_calc::amortization::{
    AmortizationEngine, CalculationError, CalculationResult, ScenarioComparison,
};
use mortgage_calc::error::AppError;
use serde_json::json;
use tracing::warn;

/// Calculation routes, mounted both at the root and under the versioned prefix.
pub(crate) fn mortgage_router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/calculate", post(calculate_endpoint))
        .route(
            "/api/v1/mortgage_calculations/calculate",
            post(calculate_endpoint),
        )
        .route("/scenario_comparison", post(scenario_comparison_endpoint))
        .route(
            "/api/v1/mortgage_calculations/scenario_comparison",
            post(scenario_comparison_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Local::now().to_rfc3339(),
    }))
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

pub(crate) async fn calculate_endpoint(
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<CalculationResult>, AppError> {
    let Json(CalculateRequest { inputs, as_of }) = payload.map_err(rejected_body)?;

    let engine = AmortizationEngine::new(inputs, evaluation_date(as_of)).map_err(invalid_loan)?;
    Ok(Json(engine.into_result()))
}

pub(crate) async fn scenario_comparison_endpoint(
    payload: Result<Json<ScenarioComparisonRequest>, JsonRejection>,
) -> Result<Json<Vec<ScenarioComparison>>, AppError> {
    let Json(ScenarioComparisonRequest {
        inputs,
        extra_payment_amounts,
        as_of,
    }) = payload.map_err(rejected_body)?;

    let engine = AmortizationEngine::new(inputs, evaluation_date(as_of)).map_err(invalid_loan)?;
    let comparisons = engine
        .compare_scenarios(extra_payment_amounts.as_deref().unwrap_or_default())
        .map_err(invalid_loan)?;
    Ok(Json(comparisons))
}

fn evaluation_date(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| Local::now().date_naive())
}

fn rejected_body(rejection: JsonRejection) -> AppError {
    let message = rejection.body_text();
    warn!(status = %rejection.status(), %message, "rejected request body");
    AppError::BadRequest(message)
}

fn invalid_loan(err: CalculationError) -> AppError {
    warn!(error = %err, "rejected loan parameters");
    AppError::from(err)
}
