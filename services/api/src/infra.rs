use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use mortgage_calc::amortization::{deserialize_optional_date, LoanInputs};
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Body of the calculate endpoints: the loan fields at the top level plus an
/// optional evaluation date.
#[derive(Debug, Deserialize)]
pub(crate) struct CalculateRequest {
    #[serde(flatten)]
    pub(crate) inputs: LoanInputs,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScenarioComparisonRequest {
    pub(crate) inputs: LoanInputs,
    #[serde(default)]
    pub(crate) extra_payment_amounts: Option<Vec<f64>>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
}
