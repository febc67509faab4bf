use serde::Serialize;

/// One simulated payment period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodRecord {
    /// Period index expressed as a calendar month (biweekly periods round up).
    #[serde(rename = "month")]
    pub display_month: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub pmi: f64,
    pub balance: f64,
    pub cumulative_interest: f64,
    pub cumulative_principal: f64,
}

/// Reported when the iteration cap is reached before the balance clears.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NonConvergence {
    pub periods_simulated: u32,
    pub remaining_balance: f64,
}

/// Progress and equity figures as of the evaluation date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoffTimeline {
    pub equity_built: f64,
    pub equity_percentage: f64,
    pub progress_percentage: f64,
    pub remaining_months: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_at_payoff: Option<u32>,
    pub down_payment_percentage: f64,
    pub current_interest: f64,
    pub current_principal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    pub monthly_payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub total_payment: f64,
    pub total_interest: f64,
    pub payoff_months: u32,
    pub savings: f64,
    pub pmi_months: u32,
    #[serde(rename = "pmi_amount")]
    pub total_pmi: f64,
    pub amortization: Vec<PeriodRecord>,
    pub months_since_purchase: u32,
    pub current_balance: f64,
    pub timeline: PayoffTimeline,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_convergent: Option<NonConvergence>,
}

impl CalculationResult {
    pub fn paid_off(&self) -> bool {
        self.non_convergent.is_none()
    }

    pub fn final_balance(&self) -> f64 {
        self.amortization
            .last()
            .map(|record| record.balance)
            .unwrap_or(self.principal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioComparison {
    pub extra_payment: f64,
    pub months_saved: i64,
    pub interest_saved: f64,
    pub new_payoff_time: u32,
}
