use super::dates::whole_months_between;
use super::domain::{CalculationError, LoanInputs};
use super::schedule::{self, ExtraPaymentPlan, LoanTerms, PAYOFF_TOLERANCE};
use super::timeline::build_timeline;
use super::views::{CalculationResult, NonConvergence, ScenarioComparison};
use chrono::NaiveDate;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Extra payments compared when the caller does not supply any.
pub const DEFAULT_SCENARIO_AMOUNTS: [f64; 4] = [50.0, 100.0, 200.0, 500.0];
/// Upper bound on amounts accepted by a single comparison.
pub const MAX_SCENARIO_AMOUNTS: usize = 25;

/// Amortization calculator for one validated set of loan inputs.
///
/// `today` anchors the elapsed-time figures (months since purchase, current
/// balance and the "starts now" extra-payment gate). The full result is computed
/// on first use and reused afterwards.
#[derive(Debug)]
pub struct AmortizationEngine {
    inputs: LoanInputs,
    today: NaiveDate,
    result: OnceLock<CalculationResult>,
}

impl AmortizationEngine {
    pub fn new(inputs: LoanInputs, today: NaiveDate) -> Result<Self, CalculationError> {
        inputs.validate()?;
        Ok(Self {
            inputs,
            today,
            result: OnceLock::new(),
        })
    }

    pub fn inputs(&self) -> &LoanInputs {
        &self.inputs
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn calculate(&self) -> &CalculationResult {
        self.result.get_or_init(|| self.compute())
    }

    /// Consumes the engine, reusing the memoized result when there is one.
    pub fn into_result(mut self) -> CalculationResult {
        match self.result.take() {
            Some(result) => result,
            None => self.compute(),
        }
    }

    /// Compares payoff time and interest against a no-extra-payment baseline
    /// for each candidate amount, in the order given.
    pub fn compare_scenarios(
        &self,
        extra_amounts: &[f64],
    ) -> Result<Vec<ScenarioComparison>, CalculationError> {
        let amounts = if extra_amounts.is_empty() {
            &DEFAULT_SCENARIO_AMOUNTS[..]
        } else {
            extra_amounts
        };

        if amounts.len() > MAX_SCENARIO_AMOUNTS {
            return Err(CalculationError::TooManyScenarios {
                count: amounts.len(),
                max: MAX_SCENARIO_AMOUNTS,
            });
        }
        if amounts.iter().any(|amount| !amount.is_finite()) {
            return Err(CalculationError::NotFinite {
                field: "extra_payment_amounts",
            });
        }
        if amounts.iter().any(|amount| *amount < 0.0) {
            return Err(CalculationError::Negative {
                field: "extra_payment_amounts",
            });
        }

        let baseline = Self::new(self.inputs.with_extra_payment(0.0), self.today)?;
        let baseline = baseline.calculate();

        amounts
            .iter()
            .map(|&amount| -> Result<ScenarioComparison, CalculationError> {
                let scenario = Self::new(self.inputs.with_extra_payment(amount), self.today)?;
                let scenario = scenario.calculate();

                Ok(ScenarioComparison {
                    extra_payment: amount,
                    months_saved: i64::from(baseline.payoff_months)
                        - i64::from(scenario.payoff_months),
                    interest_saved: baseline.total_interest - scenario.total_interest,
                    new_payoff_time: scenario.payoff_months,
                })
            })
            .collect()
    }

    fn months_since_purchase(&self) -> u32 {
        let months = whole_months_between(self.inputs.purchase_date, self.today).max(0);
        u32::try_from(months).unwrap_or(u32::MAX)
    }

    fn compute(&self) -> CalculationResult {
        self.compute_with(LoanTerms::from_inputs(&self.inputs))
    }

    /// Validated inputs always amortize within the nominal term, so the
    /// `non_convergent` branch only fires for terms whose base payment cannot
    /// cover the interest.
    fn compute_with(&self, terms: LoanTerms) -> CalculationResult {
        let inputs = &self.inputs;
        let frequency = inputs.payment_frequency;

        let months_since_purchase = self.months_since_purchase();
        let periods_elapsed = frequency.months_to_periods(months_since_purchase);
        let plan = ExtraPaymentPlan::from_inputs(inputs, months_since_purchase, periods_elapsed);

        let simulation = schedule::simulate(&terms, &plan);
        let standard_interest = schedule::standard_interest(&terms);
        let current_balance = if months_since_purchase == 0 {
            inputs.loan_amount
        } else {
            schedule::balance_after(&terms, periods_elapsed)
        };

        let payoff_months = frequency.periods_to_months(simulation.periods);
        let monthly_payment = frequency.monthly_equivalent(terms.base_payment);
        let total_interest = simulation.total_interest;

        let non_convergent = if simulation.final_balance > PAYOFF_TOLERANCE {
            warn!(
                periods = simulation.periods,
                remaining_balance = simulation.final_balance,
                "amortization stopped at the iteration cap before payoff"
            );
            Some(NonConvergence {
                periods_simulated: simulation.periods,
                remaining_balance: simulation.final_balance,
            })
        } else {
            None
        };

        let timeline = build_timeline(
            inputs,
            monthly_payment,
            payoff_months,
            months_since_purchase,
            current_balance,
        );

        debug!(
            payoff_months,
            months_since_purchase,
            frequency = frequency.label(),
            "amortization schedule computed"
        );

        CalculationResult {
            monthly_payment,
            principal: inputs.loan_amount,
            interest: total_interest,
            total_payment: inputs.loan_amount + total_interest,
            total_interest,
            payoff_months,
            savings: standard_interest - total_interest,
            pmi_months: frequency.periods_to_months(simulation.pmi_periods),
            total_pmi: simulation.total_pmi,
            amortization: simulation.records,
            months_since_purchase,
            current_balance,
            timeline,
            non_convergent,
        }
    }
}
