use super::domain::{LoanInputs, PaymentFrequency};
use super::views::PeriodRecord;

/// Balances at or below this are treated as paid off.
pub(crate) const PAYOFF_TOLERANCE: f64 = 0.01;
/// Extra periods simulated past the nominal term before giving up.
pub(crate) const ITERATION_HEADROOM: u32 = 120;
/// PMI applies while balance / home value stays above this ratio.
pub(crate) const PMI_LTV_THRESHOLD: f64 = 0.8;

/// Level payment for `principal` over `periods` at `rate` per period.
pub fn annuity_payment(principal: f64, rate: f64, periods: u32) -> f64 {
    if periods == 0 {
        return principal;
    }
    if rate <= 0.0 {
        return principal / f64::from(periods);
    }

    // (1 + r)^n - 1 without cancellation, so sub-ulp rates stay finite.
    let accrued = (f64::from(periods) * rate.ln_1p()).exp_m1();
    if accrued <= 0.0 {
        return principal / f64::from(periods);
    }
    if accrued.is_infinite() {
        return principal * rate;
    }

    principal * rate * (accrued + 1.0) / accrued
}

/// Normalised loan figures shared by every simulation pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LoanTerms {
    pub principal: f64,
    pub frequency: PaymentFrequency,
    pub period_rate: f64,
    pub number_of_payments: u32,
    pub base_payment: f64,
    pub home_value: f64,
    pub monthly_pmi: f64,
}

impl LoanTerms {
    pub fn from_inputs(inputs: &LoanInputs) -> Self {
        let frequency = inputs.payment_frequency;
        let annual_rate = inputs.interest_rate / 100.0;
        let monthly_rate = annual_rate / 12.0;
        let period_rate = annual_rate / f64::from(frequency.payments_per_year());
        let number_of_payments = inputs.loan_term_years * frequency.payments_per_year();

        // Biweekly pays half the monthly annuity rather than re-amortizing over 26 periods.
        let base_payment = match frequency {
            PaymentFrequency::Monthly => {
                annuity_payment(inputs.loan_amount, monthly_rate, number_of_payments)
            }
            PaymentFrequency::Biweekly => {
                annuity_payment(inputs.loan_amount, monthly_rate, inputs.loan_term_years * 12)
                    / 2.0
            }
        };

        let monthly_pmi = if inputs.loan_to_value() > PMI_LTV_THRESHOLD {
            inputs.loan_amount * (inputs.pmi_rate_percent / 100.0) / 12.0
        } else {
            0.0
        };

        Self {
            principal: inputs.loan_amount,
            frequency,
            period_rate,
            number_of_payments,
            base_payment,
            home_value: inputs.home_value,
            monthly_pmi,
        }
    }

    pub fn iteration_cap(&self) -> u32 {
        self.number_of_payments + ITERATION_HEADROOM
    }

    /// Interest for the period and the principal the base payment covers.
    fn scheduled_split(&self, balance: f64) -> (f64, f64) {
        let interest = balance * self.period_rate;
        (interest, self.base_payment - interest)
    }

    fn pmi_for(&self, balance: f64) -> f64 {
        if balance / self.home_value > PMI_LTV_THRESHOLD {
            self.monthly_pmi
        } else {
            0.0
        }
    }
}

/// When the recurring extra payment is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExtraGate {
    /// Every period from origination.
    FromOrigination,
    /// Only periods strictly after the given one.
    AfterPeriod(u32),
    Suppressed,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ExtraPaymentPlan {
    pub per_period: f64,
    pub gate: ExtraGate,
    pub one_time: Option<(u32, f64)>,
}

impl ExtraPaymentPlan {
    pub fn from_inputs(
        inputs: &LoanInputs,
        months_since_purchase: u32,
        periods_elapsed: u32,
    ) -> Self {
        let frequency = inputs.payment_frequency;
        let gate = if !inputs.extra_payment_starts_now {
            ExtraGate::FromOrigination
        } else if months_since_purchase > 0 {
            ExtraGate::AfterPeriod(periods_elapsed)
        } else {
            ExtraGate::Suppressed
        };

        let one_time = match inputs.one_time_payment_date {
            Some(date) if inputs.one_time_payment > 0.0 => {
                let days = (date - inputs.purchase_date).num_days() as f64;
                let period = (days / frequency.period_length_days()).floor();
                (1.0..=f64::from(u32::MAX))
                    .contains(&period)
                    .then(|| (period as u32, inputs.one_time_payment))
            }
            _ => None,
        };

        Self {
            per_period: frequency.per_period_share(inputs.extra_payment),
            gate,
            one_time,
        }
    }

    fn extra_for(&self, period: u32) -> Option<f64> {
        match self.gate {
            ExtraGate::FromOrigination => Some(self.per_period),
            ExtraGate::AfterPeriod(elapsed) if period > elapsed => Some(self.per_period),
            _ => None,
        }
    }

    fn lump_sum_for(&self, period: u32) -> Option<f64> {
        self.one_time
            .filter(|(scheduled, _)| *scheduled == period)
            .map(|(_, amount)| amount)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Simulation {
    pub records: Vec<PeriodRecord>,
    pub periods: u32,
    pub total_interest: f64,
    pub total_pmi: f64,
    pub pmi_periods: u32,
    pub final_balance: f64,
}

/// Runs the full schedule until payoff or the iteration cap.
pub(crate) fn simulate(terms: &LoanTerms, plan: &ExtraPaymentPlan) -> Simulation {
    let cap = terms.iteration_cap();
    let mut records = Vec::with_capacity(terms.number_of_payments as usize);
    let mut balance = terms.principal;
    let mut period = 0;
    let mut total_interest = 0.0;
    let mut total_pmi = 0.0;
    let mut pmi_periods = 0;
    let mut cumulative_principal = 0.0;

    while balance > PAYOFF_TOLERANCE && period < cap {
        period += 1;
        let (interest, mut principal) = terms.scheduled_split(balance);

        if let Some(extra) = plan.extra_for(period) {
            principal += extra;
        }
        if let Some(lump_sum) = plan.lump_sum_for(period) {
            principal += lump_sum;
        }
        let principal = principal.min(balance).max(0.0);

        let pmi = terms.pmi_for(balance);
        if pmi > 0.0 {
            pmi_periods += 1;
        }

        balance -= principal;
        total_interest += interest;
        total_pmi += pmi;
        cumulative_principal += principal;

        records.push(PeriodRecord {
            display_month: terms.frequency.periods_to_months(period),
            payment: interest + principal,
            principal,
            interest,
            pmi,
            balance: balance.max(0.0),
            cumulative_interest: total_interest,
            cumulative_principal,
        });
    }

    Simulation {
        records,
        periods: period,
        total_interest,
        total_pmi,
        pmi_periods,
        final_balance: balance.max(0.0),
    }
}

/// Interest paid on the plain schedule: base payment only, nominal term only.
pub(crate) fn standard_interest(terms: &LoanTerms) -> f64 {
    let mut balance = terms.principal;
    let mut total_interest = 0.0;
    let mut period = 0;

    while balance > PAYOFF_TOLERANCE && period < terms.number_of_payments {
        period += 1;
        let (interest, principal) = terms.scheduled_split(balance);
        balance -= principal.min(balance).max(0.0);
        total_interest += interest;
    }

    total_interest
}

/// Balance left after `periods` base payments, with no extras applied.
pub(crate) fn balance_after(terms: &LoanTerms, periods: u32) -> f64 {
    let mut balance = terms.principal;

    for _ in 0..periods {
        if balance <= PAYOFF_TOLERANCE {
            break;
        }
        let (_, principal) = terms.scheduled_split(balance);
        balance -= principal.min(balance).max(0.0);
    }

    balance.max(0.0)
}
