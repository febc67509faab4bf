use super::domain::LoanInputs;
use super::schedule::PAYOFF_TOLERANCE;
use super::views::PayoffTimeline;

pub(crate) fn build_timeline(
    inputs: &LoanInputs,
    monthly_payment: f64,
    payoff_months: u32,
    months_since_purchase: u32,
    current_balance: f64,
) -> PayoffTimeline {
    let equity_built = inputs.loan_amount - current_balance;
    let equity_percentage = equity_built / inputs.loan_amount * 100.0;

    let progress_percentage = if payoff_months == 0 {
        0.0
    } else {
        (f64::from(months_since_purchase) / f64::from(payoff_months) * 100.0).min(100.0)
    };
    let remaining_months = payoff_months.saturating_sub(months_since_purchase);
    let age_at_payoff = inputs
        .current_age
        .map(|age| age.saturating_add(remaining_months / 12));

    let down_payment_percentage = inputs.down_payment / inputs.home_value * 100.0;

    // Allocation of one monthly payment at today's balance, always at the monthly rate.
    let (current_interest, current_principal) = if current_balance <= PAYOFF_TOLERANCE {
        (0.0, 0.0)
    } else {
        let interest = current_balance * inputs.interest_rate / 100.0 / 12.0;
        let principal = (monthly_payment - interest).max(0.0).min(current_balance);
        (interest, principal)
    };

    PayoffTimeline {
        equity_built,
        equity_percentage,
        progress_percentage,
        remaining_months,
        age_at_payoff,
        down_payment_percentage,
        current_interest,
        current_principal,
    }
}
