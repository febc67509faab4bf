//! Behavioral specifications for the amortization engine, exercised through the public
//! crate API only.

use chrono::{Duration, NaiveDate};
use mortgage_calc::amortization::{
    annuity_payment, AmortizationEngine, CalculationError, CalculationResult, LoanInputs,
    PaymentFrequency, DEFAULT_SCENARIO_AMOUNTS,
};

fn purchase_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid purchase date")
}

fn reference_loan() -> LoanInputs {
    LoanInputs::new(300_000.0, 6.0, 30, 375_000.0, purchase_date())
}

fn calculate(inputs: LoanInputs, today: NaiveDate) -> CalculationResult {
    AmortizationEngine::new(inputs, today)
        .expect("inputs are valid")
        .calculate()
        .clone()
}

fn assert_close(actual: f64, expected: f64, tolerance: f64, label: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{label}: expected {expected} ± {tolerance}, got {actual}"
    );
}

#[test]
fn reference_thirty_year_loan_matches_pinned_figures() {
    let result = calculate(reference_loan(), purchase_date());

    assert_close(result.monthly_payment, 1_798.65, 0.01, "monthly payment");
    assert_eq!(result.payoff_months, 360);
    assert_close(result.total_interest, 347_514.57, 1.0, "total interest");
    assert_eq!(result.amortization.len(), 360);
    assert_eq!(result.months_since_purchase, 0);
    assert_eq!(result.current_balance, 300_000.0);
    // LTV of exactly 0.8 does not require PMI.
    assert_eq!(result.pmi_months, 0);
    assert_eq!(result.total_pmi, 0.0);
    assert!(result.paid_off());
    assert_eq!(result.interest, result.total_interest);
}

#[test]
fn totals_satisfy_the_accumulation_identity() {
    let mut with_extras = reference_loan();
    with_extras.extra_payment = 275.0;
    with_extras.one_time_payment = 12_000.0;
    with_extras.one_time_payment_date = Some(purchase_date() + Duration::days(400));

    for inputs in [reference_loan(), with_extras] {
        let result = calculate(inputs, purchase_date());
        assert_eq!(result.total_interest + result.principal, result.total_payment);

        let last = result.amortization.last().expect("schedule is not empty");
        assert_close(last.cumulative_interest, result.total_interest, 1e-6, "cumulative interest");
        assert_close(last.cumulative_principal, result.principal, 0.011, "cumulative principal");
    }
}

#[test]
fn balances_never_increase_and_end_at_payoff() {
    let mut biweekly = reference_loan();
    biweekly.payment_frequency = PaymentFrequency::Biweekly;
    biweekly.extra_payment = 120.0;

    let mut high_ltv = reference_loan();
    high_ltv.loan_amount = 320_000.0;
    high_ltv.home_value = 325_000.0;
    high_ltv.loan_term_years = 15;

    let mut zero_rate = reference_loan();
    zero_rate.interest_rate = 0.0;

    for inputs in [reference_loan(), biweekly, high_ltv, zero_rate] {
        let result = calculate(inputs, purchase_date());
        let mut previous = result.principal;
        for record in &result.amortization {
            assert!(record.balance >= 0.0);
            assert!(
                record.balance <= previous,
                "balance rose in month {}",
                record.display_month
            );
            previous = record.balance;
        }
        assert!(result.final_balance() <= 0.01);
    }
}

#[test]
fn savings_are_zero_without_extra_payments() {
    let result = calculate(reference_loan(), purchase_date());
    assert_eq!(result.savings, 0.0);

    let mut biweekly = reference_loan();
    biweekly.payment_frequency = PaymentFrequency::Biweekly;
    let result = calculate(biweekly, purchase_date());
    assert_eq!(result.savings, 0.0);
}

#[test]
fn extra_payments_produce_positive_savings() {
    let mut recurring = reference_loan();
    recurring.extra_payment = 200.0;
    let recurring = calculate(recurring, purchase_date());
    assert!(recurring.savings > 0.0);
    assert_eq!(recurring.payoff_months, 279);

    let mut lump_sum = reference_loan();
    lump_sum.one_time_payment = 25_000.0;
    lump_sum.one_time_payment_date = Some(purchase_date() + Duration::days(731));
    let lump_sum = calculate(lump_sum, purchase_date());
    assert!(lump_sum.savings > 0.0);
    assert!(lump_sum.payoff_months < 360);
}

#[test]
fn biweekly_payment_is_half_the_monthly_annuity() {
    let monthly = calculate(reference_loan(), purchase_date());

    let mut biweekly_inputs = reference_loan();
    biweekly_inputs.payment_frequency = PaymentFrequency::Biweekly;
    let biweekly = calculate(biweekly_inputs, purchase_date());

    let half_annuity = annuity_payment(300_000.0, 0.06 / 12.0, 360) / 2.0;
    assert_eq!(biweekly.monthly_payment, half_annuity * 26.0 / 12.0);
    assert_eq!(biweekly.monthly_payment, monthly.monthly_payment / 2.0 * 26.0 / 12.0);
    assert_close(biweekly.amortization[0].payment, half_annuity, 1e-9, "first payment");

    // 638 biweekly periods round up to 295 calendar months.
    assert_eq!(biweekly.payoff_months, 295);
    assert_eq!(biweekly.amortization.last().map(|r| r.display_month), Some(295));
    assert_eq!(biweekly.amortization.len(), 638);
}

#[test]
fn pmi_stops_once_balance_drops_to_eighty_percent_of_value() {
    let mut inputs = reference_loan();
    inputs.loan_amount = 320_000.0;
    inputs.home_value = 325_000.0;

    let result = calculate(inputs, purchase_date());
    let monthly_pmi = 320_000.0 * 0.005 / 12.0;

    assert_eq!(result.pmi_months, 134);
    assert_close(result.total_pmi, monthly_pmi * 134.0, 1e-6, "total pmi");

    let mut opening_balance = result.principal;
    let mut pmi_ended = false;
    for record in &result.amortization {
        let charged = record.pmi > 0.0;
        assert_eq!(charged, opening_balance / 325_000.0 > 0.8);
        if charged {
            assert!(!pmi_ended, "pmi restarted in month {}", record.display_month);
            assert_eq!(record.pmi, monthly_pmi);
        } else {
            pmi_ended = true;
        }
        opening_balance = record.balance;
    }
    assert!(pmi_ended);
}

#[test]
fn biweekly_pmi_months_are_reported_in_calendar_months() {
    let mut inputs = reference_loan();
    inputs.loan_amount = 320_000.0;
    inputs.home_value = 325_000.0;
    inputs.payment_frequency = PaymentFrequency::Biweekly;

    let result = calculate(inputs, purchase_date());
    let charged_periods = result
        .amortization
        .iter()
        .filter(|record| record.pmi > 0.0)
        .count() as u32;

    assert!(charged_periods > 0);
    assert_eq!(result.pmi_months, (charged_periods * 12).div_ceil(26));
}

#[test]
fn one_time_payment_lands_in_its_biweekly_period_only() {
    let lump_sum = 10_000.0;
    let mut baseline = reference_loan();
    baseline.payment_frequency = PaymentFrequency::Biweekly;
    let mut with_lump_sum = baseline.clone();
    with_lump_sum.one_time_payment = lump_sum;
    with_lump_sum.one_time_payment_date = Some(purchase_date() + Duration::days(14 * 10));

    let baseline = calculate(baseline, purchase_date());
    let result = calculate(with_lump_sum, purchase_date());

    for (index, (plain, boosted)) in baseline
        .amortization
        .iter()
        .zip(&result.amortization)
        .take(9)
        .enumerate()
    {
        assert_eq!(plain, boosted, "period {} should be untouched", index + 1);
    }

    let tenth = &result.amortization[9];
    let plain_tenth = &baseline.amortization[9];
    assert_close(tenth.principal - plain_tenth.principal, lump_sum, 1e-6, "lump sum");
    assert_close(plain_tenth.balance - tenth.balance, lump_sum, 1e-6, "balance drop");
    assert_close(tenth.payment - plain_tenth.payment, lump_sum, 1e-6, "payment");

    let base_payment = result.amortization[0].payment;
    for record in result.amortization.iter().skip(10).take(100) {
        assert_close(record.payment, base_payment, 1e-6, "regular payment");
    }
}

#[test]
fn one_time_payment_uses_average_month_length_for_monthly_loans() {
    let mut inputs = reference_loan();
    inputs.one_time_payment = 5_000.0;
    // 366 / 30.44 floors to period 12; 365 would land in period 11.
    inputs.one_time_payment_date = Some(purchase_date() + Duration::days(366));

    let result = calculate(inputs, purchase_date());
    let regular = result.amortization[0].payment;
    let boosted: Vec<u32> = result
        .amortization
        .iter()
        .filter(|record| record.payment > regular + 1.0)
        .map(|record| record.display_month)
        .collect();
    assert_eq!(boosted, vec![12]);
}

#[test]
fn one_time_payment_without_date_has_no_effect() {
    let mut inputs = reference_loan();
    inputs.one_time_payment = 50_000.0;

    let result = calculate(inputs, purchase_date());
    assert_eq!(result, calculate(reference_loan(), purchase_date()));
}

#[test]
fn extra_payment_starting_now_waits_for_elapsed_periods() {
    let purchase = NaiveDate::from_ymd_opt(2022, 1, 15).expect("valid date");
    let today = NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid date");

    let mut inputs = LoanInputs::new(300_000.0, 6.0, 30, 375_000.0, purchase);
    inputs.extra_payment = 250.0;
    inputs.extra_payment_starts_now = true;

    let result = calculate(inputs.clone(), today);
    assert_eq!(result.months_since_purchase, 24);

    let regular = result.amortization[0].payment;
    for record in &result.amortization[..24] {
        assert_close(record.payment, regular, 1e-6, "pre-extra payment");
    }
    assert_close(result.amortization[24].payment, regular + 250.0, 1e-6, "first extra");

    inputs.extra_payment_starts_now = false;
    let retroactive = calculate(inputs, today);
    assert_close(retroactive.amortization[0].payment, regular + 250.0, 1e-6, "from origination");
    assert!(retroactive.payoff_months < result.payoff_months);
}

#[test]
fn extra_payment_starting_now_is_ignored_on_a_brand_new_loan() {
    let mut inputs = reference_loan();
    inputs.extra_payment = 400.0;
    inputs.extra_payment_starts_now = true;

    let result = calculate(inputs, purchase_date());
    assert_eq!(result.payoff_months, 360);
    assert_eq!(result.savings, 0.0);
}

#[test]
fn current_balance_replays_base_payments_since_purchase() {
    let purchase = NaiveDate::from_ymd_opt(2020, 3, 28).expect("valid date");
    let today = NaiveDate::from_ymd_opt(2020, 9, 1).expect("valid date");

    let mut inputs = LoanInputs::new(300_000.0, 6.0, 30, 375_000.0, purchase);
    inputs.payment_frequency = PaymentFrequency::Biweekly;
    inputs.extra_payment = 300.0;

    let result = calculate(inputs.clone(), today);
    assert_eq!(result.months_since_purchase, 6);

    // Six months is thirteen biweekly periods of base payments only.
    inputs.extra_payment = 0.0;
    let plain = calculate(inputs, today);
    assert_close(result.current_balance, plain.amortization[12].balance, 1e-6, "balance");
    assert_eq!(result.current_balance, plain.current_balance);
}

#[test]
fn zero_interest_loans_amortize_linearly() {
    let inputs = LoanInputs::new(120_000.0, 0.0, 10, 200_000.0, purchase_date());
    let result = calculate(inputs, purchase_date());

    assert_eq!(result.monthly_payment, 1_000.0);
    assert_eq!(result.total_interest, 0.0);
    assert_eq!(result.payoff_months, 120);
}

#[test]
fn vanishingly_small_rates_still_amortize_over_the_term() {
    let inputs = LoanInputs::new(300_000.0, 1e-14, 30, 375_000.0, purchase_date());
    let result = calculate(inputs, purchase_date());

    assert!(result.monthly_payment.is_finite());
    assert_close(result.monthly_payment, 300_000.0 / 360.0, 1e-6, "monthly payment");
    assert_eq!(result.payoff_months, 360);

    let json = serde_json::to_value(&result).expect("result serializes");
    assert!(json["monthly_payment"].is_f64());
}

#[test]
fn oversized_amounts_are_rejected_instead_of_overflowing() {
    let inputs = LoanInputs::new(1e308, 6.0, 30, 1e308, purchase_date());
    let err = AmortizationEngine::new(inputs, purchase_date()).expect_err("amount too large");
    assert!(matches!(
        err,
        CalculationError::TooLarge {
            field: "loan_amount",
            ..
        }
    ));
}

#[test]
fn comparing_zero_extra_payment_saves_nothing() {
    let engine = AmortizationEngine::new(reference_loan(), purchase_date()).expect("valid");
    let comparisons = engine.compare_scenarios(&[0.0]).expect("comparison runs");

    assert_eq!(comparisons.len(), 1);
    assert_eq!(comparisons[0].months_saved, 0);
    assert_eq!(comparisons[0].interest_saved, 0.0);
    assert_eq!(comparisons[0].new_payoff_time, 360);
}

#[test]
fn default_scenarios_rank_larger_payments_faster() {
    let mut inputs = reference_loan();
    // The engine's own extra payment is replaced in every scenario.
    inputs.extra_payment = 75.0;
    let engine = AmortizationEngine::new(inputs, purchase_date()).expect("valid");

    let comparisons = engine.compare_scenarios(&[]).expect("comparison runs");
    let amounts: Vec<f64> = comparisons.iter().map(|c| c.extra_payment).collect();
    assert_eq!(amounts, DEFAULT_SCENARIO_AMOUNTS.to_vec());

    let payoffs: Vec<u32> = comparisons.iter().map(|c| c.new_payoff_time).collect();
    assert_eq!(payoffs, vec![335, 313, 279, 212]);

    for comparison in &comparisons {
        assert_eq!(comparison.months_saved, 360 - i64::from(comparison.new_payoff_time));
        assert!(comparison.interest_saved > 0.0);
    }
    assert!(comparisons
        .windows(2)
        .all(|pair| pair[0].interest_saved < pair[1].interest_saved));
}

#[test]
fn scenario_amounts_keep_caller_order() {
    let engine = AmortizationEngine::new(reference_loan(), purchase_date()).expect("valid");
    let comparisons = engine
        .compare_scenarios(&[500.0, 50.0])
        .expect("comparison runs");
    assert_eq!(comparisons[0].new_payoff_time, 212);
    assert_eq!(comparisons[1].new_payoff_time, 335);
}

#[test]
fn invalid_inputs_are_rejected_before_simulation() {
    let mut inputs = reference_loan();
    inputs.loan_term_years = 0;
    let err = AmortizationEngine::new(inputs, purchase_date()).expect_err("zero term");
    assert_eq!(err, CalculationError::NonPositive { field: "loan_term" });

    let mut inputs = reference_loan();
    inputs.interest_rate = -0.5;
    let err = AmortizationEngine::new(inputs, purchase_date()).expect_err("negative rate");
    assert_eq!(
        err,
        CalculationError::Negative {
            field: "interest_rate"
        }
    );
}

#[test]
fn calculate_is_idempotent() {
    let mut inputs = reference_loan();
    inputs.extra_payment = 90.0;
    inputs.current_age = Some(41);
    let engine = AmortizationEngine::new(inputs.clone(), purchase_date()).expect("valid");

    let first = engine.calculate();
    let second = engine.calculate();
    assert!(std::ptr::eq(first, second));
    assert_eq!(first, &calculate(inputs, purchase_date()));
    assert_eq!(first.timeline.age_at_payoff, Some(41 + first.payoff_months / 12));
}
