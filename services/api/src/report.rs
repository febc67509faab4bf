use mortgage_calc::amortization::{AmortizationEngine, Currency, ScenarioComparison};
use std::io::{self, Write};

pub(crate) fn render_calculation(
    out: &mut impl Write,
    engine: &AmortizationEngine,
    include_schedule: bool,
) -> io::Result<()> {
    let inputs = engine.inputs();
    let result = engine.calculate();
    let currency = inputs.currency;

    writeln!(
        out,
        "Mortgage summary ({} payments, {})",
        inputs.payment_frequency,
        currency.name()
    )?;
    writeln!(
        out,
        "- Loan {} at {:.3}% over {} years | home value {} ({:.1}% LTV)",
        format_money(currency, inputs.loan_amount),
        inputs.interest_rate,
        inputs.loan_term_years,
        format_money(currency, inputs.home_value),
        inputs.loan_to_value() * 100.0
    )?;
    writeln!(
        out,
        "- Monthly payment {} | total interest {} | total paid {}",
        format_money(currency, result.monthly_payment),
        format_money(currency, result.total_interest),
        format_money(currency, result.total_payment)
    )?;
    writeln!(
        out,
        "- Payoff in {} months ({} years {} months)",
        result.payoff_months,
        result.payoff_months / 12,
        result.payoff_months % 12
    )?;
    if result.savings > 0.0 {
        writeln!(
            out,
            "- Extra payments save {} in interest",
            format_money(currency, result.savings)
        )?;
    }
    if result.pmi_months > 0 {
        writeln!(
            out,
            "- PMI charged for {} months, {} in total",
            result.pmi_months,
            format_money(currency, result.total_pmi)
        )?;
    }
    if let Some(stall) = &result.non_convergent {
        writeln!(
            out,
            "- Not paid off after {} payments; {} still owed",
            stall.periods_simulated,
            format_money(currency, stall.remaining_balance)
        )?;
    }

    let timeline = &result.timeline;
    writeln!(
        out,
        "As of {}: {} months in, balance {} | equity {} ({:.1}%) | {:.1}% of the way to payoff",
        engine.today(),
        result.months_since_purchase,
        format_money(currency, result.current_balance),
        format_money(currency, timeline.equity_built),
        timeline.equity_percentage,
        timeline.progress_percentage
    )?;
    match timeline.age_at_payoff {
        Some(age) => writeln!(
            out,
            "- {} months remaining, paid off at age {}",
            timeline.remaining_months, age
        )?,
        None => writeln!(out, "- {} months remaining", timeline.remaining_months)?,
    }

    if include_schedule {
        writeln!(out, "\nMonth | Payment | Principal | Interest | PMI | Balance")?;
        for record in &result.amortization {
            writeln!(
                out,
                "{:>5} | {} | {} | {} | {} | {}",
                record.display_month,
                format_money(currency, record.payment),
                format_money(currency, record.principal),
                format_money(currency, record.interest),
                format_money(currency, record.pmi),
                format_money(currency, record.balance)
            )?;
        }
    }

    Ok(())
}

pub(crate) fn render_comparison(
    out: &mut impl Write,
    engine: &AmortizationEngine,
    comparisons: &[ScenarioComparison],
) -> io::Result<()> {
    let currency = engine.inputs().currency;
    writeln!(out, "Extra payment scenarios")?;
    for comparison in comparisons {
        writeln!(
            out,
            "- +{}/month: payoff in {} months | {} months sooner | {} interest saved",
            format_money(currency, comparison.extra_payment),
            comparison.new_payoff_time,
            comparison.months_saved,
            format_money(currency, comparison.interest_saved)
        )?;
    }
    Ok(())
}

/// Currency amount with the symbol prefixed and thousands grouped.
pub(crate) fn format_money(currency: Currency, amount: f64) -> String {
    let cents = format!("{:.2}", amount.abs());
    let (whole, fraction) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{sign}{}{grouped}.{fraction}", currency.symbol())
}
