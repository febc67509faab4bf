use crate::report::{render_calculation, render_comparison};
use crate::server;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use mortgage_calc::amortization::{
    parse_date, AmortizationEngine, Currency, LoanInputs, PaymentFrequency,
};
use mortgage_calc::error::AppError;
use std::io;

#[derive(Parser, Debug)]
#[command(
    name = "Mortgage Calculator",
    about = "Serve or run mortgage amortization calculations from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the payoff summary for a single loan
    Calculate(CalculateArgs),
    /// Compare payoff time and interest across extra monthly payments
    Compare(CompareArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct LoanArgs {
    /// Amount borrowed
    #[arg(long)]
    pub(crate) loan_amount: f64,
    /// Nominal annual interest rate in percent
    #[arg(long)]
    pub(crate) interest_rate: f64,
    /// Loan term in years
    #[arg(long)]
    pub(crate) loan_term: u32,
    /// Appraised home value
    #[arg(long)]
    pub(crate) home_value: f64,
    /// Purchase date (ISO-8601)
    #[arg(long, value_parser = parse_date)]
    pub(crate) purchase_date: NaiveDate,
    /// Recurring extra principal per month
    #[arg(long, default_value_t = 0.0)]
    pub(crate) extra_payment: f64,
    /// Apply the extra payment only to periods after today
    #[arg(long)]
    pub(crate) extra_payment_starts_now: bool,
    /// monthly or biweekly
    #[arg(long, default_value_t = PaymentFrequency::Monthly)]
    pub(crate) payment_frequency: PaymentFrequency,
    /// Lump sum paid once on --one-time-payment-date
    #[arg(long, default_value_t = 0.0)]
    pub(crate) one_time_payment: f64,
    #[arg(long, value_parser = parse_date)]
    pub(crate) one_time_payment_date: Option<NaiveDate>,
    /// Annual PMI in percent of the loan amount
    #[arg(long, default_value_t = 0.5)]
    pub(crate) pmi_rate: f64,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) down_payment: f64,
    #[arg(long, default_value_t = Currency::Usd)]
    pub(crate) currency: Currency,
    /// Borrower age, used to report the age at payoff
    #[arg(long)]
    pub(crate) current_age: Option<u32>,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

impl LoanArgs {
    fn into_engine(self) -> Result<AmortizationEngine, AppError> {
        let today = self.as_of.unwrap_or_else(|| Local::now().date_naive());
        let inputs = LoanInputs {
            extra_payment: self.extra_payment,
            extra_payment_starts_now: self.extra_payment_starts_now,
            payment_frequency: self.payment_frequency,
            one_time_payment: self.one_time_payment,
            one_time_payment_date: self.one_time_payment_date,
            pmi_rate_percent: self.pmi_rate,
            down_payment: self.down_payment,
            currency: self.currency,
            current_age: self.current_age,
            ..LoanInputs::new(
                self.loan_amount,
                self.interest_rate,
                self.loan_term,
                self.home_value,
                self.purchase_date,
            )
        };

        Ok(AmortizationEngine::new(inputs, today)?)
    }
}

#[derive(Args, Debug)]
pub(crate) struct CalculateArgs {
    #[command(flatten)]
    pub(crate) loan: LoanArgs,
    /// Print the full payment schedule after the summary
    #[arg(long)]
    pub(crate) schedule: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    #[command(flatten)]
    pub(crate) loan: LoanArgs,
    /// Extra monthly payments to compare (defaults to 50,100,200,500)
    #[arg(long, value_delimiter = ',')]
    pub(crate) amounts: Vec<f64>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Calculate(args) => {
            let engine = args.loan.into_engine()?;
            render_calculation(&mut io::stdout().lock(), &engine, args.schedule)?;
            Ok(())
        }
        Command::Compare(args) => {
            let engine = args.loan.into_engine()?;
            let comparisons = engine.compare_scenarios(&args.amounts)?;
            render_comparison(&mut io::stdout().lock(), &engine, &comparisons)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("mortgage-calc-api").chain(args.iter().copied()))
            .expect("arguments parse")
    }

    const LOAN: [&str; 10] = [
        "--loan-amount",
        "300000",
        "--interest-rate",
        "6",
        "--loan-term",
        "30",
        "--home-value",
        "375000",
        "--purchase-date",
        "2024-01-01",
    ];

    #[test]
    fn serve_is_the_default_command() {
        assert!(parse(&[]).command.is_none());
    }

    #[test]
    fn calculate_reads_loan_flags() {
        let mut args = vec!["calculate"];
        args.extend(LOAN);
        args.extend(["--payment-frequency", "biweekly", "--currency", "eur"]);

        let Some(Command::Calculate(calculate)) = parse(&args).command else {
            panic!("expected calculate command");
        };
        assert_eq!(calculate.loan.payment_frequency, PaymentFrequency::Biweekly);
        assert_eq!(calculate.loan.currency, Currency::Eur);
        assert_eq!(calculate.loan.pmi_rate, 0.5);
        assert!(!calculate.schedule);

        let engine = calculate.loan.into_engine().expect("valid loan");
        assert_eq!(engine.inputs().loan_term_years, 30);
    }

    #[test]
    fn compare_splits_amount_lists() {
        let mut args = vec!["compare"];
        args.extend(LOAN);
        args.extend(["--amounts", "25,75.5", "--as-of", "2024-06-01"]);

        let Some(Command::Compare(compare)) = parse(&args).command else {
            panic!("expected compare command");
        };
        assert_eq!(compare.amounts, vec![25.0, 75.5]);
        assert_eq!(compare.loan.as_of, NaiveDate::from_ymd_opt(2024, 6, 1));
    }

    #[test]
    fn invalid_loans_fail_before_rendering() {
        let mut args = vec!["calculate"];
        args.extend(LOAN);
        args.push("--down-payment=-10");

        let Some(Command::Calculate(calculate)) = parse(&args).command else {
            panic!("expected calculate command");
        };
        let err = calculate.loan.into_engine().expect_err("negative down payment");
        assert!(err.to_string().contains("down_payment"));
    }
}
