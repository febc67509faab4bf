use super::dates::{deserialize_date, deserialize_optional_date};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest loan term accepted, in years.
pub const MAX_TERM_YEARS: u32 = 50;
/// Highest nominal annual rate accepted, in percent.
pub const MAX_INTEREST_RATE: f64 = 100.0;
/// Largest currency amount accepted for any single input.
pub const MAX_AMOUNT: f64 = 1e12;
/// Highest annual PMI rate accepted, in percent.
pub const MAX_PMI_RATE: f64 = 100.0;

const DEFAULT_PMI_RATE: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    Biweekly,
}

impl PaymentFrequency {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Biweekly => "biweekly",
        }
    }

    pub const fn payments_per_year(self) -> u32 {
        match self {
            Self::Monthly => 12,
            Self::Biweekly => 26,
        }
    }

    /// Nominal length of one period, used to place dated lump sums.
    pub const fn period_length_days(self) -> f64 {
        match self {
            Self::Monthly => 30.44,
            Self::Biweekly => 14.0,
        }
    }

    /// Calendar months covered by `periods` payments, rounded up.
    pub const fn periods_to_months(self, periods: u32) -> u32 {
        match self {
            Self::Monthly => periods,
            Self::Biweekly => (periods * 12).div_ceil(26),
        }
    }

    /// Whole payment periods that fit in `months` calendar months.
    pub const fn months_to_periods(self, months: u32) -> u32 {
        match self {
            Self::Monthly => months,
            Self::Biweekly => months * 26 / 12,
        }
    }

    /// Expresses a per-period amount as its monthly equivalent.
    pub fn monthly_equivalent(self, per_period: f64) -> f64 {
        match self {
            Self::Monthly => per_period,
            Self::Biweekly => per_period * 26.0 / 12.0,
        }
    }

    /// Splits a monthly amount across this frequency's periods.
    pub fn per_period_share(self, monthly: f64) -> f64 {
        match self {
            Self::Monthly => monthly,
            Self::Biweekly => monthly / 2.0,
        }
    }
}

impl FromStr for PaymentFrequency {
    type Err = CalculationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "biweekly" => Ok(Self::Biweekly),
            _ => Err(CalculationError::UnsupportedValue {
                field: "payment_frequency",
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Cad,
    Aud,
}

impl Currency {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Cad => "CAD",
            Self::Aud => "AUD",
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Eur => "€",
            Self::Gbp => "£",
            Self::Cad => "C$",
            Self::Aud => "A$",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Usd => "US Dollar",
            Self::Eur => "Euro",
            Self::Gbp => "British Pound",
            Self::Cad => "Canadian Dollar",
            Self::Aud => "Australian Dollar",
        }
    }
}

impl FromStr for Currency {
    type Err = CalculationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            "CAD" => Ok(Self::Cad),
            "AUD" => Ok(Self::Aud),
            _ => Err(CalculationError::UnsupportedValue {
                field: "currency",
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Loan parameters for a single calculation.
///
/// Dates arrive as ISO-8601 strings and are normalised to calendar dates while
/// deserializing, so the engine never sees time-of-day information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInputs {
    pub loan_amount: f64,
    /// Nominal annual rate in percent (6.5 means 6.5%).
    pub interest_rate: f64,
    #[serde(rename = "loan_term", alias = "loan_term_years")]
    pub loan_term_years: u32,
    /// Recurring extra principal per month.
    #[serde(default)]
    pub extra_payment: f64,
    #[serde(default)]
    pub extra_payment_starts_now: bool,
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
    #[serde(default)]
    pub one_time_payment: f64,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub one_time_payment_date: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_date")]
    pub purchase_date: NaiveDate,
    pub home_value: f64,
    /// Annual PMI in percent of the original loan amount.
    #[serde(rename = "pmi_rate", default = "default_pmi_rate")]
    pub pmi_rate_percent: f64,
    #[serde(default)]
    pub down_payment: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_age: Option<u32>,
}

fn default_pmi_rate() -> f64 {
    DEFAULT_PMI_RATE
}

impl LoanInputs {
    /// Minimal loan description; every optional knob takes its default.
    pub fn new(
        loan_amount: f64,
        interest_rate: f64,
        loan_term_years: u32,
        home_value: f64,
        purchase_date: NaiveDate,
    ) -> Self {
        Self {
            loan_amount,
            interest_rate,
            loan_term_years,
            extra_payment: 0.0,
            extra_payment_starts_now: false,
            payment_frequency: PaymentFrequency::Monthly,
            one_time_payment: 0.0,
            one_time_payment_date: None,
            purchase_date,
            home_value,
            pmi_rate_percent: DEFAULT_PMI_RATE,
            down_payment: 0.0,
            currency: Currency::Usd,
            current_age: None,
        }
    }

    /// Copy of these inputs with a different recurring extra payment.
    pub fn with_extra_payment(&self, extra_payment: f64) -> Self {
        Self {
            extra_payment,
            ..self.clone()
        }
    }

    pub fn loan_to_value(&self) -> f64 {
        self.loan_amount / self.home_value
    }

    /// Rejects out-of-domain parameters before any simulation runs.
    pub fn validate(&self) -> Result<(), CalculationError> {
        let amounts = [
            ("loan_amount", self.loan_amount),
            ("interest_rate", self.interest_rate),
            ("extra_payment", self.extra_payment),
            ("one_time_payment", self.one_time_payment),
            ("home_value", self.home_value),
            ("pmi_rate", self.pmi_rate_percent),
            ("down_payment", self.down_payment),
        ];
        if let Some(&(field, _)) = amounts.iter().find(|(_, value)| !value.is_finite()) {
            return Err(CalculationError::NotFinite { field });
        }

        if self.loan_amount <= 0.0 {
            return Err(CalculationError::NonPositive {
                field: "loan_amount",
            });
        }
        if self.home_value <= 0.0 {
            return Err(CalculationError::NonPositive {
                field: "home_value",
            });
        }
        if self.loan_term_years == 0 {
            return Err(CalculationError::NonPositive { field: "loan_term" });
        }
        if self.loan_term_years > MAX_TERM_YEARS {
            return Err(CalculationError::TermTooLong {
                years: self.loan_term_years,
                max: MAX_TERM_YEARS,
            });
        }
        if self.interest_rate > MAX_INTEREST_RATE {
            return Err(CalculationError::RateTooHigh {
                rate: self.interest_rate,
                max: MAX_INTEREST_RATE,
            });
        }

        let bounded = [
            ("loan_amount", self.loan_amount, MAX_AMOUNT),
            ("home_value", self.home_value, MAX_AMOUNT),
            ("extra_payment", self.extra_payment, MAX_AMOUNT),
            ("one_time_payment", self.one_time_payment, MAX_AMOUNT),
            ("down_payment", self.down_payment, MAX_AMOUNT),
            ("pmi_rate", self.pmi_rate_percent, MAX_PMI_RATE),
        ];
        if let Some(&(field, _, max)) = bounded.iter().find(|(_, value, max)| value > max) {
            return Err(CalculationError::TooLarge { field, max });
        }

        let non_negative = [
            ("interest_rate", self.interest_rate),
            ("extra_payment", self.extra_payment),
            ("one_time_payment", self.one_time_payment),
            ("pmi_rate", self.pmi_rate_percent),
            ("down_payment", self.down_payment),
        ];
        if let Some(&(field, _)) = non_negative.iter().find(|(_, value)| *value < 0.0) {
            return Err(CalculationError::Negative { field });
        }

        Ok(())
    }
}

/// Input rejected before the simulation starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalculationError {
    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },
    #[error("{field} must not be negative")]
    Negative { field: &'static str },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("loan term of {years} years exceeds the supported maximum of {max}")]
    TermTooLong { years: u32, max: u32 },
    #[error("interest rate of {rate}% exceeds the supported maximum of {max}%")]
    RateTooHigh { rate: f64, max: f64 },
    #[error("{field} exceeds the supported maximum of {max}")]
    TooLarge { field: &'static str, max: f64 },
    #[error("{count} scenario amounts requested; at most {max} are supported")]
    TooManyScenarios { count: usize, max: usize },
    #[error("unsupported {field} '{value}'")]
    UnsupportedValue { field: &'static str, value: String },
}
