//! Mortgage amortization: schedule simulation, PMI tracking and extra-payment
//! scenario comparison.

mod dates;
pub mod domain;
mod engine;
mod schedule;
mod timeline;
pub mod views;

pub use dates::{deserialize_date, deserialize_optional_date, parse_date, whole_months_between};
pub use domain::{CalculationError, Currency, LoanInputs, PaymentFrequency};
pub use engine::{AmortizationEngine, DEFAULT_SCENARIO_AMOUNTS, MAX_SCENARIO_AMOUNTS};
pub use schedule::annuity_payment;
pub use views::{
    CalculationResult, NonConvergence, PayoffTimeline, PeriodRecord, ScenarioComparison,
};
