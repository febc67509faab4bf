pub mod amortization;
pub mod config;
pub mod error;
pub mod telemetry;
