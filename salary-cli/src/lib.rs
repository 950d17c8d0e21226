//! Command-line front end for the salary calculator.

pub mod config;
pub mod input;
pub mod report;

pub use config::{AppConfig, ConfigFileError};
pub use input::{ParseSalaryError, parse_salary};
