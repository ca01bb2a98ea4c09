// src/error.rs

use thiserror::Error;

/// Errors surfaced to the caller of the forecasting pipeline.
///
/// Per-SKU data problems never show up here: they are recovered inside the
/// engine and reported as skipped SKUs instead.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("{name} must be greater than zero (got {value})")]
    InvalidHorizon { name: &'static str, value: u32 },

    #[error("{name} of {value} days exceeds the supported maximum of {max}")]
    HorizonTooLong { name: &'static str, value: u32, max: u32 },

    #[error("safety stock percentage must be between 0 and 100 (got {0})")]
    InvalidSafetyPct(f64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no current inventory recorded for SKU '{0}'")]
    MissingInventory(String),

    #[error("input is missing required column '{0}'")]
    MissingColumn(String),

    #[error("invalid record on line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("could not start forecast workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Reasons a single SKU's model could not be fitted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("need at least {required} observations, got {actual}")]
    TooFewObservations { required: usize, actual: usize },

    #[error("observation on {0} is not a finite number")]
    NonFiniteObservation(chrono::NaiveDate),

    #[error("model fit failed: {0}")]
    Model(String),

    #[error("fit exceeded its deadline")]
    TimedOut,
}

pub type Result<T> = std::result::Result<T, ForecastError>;
