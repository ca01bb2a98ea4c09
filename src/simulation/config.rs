// src/simulation/config.rs

use crate::error::{ForecastError, Result};
use crate::model::holidays::Country;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const ENV_PREFIX: &str = "FORECAST";

/// Seasonal components of the Prophet model fitted to each SKU.
///
/// Trend and prior scales keep Prophet's defaults (25 changepoints over the
/// first 80% of the history, changepoint prior 0.05, seasonality and holiday
/// priors 10).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub yearly_seasonality: bool,
    pub weekly_seasonality: bool,
    pub yearly_fourier_order: u32,
    pub weekly_fourier_order: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            yearly_seasonality: true,
            weekly_seasonality: true,
            yearly_fourier_order: 10,
            weekly_fourier_order: 3,
        }
    }
}

/// Everything a forecast-and-recommend run needs to know.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub forecast_days: u32,
    pub min_distinct_dates: usize,
    pub summary_horizons: Vec<u32>,
    pub history_windows: Vec<u32>,
    pub safety_pct: f64,
    /// Stand-in on-hand quantity until a real stock feed is wired in.
    pub default_current_inventory: f64,
    pub holiday_country: Country,
    pub workers: usize,
    pub fit_timeout_secs: Option<u64>,
    pub model: ModelConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            forecast_days: 30,
            min_distinct_dates: 30,
            summary_horizons: vec![7, 30, 90],
            history_windows: vec![7, 30, 120],
            safety_pct: 20.0,
            default_current_inventory: 100.0,
            holiday_country: Country::UnitedKingdom,
            workers: default_workers(),
            fit_timeout_secs: None,
            model: ModelConfig::default(),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl ForecastConfig {
    /// Layers defaults, an optional TOML file and `FORECAST__*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("summary_horizons")
                .with_list_parse_key("history_windows")
                .try_parsing(true),
        );

        let config: ForecastConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn fit_timeout(&self) -> Option<Duration> {
        self.fit_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<()> {
        require_horizon("forecast_days", self.forecast_days)?;
        for h in &self.summary_horizons {
            require_positive("summary_horizons", *h)?;
        }
        for w in &self.history_windows {
            require_positive("history_windows", *w)?;
        }
        if !self.safety_pct.is_finite() || !(0.0..=100.0).contains(&self.safety_pct) {
            return Err(ForecastError::InvalidSafetyPct(self.safety_pct));
        }
        if self.workers == 0 {
            return Err(ForecastError::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.min_distinct_dates < 2 {
            return Err(ForecastError::InvalidConfig(
                "min_distinct_dates must be at least 2".to_string(),
            ));
        }
        let orders = [
            (self.model.yearly_seasonality, self.model.yearly_fourier_order),
            (self.model.weekly_seasonality, self.model.weekly_fourier_order),
        ];
        if orders.iter().any(|(enabled, order)| *enabled && *order == 0) {
            return Err(ForecastError::InvalidConfig(
                "an enabled seasonality needs a Fourier order of at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Longest horizon a run may project, in days.
pub const MAX_FORECAST_DAYS: u32 = 3660;

/// A forecast horizon must be positive and no longer than [`MAX_FORECAST_DAYS`].
pub(crate) fn require_horizon(name: &'static str, value: u32) -> Result<()> {
    require_positive(name, value)?;
    if value > MAX_FORECAST_DAYS {
        return Err(ForecastError::HorizonTooLong {
            name,
            value,
            max: MAX_FORECAST_DAYS,
        });
    }
    Ok(())
}

pub(crate) fn require_positive(name: &'static str, value: u32) -> Result<()> {
    if value == 0 {
        Err(ForecastError::InvalidHorizon { name, value })
    } else {
        Ok(())
    }
}
