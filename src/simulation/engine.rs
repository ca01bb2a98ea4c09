// src/simulation/engine.rs

use crate::error::{FitError, ForecastError, Result};
use crate::model::forecast::{ForecastOutcome, ForecastPoint, SkipReason, SkippedSku};
use crate::model::holidays::HolidayCalendar;
use crate::model::observation::{global_max_date, partition_by_sku, DailySeries, Observation};
use crate::simulation::config::{require_horizon, ForecastConfig, MAX_FORECAST_DAYS};
use crate::strategy::implementations::SeasonalRegression;
use crate::strategy::traits::SeriesModel;
use chrono::{Days, NaiveDate};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What happened to one SKU during a run.
#[derive(Debug)]
enum SkuOutcome {
    Forecast(Vec<ForecastPoint>),
    Skipped(SkippedSku),
}

/// Shared, read-only inputs for every per-SKU job in a run.
struct RunContext<'a> {
    holidays: &'a HolidayCalendar,
    global_max: NaiveDate,
    /// Every day after `global_max` up to and including the horizon end.
    future: Vec<NaiveDate>,
}

/// Fits one model per SKU and projects each past the latest observed date.
pub struct ForecastEngine {
    config: ForecastConfig,
    model: Box<dyn SeriesModel>,
}

impl ForecastEngine {
    pub fn new(config: ForecastConfig, model: Box<dyn SeriesModel>) -> Self {
        Self { config, model }
    }

    /// Engine using the seasonal regression configured in `config.model`.
    pub fn with_seasonal_model(config: ForecastConfig) -> Self {
        let model = SeasonalRegression::new(config.model.clone());
        Self::new(config, Box::new(model))
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecasts every eligible SKU `forecast_days` past the latest date in `history`.
    ///
    /// The cutoff is global: a SKU whose last sale was weeks ago is still
    /// projected up to the same final date as every other SKU, and only
    /// dates after the dataset's latest date are returned.
    pub fn forecast(&self, history: &[Observation], forecast_days: u32) -> Result<ForecastOutcome> {
        require_horizon("forecast_days", forecast_days)?;

        let Some(global_max) = global_max_date(history) else {
            info!("no order history supplied; nothing to forecast");
            return Ok(ForecastOutcome::NoHistory);
        };
        let horizon_end = global_max
            .checked_add_days(Days::new(u64::from(forecast_days)))
            .ok_or(ForecastError::HorizonTooLong {
                name: "forecast_days",
                value: forecast_days,
                max: MAX_FORECAST_DAYS,
            })?;

        // 1. One holiday calendar for the whole run, covering history and horizon
        let global_min = history.iter().map(|obs| obs.date).min().unwrap_or(global_max);
        let holidays = HolidayCalendar::covering(self.config.holiday_country, global_min, horizon_end);

        // 2. Partition into per-SKU daily series
        let series = partition_by_sku(history);
        info!(
            skus = series.len(),
            rows = history.len(),
            %global_max,
            forecast_days,
            "starting forecast run"
        );

        // 3. Fit every SKU independently
        let ctx = RunContext {
            holidays: &holidays,
            global_max,
            future: global_max.iter_days().skip(1).take_while(|d| *d <= horizon_end).collect(),
        };
        let outcomes = self.run_jobs(&series, &ctx)?;

        // 4. Concatenate in input order
        let mut points = Vec::new();
        let mut skipped = Vec::new();
        for outcome in outcomes {
            match outcome {
                SkuOutcome::Forecast(mut p) => points.append(&mut p),
                SkuOutcome::Skipped(s) => skipped.push(s),
            }
        }

        info!(
            points = points.len(),
            skipped = skipped.len(),
            "forecast run finished"
        );

        if points.is_empty() {
            Ok(ForecastOutcome::NoEligibleSkus { skipped })
        } else {
            Ok(ForecastOutcome::Forecast { points, skipped })
        }
    }

    /// Fits SKUs on a dedicated pool sized by `config.workers`. The indexed
    /// collect keeps results in input order.
    fn run_jobs(&self, series: &[DailySeries], ctx: &RunContext<'_>) -> Result<Vec<SkuOutcome>> {
        let workers = self.config.workers.clamp(1, series.len().max(1));
        if workers == 1 {
            return Ok(series.iter().map(|s| self.forecast_sku(s, ctx)).collect());
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("forecast-{}", i))
            .build()?;
        Ok(pool.install(|| series.par_iter().map(|s| self.forecast_sku(s, ctx)).collect()))
    }

    fn forecast_sku(&self, series: &DailySeries, ctx: &RunContext<'_>) -> SkuOutcome {
        let sku = series.sku.clone();
        let skip = |reason| SkuOutcome::Skipped(SkippedSku {
            sku: series.sku.clone(),
            reason,
        });

        // a. Eligibility
        let distinct_dates = series.distinct_dates();
        if distinct_dates < self.config.min_distinct_dates {
            debug!(%sku, distinct_dates, "skipping SKU with insufficient history");
            return skip(SkipReason::InsufficientHistory { distinct_dates });
        }

        // b. Fit and predict the future part of the run's date range
        let deadline = self.config.fit_timeout().map(|t| Instant::now() + t);
        let predictions = match self.model.forecast(series, ctx.holidays, &ctx.future, deadline) {
            Ok(predictions) => predictions,
            Err(FitError::TimedOut) => {
                warn!(%sku, "model fit timed out; SKU skipped");
                return skip(SkipReason::TimedOut);
            }
            Err(err) => {
                warn!(%sku, error = %err, "model fit failed; SKU skipped");
                return skip(SkipReason::FitFailed(err.to_string()));
            }
        };
        if predictions.len() != ctx.future.len() {
            warn!(%sku, expected = ctx.future.len(), got = predictions.len(), "model returned a short forecast");
            return skip(SkipReason::FitFailed(format!(
                "expected {} predictions, got {}",
                ctx.future.len(),
                predictions.len()
            )));
        }

        // c. Label each point with its distance from the global cutoff
        let points: Vec<ForecastPoint> = ctx
            .future
            .iter()
            .zip(predictions)
            .map(|(date, qty)| ForecastPoint {
                sku: sku.clone(),
                forecast_date: *date,
                forecast_quantity: qty,
                days_ahead: (*date - ctx.global_max).num_days() as u32,
            })
            .collect();

        debug!(%sku, points = points.len(), "SKU forecast complete");
        SkuOutcome::Forecast(points)
    }
}

/// Runs the default seasonal engine with default settings.
pub fn forecast_multiple_skus(history: &[Observation], forecast_days: u32) -> Result<ForecastOutcome> {
    ForecastEngine::with_seasonal_model(ForecastConfig::default()).forecast(history, forecast_days)
}
