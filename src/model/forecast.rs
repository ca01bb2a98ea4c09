// src/model/forecast.rs

use chrono::NaiveDate;
use serde::Serialize;

/// A single future daily point estimate for one SKU.
///
/// Serialises to the export columns `product_sku,forecast_date,forecast_qty`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    #[serde(rename = "product_sku")]
    pub sku: String,
    pub forecast_date: NaiveDate,
    #[serde(rename = "forecast_qty")]
    pub forecast_quantity: f64,
    /// Days after the latest date observed anywhere in the input.
    #[serde(skip_serializing)]
    pub days_ahead: u32,
}

/// Why a SKU produced no forecast.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    InsufficientHistory { distinct_dates: usize },
    FitFailed(String),
    TimedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSku {
    pub sku: String,
    pub reason: SkipReason,
}

/// Result of one forecast run.
///
/// The three variants let a caller tell "nothing was supplied" apart from
/// "nothing qualified" apart from an actual forecast.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    NoHistory,
    NoEligibleSkus {
        skipped: Vec<SkippedSku>,
    },
    Forecast {
        points: Vec<ForecastPoint>,
        skipped: Vec<SkippedSku>,
    },
}

impl ForecastOutcome {
    pub fn points(&self) -> &[ForecastPoint] {
        match self {
            ForecastOutcome::Forecast { points, .. } => points,
            _ => &[],
        }
    }

    pub fn skipped(&self) -> &[SkippedSku] {
        match self {
            ForecastOutcome::NoHistory => &[],
            ForecastOutcome::NoEligibleSkus { skipped } => skipped,
            ForecastOutcome::Forecast { skipped, .. } => skipped,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points().is_empty()
    }

    pub fn into_points(self) -> Vec<ForecastPoint> {
        match self {
            ForecastOutcome::Forecast { points, .. } => points,
            _ => Vec::new(),
        }
    }
}

/// Per-SKU totals over several horizons plus recent actuals for context.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSummary {
    pub sku: String,
    /// `(horizon_days, cumulative forecast)` in ascending horizon order.
    pub horizon_totals: Vec<(u32, f64)>,
    /// `(window_days, units sold)` for trailing windows ending at the latest observed date.
    pub trailing_actuals: Vec<(u32, f64)>,
    /// Set when any underlying point estimate was below zero.
    pub has_negative_points: bool,
}

impl ForecastSummary {
    pub fn forecast_qty(&self, horizon_days: u32) -> Option<f64> {
        self.horizon_totals
            .iter()
            .find(|(h, _)| *h == horizon_days)
            .map(|(_, qty)| *qty)
    }

    pub fn sold_last(&self, window_days: u32) -> Option<f64> {
        self.trailing_actuals
            .iter()
            .find(|(w, _)| *w == window_days)
            .map(|(_, qty)| *qty)
    }
}

/// Forecast demand for one SKU over the planning horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct SkuDemand {
    pub sku: String,
    pub forecast_qty: f64,
}

impl SkuDemand {
    pub fn new(sku: impl Into<String>, forecast_qty: f64) -> Self {
        Self {
            sku: sku.into(),
            forecast_qty,
        }
    }
}

/// Replenishment advice for one SKU.
///
/// Serialises to `product_sku,forecast_qty,recommended_inventory,current_inventory,po_quantity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRow {
    #[serde(rename = "product_sku")]
    pub sku: String,
    pub forecast_qty: f64,
    #[serde(skip_serializing)]
    pub avg_daily_forecast: f64,
    #[serde(skip_serializing)]
    pub safety_stock: f64,
    pub recommended_inventory: f64,
    pub current_inventory: f64,
    pub po_quantity: u64,
}
