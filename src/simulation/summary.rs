// src/simulation/summary.rs

use crate::error::Result;
use crate::model::forecast::{ForecastPoint, ForecastSummary, SkuDemand};
use crate::model::observation::{global_max_date, Observation};
use crate::simulation::config::require_positive;
use std::collections::HashMap;

/// Rolls forecast points up into per-SKU horizon totals.
///
/// `forecast_qty` for horizon N is the sum of points with `days_ahead` in
/// `1..=N`. A horizon longer than the generated range sums whatever exists.
/// Trailing actuals cover the `window` days ending at the latest date in
/// `history` (inclusive); SKUs without recent sales get zero.
pub fn summarize(
    points: &[ForecastPoint],
    horizons: &[u32],
    history: &[Observation],
    windows: &[u32],
) -> Result<Vec<ForecastSummary>> {
    for h in horizons {
        require_positive("horizon", *h)?;
    }
    for w in windows {
        require_positive("history window", *w)?;
    }

    let mut horizons = horizons.to_vec();
    horizons.sort_unstable();
    horizons.dedup();

    // Group points by SKU in order of appearance
    let mut order: Vec<&str> = Vec::new();
    let mut by_sku: HashMap<&str, Vec<&ForecastPoint>> = HashMap::new();
    for p in points {
        by_sku
            .entry(p.sku.as_str())
            .or_insert_with(|| {
                order.push(p.sku.as_str());
                Vec::new()
            })
            .push(p);
    }

    let actuals = trailing_actuals(history, windows);

    let summaries = order
        .into_iter()
        .map(|sku| {
            let mut sku_points = by_sku.remove(sku).unwrap_or_default();
            sku_points.sort_by_key(|p| p.days_ahead);

            let horizon_totals = horizons
                .iter()
                .map(|h| {
                    let total: f64 = sku_points
                        .iter()
                        .take_while(|p| p.days_ahead <= *h)
                        .filter(|p| p.days_ahead >= 1)
                        .map(|p| p.forecast_quantity)
                        .sum();
                    (*h, total)
                })
                .collect();

            let trailing = windows
                .iter()
                .map(|w| {
                    let qty = actuals
                        .get(&(sku, *w))
                        .copied()
                        .unwrap_or(0.0);
                    (*w, qty)
                })
                .collect();

            ForecastSummary {
                sku: sku.to_string(),
                horizon_totals,
                trailing_actuals: trailing,
                has_negative_points: sku_points.iter().any(|p| p.forecast_quantity < 0.0),
            }
        })
        .collect();

    Ok(summaries)
}

/// Units sold per `(sku, window)` for windows ending at the dataset's latest date.
fn trailing_actuals<'a>(history: &'a [Observation], windows: &[u32]) -> HashMap<(&'a str, u32), f64> {
    let mut out = HashMap::new();
    let Some(max_date) = global_max_date(history) else {
        return out;
    };
    for obs in history {
        let age = (max_date - obs.date).num_days();
        for w in windows {
            if age < i64::from(*w) {
                *out.entry((obs.sku.as_str(), *w)).or_insert(0.0) += obs.quantity;
            }
        }
    }
    out
}

/// Total forecast per SKU across every point supplied.
///
/// Equivalent to summing the whole forecast table for the run.
pub fn demand_from_points(points: &[ForecastPoint]) -> Vec<SkuDemand> {
    let mut demand: Vec<SkuDemand> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for p in points {
        let idx = *index.entry(p.sku.as_str()).or_insert_with(|| {
            demand.push(SkuDemand::new(p.sku.clone(), 0.0));
            demand.len() - 1
        });
        demand[idx].forecast_qty += p.forecast_quantity;
    }
    demand
}

/// Demand per SKU for one of the summarised horizons; SKUs lacking it are dropped.
pub fn demand_for_horizon(summaries: &[ForecastSummary], horizon_days: u32) -> Vec<SkuDemand> {
    summaries
        .iter()
        .filter_map(|s| {
            s.forecast_qty(horizon_days)
                .map(|qty| SkuDemand::new(s.sku.clone(), qty))
        })
        .collect()
}

/// Horizon totals never decrease while every point is non-negative.
pub fn is_monotonic(summary: &ForecastSummary) -> bool {
    summary
        .horizon_totals
        .windows(2)
        .all(|w| w[1].1 >= w[0].1)
}
