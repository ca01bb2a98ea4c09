// src/simulation/recommendation.rs

use crate::error::{ForecastError, Result};
use crate::model::forecast::{RecommendationRow, SkuDemand};
use crate::simulation::config::require_positive;
use crate::strategy::inventory::InventoryLookup;

/// Turns forecast demand into a recommended stock level and order quantity.
///
/// # Formula
/// avg_daily = forecast_qty / horizon_days
/// safety_stock = avg_daily * (horizon_days / 2) * (safety_pct / 100)
/// recommended = forecast_qty + safety_stock
/// po_quantity = max(0, round(recommended - current_inventory))
///
/// The safety stock is a flat half-horizon buffer. It carries no demand
/// variance term.
///
/// # Arguments
/// * `demand` - Forecast totals per SKU for the planning horizon.
/// * `horizon_days` - Length of that horizon; must be greater than zero.
/// * `safety_pct` - Percentage in `0..=100`.
/// * `inventory` - Current on-hand stock per SKU.
pub fn recommend(
    demand: &[SkuDemand],
    horizon_days: u32,
    safety_pct: f64,
    inventory: &dyn InventoryLookup,
) -> Result<Vec<RecommendationRow>> {
    require_positive("horizon_days", horizon_days)?;
    if !safety_pct.is_finite() || !(0.0..=100.0).contains(&safety_pct) {
        return Err(ForecastError::InvalidSafetyPct(safety_pct));
    }

    let horizon = f64::from(horizon_days);
    demand
        .iter()
        .map(|d| {
            let avg_daily_forecast = d.forecast_qty / horizon;
            let safety_stock = avg_daily_forecast * (horizon / 2.0) * (safety_pct / 100.0);
            let recommended_inventory = d.forecast_qty + safety_stock;
            let current_inventory = inventory.current_inventory(&d.sku)?;

            Ok(RecommendationRow {
                sku: d.sku.clone(),
                forecast_qty: d.forecast_qty,
                avg_daily_forecast,
                safety_stock,
                recommended_inventory,
                current_inventory,
                po_quantity: order_quantity(recommended_inventory - current_inventory),
            })
        })
        .collect()
}

/// Rounds half-to-even and floors at zero; NaN orders nothing.
fn order_quantity(shortfall: f64) -> u64 {
    let rounded = shortfall.round_ties_even();
    if rounded > 0.0 {
        rounded as u64
    } else {
        0
    }
}
