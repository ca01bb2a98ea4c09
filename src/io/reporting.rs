// src/io/reporting.rs

use crate::error::{ForecastError, Result};
use crate::io::dead_stock::DeadStockRow;
use crate::io::sales::ChannelSummary;
use crate::model::forecast::{ForecastPoint, ForecastSummary, RecommendationRow};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// A row type with a fixed CSV export schema.
pub trait CsvRow: Serialize {
    /// Header written when the table has no rows. Empty means an empty
    /// table exports as an empty blob.
    const COLUMNS: &'static [&'static str];
}

// A run with no eligible SKUs has no forecast table at all.
impl CsvRow for ForecastPoint {
    const COLUMNS: &'static [&'static str] = &[];
}

impl CsvRow for RecommendationRow {
    const COLUMNS: &'static [&'static str] = &[
        "product_sku",
        "forecast_qty",
        "recommended_inventory",
        "current_inventory",
        "po_quantity",
    ];
}

impl CsvRow for DeadStockRow {
    const COLUMNS: &'static [&'static str] = &[
        "product_sku",
        "product_name",
        "product_category",
        "last_sold",
        "days_since_last_sale",
        "bucket",
    ];
}

impl CsvRow for ChannelSummary {
    const COLUMNS: &'static [&'static str] = &["order_channel", "total_orders", "total_qty"];
}

fn write_rows<W: Write, T: CsvRow>(wtr: &mut csv::Writer<W>, rows: &[T]) -> Result<()> {
    if rows.is_empty() && !T::COLUMNS.is_empty() {
        wtr.write_record(T::COLUMNS)?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Serialises rows as UTF-8 CSV: one header row, no index column.
pub fn to_csv_bytes<T: CsvRow>(rows: &[T]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    write_rows(&mut wtr, rows)?;
    wtr.into_inner()
        .map_err(|e| ForecastError::Io(e.into_error()))
}

/// Writes rows to a CSV file.
///
/// # Arguments
/// * `file_path` - The path to save the file (e.g., "results/forecast.csv").
/// * `rows` - Any exportable table (forecast points, recommendations, ...).
pub fn write_csv<T: CsvRow>(file_path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(file_path)?;
    write_rows(&mut wtr, rows)?;

    info!(rows = rows.len(), path = %file_path.display(), "exported CSV");
    Ok(())
}

pub fn forecast_csv(points: &[ForecastPoint]) -> Result<Vec<u8>> {
    to_csv_bytes(points)
}

pub fn recommendation_csv(rows: &[RecommendationRow]) -> Result<Vec<u8>> {
    to_csv_bytes(rows)
}

pub fn dead_stock_csv(rows: &[DeadStockRow]) -> Result<Vec<u8>> {
    to_csv_bytes(rows)
}

pub fn channel_csv(rows: &[ChannelSummary]) -> Result<Vec<u8>> {
    to_csv_bytes(rows)
}

/// Writes the horizon summary, whose columns depend on the horizons and windows requested.
///
/// Columns: `product_sku`, `forecast_qty_<N>d` per horizon, `sold_last_<N>d` per window.
/// Like the forecast it summarises, an empty summary is an empty blob.
pub fn write_summary<W: Write>(writer: W, summaries: &[ForecastSummary]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let Some(first) = summaries.first() else {
        wtr.flush()?;
        return Ok(());
    };

    let mut header = vec!["product_sku".to_string()];
    header.extend(first.horizon_totals.iter().map(|(h, _)| format!("forecast_qty_{}d", h)));
    header.extend(first.trailing_actuals.iter().map(|(w, _)| format!("sold_last_{}d", w)));
    wtr.write_record(&header)?;

    for summary in summaries {
        let mut record = vec![summary.sku.clone()];
        record.extend(summary.horizon_totals.iter().map(|(_, qty)| qty.to_string()));
        record.extend(summary.trailing_actuals.iter().map(|(_, qty)| qty.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn summary_csv(summaries: &[ForecastSummary]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_summary(&mut buf, summaries)?;
    Ok(buf)
}
