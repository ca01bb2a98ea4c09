// src/io/history.rs

use crate::error::{ForecastError, Result};
use crate::model::observation::Observation;
use crate::strategy::inventory::{InventoryTable, MissingInventory};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::io::Read;
use std::path::Path;

/// Names of the columns holding each field in a history export.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryColumns {
    pub sku: String,
    pub date: String,
    pub quantity: String,
    pub product_name: Option<String>,
    pub product_category: Option<String>,
    pub order_channel: Option<String>,
    pub order_id: Option<String>,
}

impl Default for HistoryColumns {
    fn default() -> Self {
        Self {
            sku: "product_sku".to_string(),
            date: "order_date".to_string(),
            quantity: "product_qty".to_string(),
            product_name: Some("product_name".to_string()),
            product_category: Some("product_category".to_string()),
            order_channel: Some("order_channel".to_string()),
            order_id: Some("order_id".to_string()),
        }
    }
}

/// Reads order lines from a CSV file.
pub fn load_history(path: &Path, columns: &HistoryColumns) -> Result<Vec<Observation>> {
    let reader = csv::Reader::from_path(path)?;
    read_observations(reader, columns)
}

/// Reads order lines from any CSV source with a header row.
///
/// Dates may carry a time component, which is dropped. Quantities must be
/// finite and non-negative. Optional descriptive columns are ignored when absent.
pub fn read_observations<R: Read>(mut reader: csv::Reader<R>, columns: &HistoryColumns) -> Result<Vec<Observation>> {
    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);
    let required = |name: &str| position(name).ok_or_else(|| ForecastError::MissingColumn(name.to_string()));

    let sku_idx = required(&columns.sku)?;
    let date_idx = required(&columns.date)?;
    let qty_idx = required(&columns.quantity)?;
    let name_idx = columns.product_name.as_deref().and_then(position);
    let category_idx = columns.product_category.as_deref().and_then(position);
    let channel_idx = columns.order_channel.as_deref().and_then(position);
    let order_idx = columns.order_id.as_deref().and_then(position);

    let mut observations = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let sku = field(sku_idx);
        if sku.is_empty() {
            return Err(ForecastError::InvalidRecord {
                line,
                reason: "empty SKU".to_string(),
            });
        }
        let date = parse_order_date(field(date_idx)).ok_or_else(|| ForecastError::InvalidRecord {
            line,
            reason: format!("unparseable date '{}'", field(date_idx)),
        })?;
        let quantity: f64 = field(qty_idx).parse().map_err(|_| ForecastError::InvalidRecord {
            line,
            reason: format!("unparseable quantity '{}'", field(qty_idx)),
        })?;
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(ForecastError::InvalidRecord {
                line,
                reason: format!("quantity must be a non-negative number, got {}", quantity),
            });
        }

        let optional = |idx: Option<usize>| {
            idx.map(field)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        observations.push(Observation {
            sku: sku.to_string(),
            date,
            quantity,
            product_name: optional(name_idx),
            product_category: optional(category_idx),
            order_channel: optional(channel_idx),
            order_id: optional(order_idx),
        });
    }
    Ok(observations)
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time of day.
pub fn parse_order_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

/// Loads on-hand stock from a `product_sku,current_inventory` CSV.
pub fn load_inventory(path: &Path, missing: MissingInventory) -> Result<InventoryTable> {
    #[derive(serde::Deserialize)]
    struct StockRow {
        product_sku: String,
        current_inventory: f64,
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut table = InventoryTable::new(missing);
    for row in reader.deserialize() {
        let row: StockRow = row?;
        table.insert(row.product_sku, row.current_inventory);
    }
    Ok(table)
}

// =========================================================================
// Synthetic history for demos and tests
// =========================================================================

/// One SKU selling exactly `quantity` every day for `days` days.
pub fn generate_constant_history(sku: &str, start: NaiveDate, days: u32, quantity: f64) -> Vec<Observation> {
    (0..days)
        .map(|i| Observation::new(sku, start + Duration::days(i64::from(i)), quantity))
        .collect()
}

/// Daily sales drawn from a Normal distribution with a weekend uplift.
///
/// # Arguments
/// * `sku` - SKU to label the rows with.
/// * `start` - First calendar day.
/// * `days` - Length of the history.
/// * `mean` - Average weekday quantity (e.g., 10.0).
/// * `std_dev` - Day-to-day volatility (e.g., 2.0).
/// * `sell_probability` - Chance that any given day records a sale at all.
/// * `seed` - Seed for reproducible output.
pub fn generate_seasonal_history(
    sku: &str,
    start: NaiveDate,
    days: u32,
    mean: f64,
    std_dev: f64,
    sell_probability: f64,
    seed: u64,
) -> Vec<Observation> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = match Normal::new(mean, std_dev.abs()) {
        Ok(normal) => normal,
        Err(_) => return Vec::new(),
    };

    let mut rows = Vec::with_capacity(days as usize);
    for i in 0..days {
        let date = start + Duration::days(i64::from(i));
        if !rng.gen_bool(sell_probability.clamp(0.0, 1.0)) {
            continue;
        }

        let uplift = match date.weekday() {
            Weekday::Sat | Weekday::Sun => 1.5,
            _ => 1.0,
        };
        // Round to whole units; demand cannot be negative.
        let qty = (normal.sample(&mut rng) * uplift).round().max(0.0);
        rows.push(Observation::new(sku, date, qty));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(data: &str) -> csv::Reader<&[u8]> {
        csv::Reader::from_reader(data.as_bytes())
    }

    #[test]
    fn reads_default_columns_and_strips_time() {
        let data = "order_id,order_channel,product_sku,product_name,product_category,order_date,product_qty\n\
                    1,Web,AB-1,Bottle,Kitchen,2024-02-01 13:45:00,3\n\
                    2,,AB-2,,Garden,2024-02-02,1.5\n";
        let rows = read_observations(reader(data), &HistoryColumns::default()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sku, "AB-1");
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(rows[0].quantity, 3.0);
        assert_eq!(rows[0].product_name.as_deref(), Some("Bottle"));
        assert_eq!(rows[1].product_name, None);
        assert_eq!(rows[1].product_category.as_deref(), Some("Garden"));
        assert_eq!(rows[0].order_channel.as_deref(), Some("Web"));
        assert_eq!(rows[0].order_id.as_deref(), Some("1"));
        assert_eq!(rows[1].order_channel, None);
    }

    #[test]
    fn honours_custom_column_names() {
        let columns = HistoryColumns {
            sku: "item".to_string(),
            date: "day".to_string(),
            quantity: "units".to_string(),
            product_name: None,
            product_category: None,
            order_channel: None,
            order_id: None,
        };
        let rows = read_observations(reader("day,item,units\n2024-01-05,X,7\n"), &columns).unwrap();
        assert_eq!(rows, vec![Observation::new("X", NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), 7.0)]);
    }

    #[test]
    fn missing_column_is_reported() {
        let err = read_observations(reader("product_sku,order_date\nA,2024-01-01\n"), &HistoryColumns::default())
            .unwrap_err();
        assert!(matches!(err, ForecastError::MissingColumn(c) if c == "product_qty"));
    }

    #[test]
    fn bad_values_are_rejected_with_line() {
        let err = read_observations(
            reader("product_sku,order_date,product_qty\nA,2024-01-01,1\nA,yesterday,2\n"),
            &HistoryColumns::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidRecord { line: 3, .. }));

        let err = read_observations(
            reader("product_sku,order_date,product_qty\nA,2024-01-01,-4\n"),
            &HistoryColumns::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidRecord { .. }));
    }

    #[test]
    fn loads_stock_on_hand() {
        use crate::strategy::inventory::InventoryLookup;
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "product_sku,current_inventory\nA,12\nB,0.5\n").unwrap();
        file.flush().unwrap();

        let table = load_inventory(file.path(), MissingInventory::Fail).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.current_inventory("A").unwrap(), 12.0);
        assert!(matches!(
            table.current_inventory("C"),
            Err(ForecastError::MissingInventory(_))
        ));
    }

    #[test]
    fn seeded_generator_is_reproducible() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let a = generate_seasonal_history("S", start, 90, 10.0, 2.0, 0.8, 42);
        let b = generate_seasonal_history("S", start, 90, 10.0, 2.0, 0.8, 42);
        assert_eq!(a, b);
        assert!(a.len() < 90 && !a.is_empty());
        assert!(a.iter().all(|o| o.quantity >= 0.0 && o.quantity.fract() == 0.0));
    }

    #[test]
    fn constant_generator_covers_every_day() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows = generate_constant_history("A", start, 35, 10.0);
        assert_eq!(rows.len(), 35);
        assert_eq!(rows[34].date, NaiveDate::from_ymd_opt(2024, 2, 4).unwrap());
    }
}
