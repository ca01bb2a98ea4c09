// src/model/observation.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One historical order line: how much of a SKU left on a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub sku: String,
    pub date: NaiveDate,
    pub quantity: f64,

    // Descriptive fields for search filters and sales breakdowns.
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_category: Option<String>,
    #[serde(default)]
    pub order_channel: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

impl Observation {
    pub fn new(sku: impl Into<String>, date: NaiveDate, quantity: f64) -> Self {
        Self {
            sku: sku.into(),
            date,
            quantity,
            product_name: None,
            product_category: None,
            order_channel: None,
            order_id: None,
        }
    }

    pub fn with_details(
        mut self,
        product_name: impl Into<String>,
        product_category: impl Into<String>,
    ) -> Self {
        self.product_name = Some(product_name.into());
        self.product_category = Some(product_category.into());
        self
    }

    pub fn with_order(mut self, order_id: impl Into<String>, order_channel: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self.order_channel = Some(order_channel.into());
        self
    }
}

/// Total quantity per calendar date for a single SKU.
///
/// Dates are kept sorted and need not be contiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    pub sku: String,
    points: Vec<(NaiveDate, f64)>,
}

impl DailySeries {
    /// Builds a series from raw `(date, quantity)` pairs, summing same-day rows.
    pub fn from_pairs(sku: impl Into<String>, pairs: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for (date, qty) in pairs {
            *totals.entry(date).or_insert(0.0) += qty;
        }
        Self {
            sku: sku.into(),
            points: totals.into_iter().collect(),
        }
    }

    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    /// Number of distinct dates with at least one observation.
    pub fn distinct_dates(&self) -> usize {
        self.points.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|(d, _)| *d)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|(d, _)| *d)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Splits observations into one `DailySeries` per SKU.
///
/// SKUs come back in order of first appearance so downstream output is stable.
pub fn partition_by_sku(history: &[Observation]) -> Vec<DailySeries> {
    let mut order: Vec<&str> = Vec::new();
    let mut grouped: HashMap<&str, Vec<(NaiveDate, f64)>> = HashMap::new();

    for obs in history {
        let entry = grouped.entry(obs.sku.as_str()).or_insert_with(|| {
            order.push(obs.sku.as_str());
            Vec::new()
        });
        entry.push((obs.date, obs.quantity));
    }

    order
        .into_iter()
        .map(|sku| {
            let pairs = grouped.remove(sku).unwrap_or_default();
            DailySeries::from_pairs(sku, pairs)
        })
        .collect()
}

/// Latest observed date across the whole dataset.
pub fn global_max_date(history: &[Observation]) -> Option<NaiveDate> {
    history.iter().map(|obs| obs.date).max()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn same_day_rows_are_summed() {
        let series = DailySeries::from_pairs(
            "A",
            vec![(d(2024, 1, 2), 3.0), (d(2024, 1, 1), 1.0), (d(2024, 1, 2), 4.0)],
        );
        assert_eq!(series.points(), &[(d(2024, 1, 1), 1.0), (d(2024, 1, 2), 7.0)]);
        assert_eq!(series.distinct_dates(), 2);
        assert_eq!(series.first_date(), Some(d(2024, 1, 1)));
        assert_eq!(series.last_date(), Some(d(2024, 1, 2)));
    }

    #[test]
    fn partition_keeps_first_appearance_order() {
        let history = vec![
            Observation::new("B", d(2024, 1, 1), 1.0),
            Observation::new("A", d(2024, 1, 1), 2.0),
            Observation::new("B", d(2024, 1, 3), 5.0),
        ];
        let series = partition_by_sku(&history);
        let skus: Vec<_> = series.iter().map(|s| s.sku.as_str()).collect();
        assert_eq!(skus, vec!["B", "A"]);
        assert_eq!(series[0].distinct_dates(), 2);
        assert_eq!(global_max_date(&history), Some(d(2024, 1, 3)));
    }

    #[test]
    fn empty_history_has_no_max_date() {
        assert!(partition_by_sku(&[]).is_empty());
        assert_eq!(global_max_date(&[]), None);
    }
}
