// src/io/dead_stock.rs

use crate::model::observation::Observation;
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// How long a SKU has gone without a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnsoldBucket {
    UpToOneMonth,
    OneToThreeMonths,
    ThreeToSixMonths,
    SixMonthsToOneYear,
    OverOneYear,
}

impl UnsoldBucket {
    /// Fixed display order.
    pub const ALL: [UnsoldBucket; 5] = [
        UnsoldBucket::UpToOneMonth,
        UnsoldBucket::OneToThreeMonths,
        UnsoldBucket::ThreeToSixMonths,
        UnsoldBucket::SixMonthsToOneYear,
        UnsoldBucket::OverOneYear,
    ];

    /// Bucket for a gap in days; anything under a week is not considered unsold.
    pub fn for_days(days: i64) -> Option<Self> {
        match days {
            7..=30 => Some(UnsoldBucket::UpToOneMonth),
            31..=90 => Some(UnsoldBucket::OneToThreeMonths),
            91..=180 => Some(UnsoldBucket::ThreeToSixMonths),
            181..=365 => Some(UnsoldBucket::SixMonthsToOneYear),
            d if d >= 366 => Some(UnsoldBucket::OverOneYear),
            _ => None,
        }
    }

    /// Display and export name.
    pub fn label(&self) -> &'static str {
        match self {
            UnsoldBucket::UpToOneMonth => "7 days to 1 month",
            UnsoldBucket::OneToThreeMonths => "1 to 3 months",
            UnsoldBucket::ThreeToSixMonths => "3 to 6 months",
            UnsoldBucket::SixMonthsToOneYear => "6 months to 1 year",
            UnsoldBucket::OverOneYear => "more than 1 year",
        }
    }
}

impl fmt::Display for UnsoldBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for UnsoldBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeadStockRow {
    #[serde(rename = "product_sku")]
    pub sku: String,
    pub product_name: Option<String>,
    pub product_category: Option<String>,
    pub last_sold: NaiveDate,
    pub days_since_last_sale: i64,
    pub bucket: Option<UnsoldBucket>,
}

/// Latest sale of one SKU plus the newest name and category seen on any of its lines.
struct LastSale<'a> {
    date: NaiveDate,
    name: Option<(NaiveDate, &'a str)>,
    category: Option<(NaiveDate, &'a str)>,
}

fn newer<'a>(current: &mut Option<(NaiveDate, &'a str)>, date: NaiveDate, value: Option<&'a str>) {
    if let Some(value) = value {
        if current.map_or(true, |(seen, _)| date >= seen) {
            *current = Some((date, value));
        }
    }
}

/// Last sale per SKU measured against `as_of`, sorted by most recently sold first.
///
/// Name and category come from the latest line that carries them, which
/// need not be the latest sale.
pub fn last_sales(history: &[Observation], as_of: NaiveDate) -> Vec<DeadStockRow> {
    let mut latest: HashMap<&str, LastSale<'_>> = HashMap::new();
    for obs in history {
        let entry = latest.entry(obs.sku.as_str()).or_insert(LastSale {
            date: obs.date,
            name: None,
            category: None,
        });
        entry.date = entry.date.max(obs.date);
        newer(&mut entry.name, obs.date, obs.product_name.as_deref());
        newer(&mut entry.category, obs.date, obs.product_category.as_deref());
    }

    let mut rows: Vec<DeadStockRow> = latest
        .into_iter()
        .map(|(sku, sale)| {
            let days = (as_of - sale.date).num_days();
            DeadStockRow {
                sku: sku.to_string(),
                product_name: sale.name.map(|(_, n)| n.to_string()),
                product_category: sale.category.map(|(_, c)| c.to_string()),
                last_sold: sale.date,
                days_since_last_sale: days,
                bucket: UnsoldBucket::for_days(days),
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        a.days_since_last_sale
            .cmp(&b.days_since_last_sale)
            .then_with(|| a.sku.cmp(&b.sku))
    });
    rows
}

/// Rows falling in any of the selected buckets.
pub fn dead_stock(history: &[Observation], as_of: NaiveDate, buckets: &[UnsoldBucket]) -> Vec<DeadStockRow> {
    last_sales(history, as_of)
        .into_iter()
        .filter(|row| row.bucket.is_some_and(|b| buckets.contains(&b)))
        .collect()
}

/// Distinct SKU count per bucket, in display order, zero-filled.
pub fn bucket_counts(rows: &[DeadStockRow]) -> Vec<(UnsoldBucket, usize)> {
    UnsoldBucket::ALL
        .iter()
        .map(|bucket| {
            let count = rows.iter().filter(|r| r.bucket == Some(*bucket)).count();
            (*bucket, count)
        })
        .collect()
}

/// Unsold SKU count per product category, largest first. Uncategorised SKUs are left out.
pub fn category_counts(rows: &[DeadStockRow]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows.iter().filter(|r| r.bucket.is_some()) {
        if let Some(category) = row.product_category.as_deref() {
            *counts.entry(category).or_insert(0) += 1;
        }
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(c, n)| (c.to_string(), n))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
    }

    fn sold(sku: &str, days_ago: i64, category: &str) -> Observation {
        Observation::new(sku, as_of() - Duration::days(days_ago), 1.0).with_details(sku, category)
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(UnsoldBucket::for_days(6), None);
        assert_eq!(UnsoldBucket::for_days(7), Some(UnsoldBucket::UpToOneMonth));
        assert_eq!(UnsoldBucket::for_days(30), Some(UnsoldBucket::UpToOneMonth));
        assert_eq!(UnsoldBucket::for_days(31), Some(UnsoldBucket::OneToThreeMonths));
        assert_eq!(UnsoldBucket::for_days(180), Some(UnsoldBucket::ThreeToSixMonths));
        assert_eq!(UnsoldBucket::for_days(365), Some(UnsoldBucket::SixMonthsToOneYear));
        assert_eq!(UnsoldBucket::for_days(366), Some(UnsoldBucket::OverOneYear));
    }

    #[test]
    fn uses_latest_sale_per_sku() {
        let history = vec![sold("A", 100, "Kitchen"), sold("A", 10, "Kitchen"), sold("B", 2, "Garden")];
        let rows = last_sales(&history, as_of());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sku, "B");
        assert_eq!(rows[0].bucket, None);
        assert_eq!(rows[1].days_since_last_sale, 10);
        assert_eq!(rows[1].bucket, Some(UnsoldBucket::UpToOneMonth));
    }

    #[test]
    fn counts_are_zero_filled_and_ordered() {
        let history = vec![
            sold("A", 40, "Kitchen"),
            sold("B", 45, "Garden"),
            sold("C", 400, "Kitchen"),
            sold("D", 1, "Kitchen"),
        ];
        let rows = last_sales(&history, as_of());
        assert_eq!(
            bucket_counts(&rows),
            vec![
                (UnsoldBucket::UpToOneMonth, 0),
                (UnsoldBucket::OneToThreeMonths, 2),
                (UnsoldBucket::ThreeToSixMonths, 0),
                (UnsoldBucket::SixMonthsToOneYear, 0),
                (UnsoldBucket::OverOneYear, 1),
            ]
        );
        assert_eq!(
            category_counts(&rows),
            vec![("Kitchen".to_string(), 2), ("Garden".to_string(), 1)]
        );

        let selected = dead_stock(&history, as_of(), &[UnsoldBucket::OneToThreeMonths]);
        let skus: Vec<_> = selected.iter().map(|r| r.sku.as_str()).collect();
        assert_eq!(skus, vec!["A", "B"]);
    }

    #[test]
    fn category_falls_back_to_older_lines() {
        let mut latest = Observation::new("A", as_of() - Duration::days(50), 1.0);
        latest.product_name = Some("Lamp".to_string());
        let history = vec![sold("A", 200, "Lighting"), latest, sold("B", 60, "Garden")];

        let rows = last_sales(&history, as_of());
        let a = rows.iter().find(|r| r.sku == "A").unwrap();
        assert_eq!(a.days_since_last_sale, 50);
        assert_eq!(a.product_name.as_deref(), Some("Lamp"));
        assert_eq!(a.product_category.as_deref(), Some("Lighting"));
        assert_eq!(
            category_counts(&rows),
            vec![("Garden".to_string(), 1), ("Lighting".to_string(), 1)]
        );
    }

    #[test]
    fn bucket_exports_its_label() {
        for bucket in UnsoldBucket::ALL {
            assert_eq!(bucket.to_string(), bucket.label());
        }
        let row = DeadStockRow {
            sku: "A".to_string(),
            product_name: None,
            product_category: None,
            last_sold: as_of(),
            days_since_last_sale: 400,
            bucket: Some(UnsoldBucket::OverOneYear),
        };
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.serialize(&row).unwrap();
        let csv = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert!(csv.ends_with(",400,more than 1 year\n"), "{}", csv);
    }
}
