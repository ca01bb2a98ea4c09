use chrono::NaiveDate;
use inventory_forecast::io::dead_stock::{self, UnsoldBucket};
use inventory_forecast::io::history::{self, HistoryColumns};
use inventory_forecast::io::reporting;
use inventory_forecast::io::sales;
use inventory_forecast::model::observation::{global_max_date, Observation};
use inventory_forecast::simulation::summary::demand_from_points;
use inventory_forecast::{
    recommend, summarize, FixedInventory, ForecastConfig, ForecastEngine, ForecastOutcome, InventoryLookup,
    MissingInventory, Result,
};
use std::env;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    println!("=== Inventory Forecast ===");
    let args: Vec<String> = env::args().skip(1).collect();

    // 1. SETUP CONFIGURATION
    let config = ForecastConfig::load(args.get(1).map(Path::new))?;
    println!(
        "Forecasting {} days ahead, safety stock {}%, {} worker(s)",
        config.forecast_days, config.safety_pct, config.workers
    );

    // 2. LOAD HISTORY
    let history = match args.first().map(String::as_str) {
        None | Some("demo") => {
            println!("No history file given, generating demo order history");
            demo_history()
        }
        Some(path) => history::load_history(Path::new(path), &HistoryColumns::default())?,
    };
    println!("Loaded {} order lines", history.len());

    // 3. FORECAST EVERY SKU
    let engine = ForecastEngine::with_seasonal_model(config.clone());
    let outcome = engine.forecast(&history, config.forecast_days)?;
    match &outcome {
        ForecastOutcome::NoHistory => {
            println!("No sales history to forecast from.");
            return Ok(());
        }
        ForecastOutcome::NoEligibleSkus { skipped } => {
            println!(
                "None of the {} SKUs has {} days of sales history.",
                skipped.len(),
                config.min_distinct_dates
            );
            return Ok(());
        }
        ForecastOutcome::Forecast { points, skipped } => {
            println!("Generated {} forecast points, skipped {} SKU(s)", points.len(), skipped.len());
        }
    }
    let points = outcome.points();

    // 4. SUMMARISE AND RECOMMEND
    let summaries = summarize(points, &config.summary_horizons, &history, &config.history_windows)?;
    let demand = demand_from_points(points);
    let inventory: Box<dyn InventoryLookup> = match args.get(2) {
        Some(path) => Box::new(history::load_inventory(Path::new(path), MissingInventory::Zero)?),
        None => Box::new(FixedInventory(config.default_current_inventory)),
    };
    let recommendations = recommend(&demand, config.forecast_days, config.safety_pct, inventory.as_ref())?;

    // 5. DEAD STOCK
    let as_of = global_max_date(&history).unwrap_or_default();
    let unsold = dead_stock::dead_stock(&history, as_of, &UnsoldBucket::ALL);
    let channels = sales::channel_summary(&history);

    // 6. EXPORT RESULTS
    reporting::write_csv(Path::new("forecast_results.csv"), points)?;
    std::fs::write("forecast_summary.csv", reporting::summary_csv(&summaries)?)?;
    reporting::write_csv(Path::new("inventory_recommendations.csv"), &recommendations)?;
    reporting::write_csv(Path::new("dead_stock.csv"), &unsold)?;
    reporting::write_csv(Path::new("channel_summary.csv"), &channels)?;

    // 7. PRINT REPORT
    println!("\n=== Purchase Orders ===");
    for row in recommendations.iter().filter(|r| r.po_quantity > 0) {
        println!(
            "{}: forecast {:.1}, recommended {:.1}, on hand {:.0} -> order {}",
            row.sku, row.forecast_qty, row.recommended_inventory, row.current_inventory, row.po_quantity
        );
    }
    let flagged = summaries.iter().filter(|s| s.has_negative_points).count();
    if flagged > 0 {
        println!("{} SKU(s) have negative forecast days", flagged);
    }

    println!("\n=== Unsold Stock (as of {}) ===", as_of);
    for (bucket, count) in dead_stock::bucket_counts(&unsold) {
        println!("{}: {}", bucket, count);
    }

    if !channels.is_empty() {
        println!("\n=== Sales by Channel ===");
        for row in &channels {
            println!("{}: {} order(s), {:.0} units", row.order_channel, row.total_orders, row.total_qty);
        }
    }

    println!("\nForecast Complete.");
    Ok(())
}

/// A year of orders for a few SKUs plus one too new to forecast.
fn demo_history() -> Vec<Observation> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let products = [
        ("BTL-001", "Water Bottle", "Kitchen", 12.0, 3.0, 0.9),
        ("CHG-200", "USB Charger", "Electronics", 5.0, 2.0, 0.7),
        ("TNT-050", "Pop-up Tent", "Outdoor", 2.0, 1.0, 0.3),
    ];

    let mut rows = Vec::new();
    for (seed, (sku, name, category, mean, std_dev, p)) in products.iter().enumerate() {
        rows.extend(
            history::generate_seasonal_history(sku, start, 365, *mean, *std_dev, *p, seed as u64)
                .into_iter()
                .map(|o| o.with_details(*name, *category)),
        );
    }
    let late_start = start + chrono::Duration::days(355);
    rows.extend(
        history::generate_constant_history("NEW-999", late_start, 10, 1.0)
            .into_iter()
            .map(|o| o.with_details("Sample Pack", "Kitchen")),
    );

    // One order per line, spread over the sales channels
    const CHANNELS: [&str; 3] = ["Web", "Marketplace", "Retail"];
    rows.into_iter()
        .enumerate()
        .map(|(i, o)| o.with_order(format!("ORD-{:05}", i), CHANNELS[i % CHANNELS.len()]))
        .collect()
}
