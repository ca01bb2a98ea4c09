//! Per-SKU demand forecasting and inventory recommendations.
//!
//! Order history is split by SKU, a seasonal regression with UK bank holiday
//! effects is fitted to each series, and the resulting daily forecasts are
//! rolled up into horizon totals and purchase-order quantities.

pub mod error;
pub mod io;
pub mod model;
pub mod simulation;
pub mod strategy;

pub use error::{FitError, ForecastError, Result};
pub use model::forecast::{
    ForecastOutcome, ForecastPoint, ForecastSummary, RecommendationRow, SkipReason, SkippedSku, SkuDemand,
};
pub use model::observation::Observation;
pub use simulation::config::ForecastConfig;
pub use simulation::engine::{forecast_multiple_skus, ForecastEngine};
pub use simulation::recommendation::recommend;
pub use simulation::summary::summarize;
pub use strategy::inventory::{FixedInventory, InventoryLookup, InventoryTable, MissingInventory};
