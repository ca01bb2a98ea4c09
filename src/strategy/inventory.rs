// src/strategy/inventory.rs

use crate::error::{ForecastError, Result};
use std::collections::HashMap;
use std::fmt::Debug;

/// Source of current on-hand stock per SKU.
///
/// Implementations range from a flat placeholder to a table loaded from a
/// stock export.
pub trait InventoryLookup: Debug + Send + Sync {
    fn current_inventory(&self, sku: &str) -> Result<f64>;
}

/// Every SKU is assumed to hold the same quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedInventory(pub f64);

impl InventoryLookup for FixedInventory {
    fn current_inventory(&self, _sku: &str) -> Result<f64> {
        Ok(self.0)
    }
}

/// What to do when a SKU has no stock record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingInventory {
    #[default]
    Zero,
    Fail,
}

/// Per-SKU stock levels.
#[derive(Debug, Clone, Default)]
pub struct InventoryTable {
    levels: HashMap<String, f64>,
    missing: MissingInventory,
}

impl InventoryTable {
    pub fn new(missing: MissingInventory) -> Self {
        Self {
            levels: HashMap::new(),
            missing,
        }
    }

    pub fn with_missing(mut self, missing: MissingInventory) -> Self {
        self.missing = missing;
        self
    }

    pub fn insert(&mut self, sku: impl Into<String>, quantity: f64) {
        self.levels.insert(sku.into(), quantity);
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl FromIterator<(String, f64)> for InventoryTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            levels: iter.into_iter().collect(),
            missing: MissingInventory::default(),
        }
    }
}

impl InventoryLookup for InventoryTable {
    fn current_inventory(&self, sku: &str) -> Result<f64> {
        match (self.levels.get(sku), self.missing) {
            (Some(qty), _) => Ok(*qty),
            (None, MissingInventory::Zero) => Ok(0.0),
            (None, MissingInventory::Fail) => Err(ForecastError::MissingInventory(sku.to_string())),
        }
    }
}
