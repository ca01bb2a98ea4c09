pub mod dead_stock;
pub mod filter;
pub mod history;
pub mod reporting;
pub mod sales;
