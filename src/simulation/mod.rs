pub mod config;
pub mod engine;
pub mod recommendation;
pub mod summary;
