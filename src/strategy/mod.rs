pub mod implementations;
pub mod inventory;
pub mod traits;
