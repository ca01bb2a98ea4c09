pub mod forecast;
pub mod holidays;
pub mod observation;
