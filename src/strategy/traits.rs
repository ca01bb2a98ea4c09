// src/strategy/traits.rs

use crate::error::FitError;
use crate::model::holidays::HolidayCalendar;
use crate::model::observation::DailySeries;
use chrono::NaiveDate;
use std::fmt::Debug;
use std::time::Instant;

/// A per-SKU time-series model that the forecast engine fits and queries.
///
/// We require `Send` + `Sync` so one model definition can be shared by every
/// worker thread; each call fits an independent model and throws it away.
pub trait SeriesModel: Debug + Send + Sync {
    /// Fits the model to one SKU's daily history and predicts `dates`.
    ///
    /// # Arguments
    /// * `series` - The SKU's aggregated daily quantities.
    /// * `holidays` - The run-wide holiday calendar, shared by all SKUs.
    /// * `dates` - Days to predict; the result has one point per date, in order.
    /// * `deadline` - If set, the call gives up with `FitError::TimedOut` once passed.
    fn forecast(
        &self,
        series: &DailySeries,
        holidays: &HolidayCalendar,
        dates: &[NaiveDate],
        deadline: Option<Instant>,
    ) -> Result<Vec<f64>, FitError>;
}
