// src/strategy/implementations.rs

use crate::error::FitError;
use crate::model::holidays::HolidayCalendar;
use crate::model::observation::DailySeries;
use crate::simulation::config::ModelConfig;
use crate::strategy::traits::SeriesModel;
use augurs::prophet::wasmstan::WasmstanOptimizer;
use augurs::prophet::{
    Holiday, HolidayOccurrence, PredictionData, Prophet, ProphetOptions, SeasonalityOption, TimestampSeconds,
    TrainingData,
};
use chrono::{NaiveDate, NaiveTime};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::num::NonZeroU32;
use std::time::Instant;

const SECONDS_PER_DAY: TimestampSeconds = 86_400;

/// Shortest history, in days, on which a yearly cycle is fitted.
pub const MIN_YEARLY_SPAN_DAYS: i64 = 365;

// =========================================================================
// Seasonal Regression (Prophet)
// =========================================================================

/// Additive decomposition `trend + yearly + weekly + holidays`, fitted with
/// the Prophet model from `augurs`.
///
/// The trend is piecewise linear with sparse changepoints, seasonality is a
/// Fourier series and each holiday name gets its own effect. The fit is a
/// MAP estimate run through the bundled Stan optimiser.
#[derive(Debug, Clone, Default)]
pub struct SeasonalRegression {
    config: ModelConfig,
}

impl SeasonalRegression {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    /// Yearly seasonality needs a full cycle of history; shorter series
    /// would extrapolate an unconstrained Fourier fit.
    fn options(&self, series: &DailySeries, holidays: &HolidayCalendar) -> ProphetOptions {
        let span = match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) => (last - first).num_days(),
            _ => 0,
        };
        let yearly = self.config.yearly_seasonality && span >= MIN_YEARLY_SPAN_DAYS;
        ProphetOptions {
            yearly_seasonality: seasonality(yearly, self.config.yearly_fourier_order),
            weekly_seasonality: seasonality(self.config.weekly_seasonality, self.config.weekly_fourier_order),
            daily_seasonality: SeasonalityOption::Manual(false),
            holidays: prophet_holidays(holidays),
            ..Default::default()
        }
    }
}

fn seasonality(enabled: bool, order: u32) -> SeasonalityOption {
    if enabled {
        SeasonalityOption::Fourier(
            NonZeroU32::new(order).expect("enabled seasonality has a nonzero Fourier order"),
        )
    } else {
        SeasonalityOption::Manual(false)
    }
}

/// Midnight UTC of `date`, the timestamp Prophet sees for a daily bucket.
fn timestamp(date: NaiveDate) -> TimestampSeconds {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// One Prophet holiday per name, each occurrence covering its whole day.
fn prophet_holidays(calendar: &HolidayCalendar) -> HashMap<String, Holiday> {
    let mut by_name: BTreeMap<&str, Vec<HolidayOccurrence>> = BTreeMap::new();
    for holiday in calendar.holidays() {
        let start = timestamp(holiday.date);
        by_name
            .entry(holiday.name.as_str())
            .or_default()
            .push(HolidayOccurrence::new(start, start + SECONDS_PER_DAY));
    }
    by_name
        .into_iter()
        .map(|(name, occurrences)| (name.to_string(), Holiday::new(occurrences)))
        .collect()
}

fn check_deadline(deadline: Option<Instant>) -> Result<(), FitError> {
    match deadline {
        Some(d) if Instant::now() >= d => Err(FitError::TimedOut),
        _ => Ok(()),
    }
}

fn model_error(err: impl Display) -> FitError {
    FitError::Model(err.to_string())
}

impl SeriesModel for SeasonalRegression {
    /// The Stan optimiser cannot be interrupted, so the deadline is checked
    /// before fitting and again once the fit returns.
    fn forecast(
        &self,
        series: &DailySeries,
        holidays: &HolidayCalendar,
        dates: &[NaiveDate],
        deadline: Option<Instant>,
    ) -> Result<Vec<f64>, FitError> {
        let points = series.points();
        if points.len() < 2 {
            return Err(FitError::TooFewObservations {
                required: 2,
                actual: points.len(),
            });
        }
        if let Some((date, _)) = points.iter().find(|(_, y)| !y.is_finite()) {
            return Err(FitError::NonFiniteObservation(*date));
        }
        check_deadline(deadline)?;

        if dates.is_empty() {
            return Ok(Vec::new());
        }
        // Nothing to scale against; a SKU that never sold keeps not selling.
        if points.iter().all(|(_, y)| *y == 0.0) {
            return Ok(vec![0.0; dates.len()]);
        }

        // 1. Fit on observed dates only
        let ds: Vec<TimestampSeconds> = points.iter().map(|(d, _)| timestamp(*d)).collect();
        let y: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
        let data = TrainingData::new(ds, y).map_err(model_error)?;

        let mut prophet = Prophet::new(self.options(series, holidays), WasmstanOptimizer::new());
        prophet.fit(data, Default::default()).map_err(model_error)?;
        check_deadline(deadline)?;

        // 2. Predict the requested days
        let future = PredictionData::new(dates.iter().map(|d| timestamp(*d)).collect());
        let predictions = prophet.predict(future).map_err(model_error)?;
        Ok(predictions.yhat.point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::holidays::Country;
    use chrono::{Datelike, Duration, Weekday};
    use std::time::Duration as StdDuration;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn series_from(values: impl IntoIterator<Item = (i64, f64)>) -> DailySeries {
        DailySeries::from_pairs(
            "SKU",
            values
                .into_iter()
                .map(|(offset, y)| (start() + Duration::days(offset), y)),
        )
    }

    fn future(after: NaiveDate, days: i64) -> Vec<NaiveDate> {
        (1..=days).map(|i| after + Duration::days(i)).collect()
    }

    #[test]
    fn timestamps_are_utc_midnight() {
        assert_eq!(timestamp(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()), SECONDS_PER_DAY);
        assert_eq!(timestamp(start()), 1_704_067_200);
    }

    #[test]
    fn holidays_are_grouped_by_name() {
        let calendar = HolidayCalendar::for_years(Country::UnitedKingdom, 2023..=2024);
        let converted = prophet_holidays(&calendar);
        assert_eq!(converted.len(), calendar.names().len());
        assert!(converted.contains_key("Christmas Day"));
    }

    #[test]
    fn yearly_cycle_needs_a_year_of_history() {
        let model = SeasonalRegression::default();
        let holidays = HolidayCalendar::default();

        let short = series_from((0..60).map(|i| (i, 1.0)));
        let opts = model.options(&short, &holidays);
        assert!(matches!(opts.yearly_seasonality, SeasonalityOption::Manual(false)));
        assert!(matches!(opts.weekly_seasonality, SeasonalityOption::Fourier(n) if n.get() == 3));

        let long = series_from([(0, 1.0), (MIN_YEARLY_SPAN_DAYS, 2.0)]);
        let opts = model.options(&long, &holidays);
        assert!(matches!(opts.yearly_seasonality, SeasonalityOption::Fourier(n) if n.get() == 10));
    }

    #[test]
    fn constant_series_forecasts_the_constant() {
        let series = series_from((0..35).map(|i| (i, 10.0)));
        let holidays = HolidayCalendar::for_years(Country::UnitedKingdom, 2024..=2024);
        let dates = future(series.last_date().unwrap(), 7);
        let preds = SeasonalRegression::default()
            .forecast(&series, &holidays, &dates, None)
            .unwrap();

        assert_eq!(preds.len(), 7);
        for p in preds {
            assert!((p - 10.0).abs() < 1.0, "prediction {} too far from 10", p);
        }
    }

    #[test]
    fn linear_trend_is_extrapolated() {
        let series = series_from((0..60).map(|i| (i, 5.0 + 0.5 * i as f64)));
        let config = ModelConfig {
            yearly_seasonality: false,
            weekly_seasonality: false,
            ..ModelConfig::default()
        };
        let dates = future(series.last_date().unwrap(), 10);
        let preds = SeasonalRegression::new(config)
            .forecast(&series, &HolidayCalendar::default(), &dates, None)
            .unwrap();

        // day 69 on the same line is 5 + 0.5 * 69 = 39.5
        assert!((preds[9] - 39.5).abs() < 2.0, "got {}", preds[9]);
        assert!(preds.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn weekly_pattern_is_recovered() {
        let series = series_from((0..84).map(|i| {
            let date = start() + Duration::days(i);
            let y = if date.weekday() == Weekday::Sat { 30.0 } else { 10.0 };
            (i, y)
        }));
        let config = ModelConfig {
            yearly_seasonality: false,
            ..ModelConfig::default()
        };
        let dates = future(series.last_date().unwrap(), 7);
        let preds = SeasonalRegression::new(config)
            .forecast(&series, &HolidayCalendar::default(), &dates, None)
            .unwrap();

        for (date, p) in dates.iter().zip(preds) {
            if date.weekday() == Weekday::Sat {
                assert!(p > 20.0, "saturday forecast {} too low", p);
            } else {
                assert!(p < 20.0, "{} forecast {} too high", date.weekday(), p);
            }
        }
    }

    #[test]
    fn repeated_fits_agree() {
        let series = series_from((0..45).map(|i| (i, (i % 5) as f64 + 3.0)));
        let holidays = HolidayCalendar::for_years(Country::UnitedKingdom, 2024..=2024);
        let model = SeasonalRegression::default();
        let dates = future(series.last_date().unwrap(), 14);

        let a = model.forecast(&series, &holidays, &dates, None).unwrap();
        let b = model.forecast(&series, &holidays, &dates, None).unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6, "{} != {}", x, y);
        }
    }

    #[test]
    fn all_zero_history_forecasts_zero() {
        let series = series_from((0..40).map(|i| (i, 0.0)));
        let dates = future(series.last_date().unwrap(), 3);
        let preds = SeasonalRegression::default()
            .forecast(&series, &HolidayCalendar::default(), &dates, None)
            .unwrap();
        assert_eq!(preds, vec![0.0; 3]);
    }

    #[test]
    fn rejects_degenerate_input() {
        let model = SeasonalRegression::default();
        let holidays = HolidayCalendar::default();
        let dates = future(start(), 3);

        let single = series_from([(0, 4.0)]);
        assert_eq!(
            model.forecast(&single, &holidays, &dates, None).unwrap_err(),
            FitError::TooFewObservations { required: 2, actual: 1 }
        );

        let with_nan = series_from([(0, 4.0), (1, f64::NAN), (2, 5.0)]);
        assert!(matches!(
            model.forecast(&with_nan, &holidays, &dates, None).unwrap_err(),
            FitError::NonFiniteObservation(_)
        ));
    }

    #[test]
    fn expired_deadline_times_out() {
        let series = series_from((0..40).map(|i| (i, 2.0)));
        let deadline = Instant::now() - StdDuration::from_millis(1);
        let result = SeasonalRegression::default().forecast(
            &series,
            &HolidayCalendar::default(),
            &future(start(), 3),
            Some(deadline),
        );
        assert_eq!(result.unwrap_err(), FitError::TimedOut);
    }
}
