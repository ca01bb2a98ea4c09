// src/model/holidays.rs

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Country {
    /// England & Wales bank holidays.
    #[default]
    #[serde(rename = "UK", alias = "GB")]
    UnitedKingdom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

/// Fixed set of public holidays shared by every SKU model in a run.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    holidays: Vec<Holiday>,
    names: Vec<String>,
}

impl HolidayCalendar {
    pub fn for_years(country: Country, years: RangeInclusive<i32>) -> Self {
        let mut holidays = Vec::new();
        for year in years {
            match country {
                Country::UnitedKingdom => uk_bank_holidays(year, &mut holidays),
            }
        }
        Self::from_holidays(holidays)
    }

    /// Calendar spanning every year touched by `start..=end`.
    pub fn covering(country: Country, start: NaiveDate, end: NaiveDate) -> Self {
        let (first, last) = if start <= end {
            (start.year(), end.year())
        } else {
            (end.year(), start.year())
        };
        Self::for_years(country, first..=last)
    }

    pub fn from_holidays(mut holidays: Vec<Holiday>) -> Self {
        holidays.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
        holidays.dedup();

        let names: Vec<String> = holidays
            .iter()
            .map(|h| h.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self { holidays, names }
    }

    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }

    /// Distinct holiday names, sorted. Each gets its own model effect.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }
}

/// Gregorian Easter Sunday (anonymous algorithm).
pub fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    ymd(year, month as u32, day as u32)
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn first_weekday_of(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, 1).unwrap_or(NaiveDate::MIN)
}

fn last_weekday_of(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    let next_month = if month == 12 {
        ymd(year + 1, 1, 1)
    } else {
        ymd(year, month + 1, 1)
    };
    let mut date = next_month - Duration::days(1);
    while date.weekday() != weekday {
        date -= Duration::days(1);
    }
    date
}

fn push(out: &mut Vec<Holiday>, date: NaiveDate, name: &str) {
    out.push(Holiday {
        date,
        name: name.to_string(),
    });
}

fn uk_bank_holidays(year: i32, out: &mut Vec<Holiday>) {
    // New Year's Day, moved to the following Monday when it falls on a weekend.
    let new_year = ymd(year, 1, 1);
    push(out, new_year, "New Year's Day");
    match new_year.weekday() {
        Weekday::Sat => push(out, new_year + Duration::days(2), "New Year's Day (observed)"),
        Weekday::Sun => push(out, new_year + Duration::days(1), "New Year's Day (observed)"),
        _ => {}
    }

    let easter = easter_sunday(year);
    push(out, easter - Duration::days(2), "Good Friday");
    push(out, easter + Duration::days(1), "Easter Monday");

    let early_may = match year {
        1995 | 2020 => ymd(year, 5, 8),
        _ => first_weekday_of(year, 5, Weekday::Mon),
    };
    push(out, early_may, "May Day");

    let spring = match year {
        2002 => ymd(2002, 6, 4),
        2012 => ymd(2012, 6, 4),
        2022 => ymd(2022, 6, 2),
        _ => last_weekday_of(year, 5, Weekday::Mon),
    };
    push(out, spring, "Spring Bank Holiday");

    push(out, last_weekday_of(year, 8, Weekday::Mon), "Late Summer Bank Holiday");

    let christmas = ymd(year, 12, 25);
    let boxing = ymd(year, 12, 26);
    push(out, christmas, "Christmas Day");
    push(out, boxing, "Boxing Day");
    match christmas.weekday() {
        Weekday::Fri => push(out, ymd(year, 12, 28), "Boxing Day (observed)"),
        Weekday::Sat => {
            push(out, ymd(year, 12, 27), "Christmas Day (observed)");
            push(out, ymd(year, 12, 28), "Boxing Day (observed)");
        }
        Weekday::Sun => push(out, ymd(year, 12, 27), "Christmas Day (observed)"),
        _ => {}
    }

    let one_off: Vec<(NaiveDate, &str)> = match year {
        1999 => vec![(ymd(1999, 12, 31), "Millennium Celebrations")],
        2002 => vec![(ymd(2002, 6, 3), "Golden Jubilee of Elizabeth II")],
        2011 => vec![(ymd(2011, 4, 29), "Wedding of William and Catherine")],
        2012 => vec![(ymd(2012, 6, 5), "Diamond Jubilee of Elizabeth II")],
        2022 => vec![
            (ymd(2022, 6, 3), "Platinum Jubilee of Elizabeth II"),
            (ymd(2022, 9, 19), "State Funeral of Queen Elizabeth II"),
        ],
        2023 => vec![(ymd(2023, 5, 8), "Coronation of Charles III")],
        _ => Vec::new(),
    };
    for (date, name) in one_off {
        push(out, date, name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dates_named(cal: &HolidayCalendar, name: &str) -> Vec<NaiveDate> {
        cal.holidays()
            .iter()
            .filter(|h| h.name == name)
            .map(|h| h.date)
            .collect()
    }

    #[test]
    fn easter_matches_known_dates() {
        assert_eq!(easter_sunday(2023), d(2023, 4, 9));
        assert_eq!(easter_sunday(2024), d(2024, 3, 31));
        assert_eq!(easter_sunday(2025), d(2025, 4, 20));
        assert_eq!(easter_sunday(2026), d(2026, 4, 5));
    }

    #[test]
    fn uk_2024_bank_holidays() {
        let cal = HolidayCalendar::for_years(Country::UnitedKingdom, 2024..=2024);
        let dates: Vec<NaiveDate> = cal.holidays().iter().map(|h| h.date).collect();
        assert_eq!(
            dates,
            vec![
                d(2024, 1, 1),
                d(2024, 3, 29),
                d(2024, 4, 1),
                d(2024, 5, 6),
                d(2024, 5, 27),
                d(2024, 8, 26),
                d(2024, 12, 25),
                d(2024, 12, 26),
            ]
        );
    }

    #[test]
    fn weekend_christmas_gets_substitute_days() {
        // 2022: Christmas on a Sunday
        let cal = HolidayCalendar::for_years(Country::UnitedKingdom, 2022..=2022);
        assert_eq!(dates_named(&cal, "Christmas Day (observed)"), vec![d(2022, 12, 27)]);
        assert!(dates_named(&cal, "Boxing Day (observed)").is_empty());

        // 2021: Christmas on a Saturday
        let cal = HolidayCalendar::for_years(Country::UnitedKingdom, 2021..=2021);
        assert_eq!(dates_named(&cal, "Christmas Day (observed)"), vec![d(2021, 12, 27)]);
        assert_eq!(dates_named(&cal, "Boxing Day (observed)"), vec![d(2021, 12, 28)]);
    }

    #[test]
    fn one_off_holidays_are_included() {
        let cal = HolidayCalendar::for_years(Country::UnitedKingdom, 2022..=2023);
        assert_eq!(dates_named(&cal, "Spring Bank Holiday"), vec![d(2022, 6, 2), d(2023, 5, 29)]);
        assert_eq!(dates_named(&cal, "Coronation of Charles III"), vec![d(2023, 5, 8)]);
        assert_eq!(
            dates_named(&cal, "State Funeral of Queen Elizabeth II"),
            vec![d(2022, 9, 19)]
        );
    }

    #[test]
    fn covering_spans_every_year_in_range() {
        let cal = HolidayCalendar::covering(Country::UnitedKingdom, d(2023, 6, 1), d(2025, 2, 1));
        let years: BTreeSet<i32> = cal.holidays().iter().map(|h| h.date.year()).collect();
        assert_eq!(years.into_iter().collect::<Vec<_>>(), vec![2023, 2024, 2025]);
    }

    #[test]
    fn names_are_distinct_across_years() {
        let cal = HolidayCalendar::for_years(Country::UnitedKingdom, 2023..=2024);
        let christmas = cal.names().iter().filter(|n| *n == "Christmas Day").count();
        assert_eq!(christmas, 1);
        assert!(cal.names().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(dates_named(&cal, "Christmas Day").len(), 2);
    }
}
