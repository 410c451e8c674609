use std::fmt;

use chrono::{
    Datelike, Duration, Local, Month, Months, NaiveDate, NaiveDateTime,
};

use crate::calendar::DateBoundaries;
use crate::error::OptionError;

/// Source of the current time, substituted with a fixed instant in tests.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A calendar month with its first and last day.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct MonthYear {
    pub month: Month,
    pub year: i32,
    first: NaiveDate,
    last: NaiveDate,
}

impl MonthYear {
    pub fn new(year: i32, month: Month) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month.number_from_month(), 1)?;
        let last = first.end_of_month()?;
        Some(Self {
            month,
            year,
            first,
            last,
        })
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.month.name(), self.year)
    }
}

/// Accepts 1-12, a full English month name, or a three letter
/// abbreviation, ignoring case.
pub fn parse_month(token: &str) -> Result<Month, OptionError> {
    let invalid = || OptionError::InvalidMonth {
        token: token.to_string(),
    };
    let trimmed = token.trim();

    if let Ok(number) = trimmed.parse::<u8>() {
        return Month::try_from(number).map_err(|_| invalid());
    }
    if trimmed.chars().all(|c| c.is_ascii_digit() || c == '-' || c == '+')
        && !trimmed.is_empty()
    {
        return Err(invalid());
    }

    // chrono accepts exactly the short or the long name, in any case
    trimmed.parse::<Month>().map_err(|_| invalid())
}

/// Resolve the month to invoice for.
///
/// Without a month token the month before `now` is used, in its own year
/// unless `year` overrides it. With a token and no year, the year placing
/// the month closest to `now` is chosen. A year of zero counts as absent.
pub fn resolve(
    token: Option<&str>,
    year: Option<i32>,
    now: NaiveDateTime,
) -> Result<MonthYear, OptionError> {
    let year = year.filter(|y| *y != 0);
    let token = token.filter(|t| !t.trim().is_empty());

    let (month, year) = match token {
        None => {
            let previous = now
                .date()
                .start_of_month()
                .and_then(|d| d.checked_sub_months(Months::new(1)))
                .ok_or(OptionError::InvalidYear { year: now.year() })?;
            let month = month_of(previous);
            (month, year.unwrap_or(previous.year()))
        }
        Some(token) => {
            let month = parse_month(token)?;
            (month, year.unwrap_or_else(|| closest_year(month, now)))
        }
    };

    MonthYear::new(year, month).ok_or(OptionError::InvalidYear { year })
}

/// Among the previous, current and next year, the one whose first day of
/// `month` is nearest to `now`. Ties go to the earlier year.
pub fn closest_year(month: Month, now: NaiveDateTime) -> i32 {
    let current = now.year();
    let mut best: Option<(i32, Duration)> = None;

    for year in [current - 1, current, current + 1] {
        let Some(start) = MonthYear::new(year, month)
            .and_then(|m| m.first_day().and_hms_opt(0, 0, 0))
        else {
            continue;
        };
        let signed = now - start;
        let distance = if signed < Duration::zero() { -signed } else { signed };
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((year, distance));
        }
    }

    best.map_or(current, |(year, _)| year)
}

fn month_of(date: NaiveDate) -> Month {
    // month() is always within 1..=12
    Month::try_from(date.month() as u8).unwrap_or(Month::January)
}
