use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, Weekday};
use num_format::{Locale, ToFormattedString};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::calendar::DateBoundaries;
use crate::month::MonthYear;

const WORKDAYS_PER_WEEK: u32 = 5;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Period {
    pub from: NaiveDate,
    pub until: NaiveDate,
}

impl Period {
    pub fn new(from: NaiveDate, until: NaiveDate) -> Self {
        Self { from, until }
    }

    pub fn working_days(&self) -> u32 {
        self.from
            .iter_days()
            .take_while(|d| d <= &self.until)
            .filter(|d| d.is_workday())
            .count() as u32
    }

    /// "Jan 6-12", or "Jan 30 - Feb 2" across a month boundary.
    pub fn label(&self) -> String {
        if (self.from.year(), self.from.month())
            == (self.until.year(), self.until.month())
        {
            format!(
                "{}-{}",
                self.from.format("%b %-d"),
                self.until.format("%-d")
            )
        } else {
            format!(
                "{} - {}",
                self.from.format("%b %-d"),
                self.until.format("%b %-d")
            )
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} to {}", self.from, self.until)
    }
}

/// One weekly line item. Hours are prorated by the workdays left in the
/// period once it is clamped to the invoiced month.
#[derive(Debug, PartialEq, Clone)]
pub struct Week {
    pub period: Period,
    pub hours: Decimal,
}

impl Week {
    fn prorated(period: Period, hours_per_week: Decimal) -> Self {
        let hours = hours_per_week * Decimal::from(period.working_days())
            / Decimal::from(WORKDAYS_PER_WEEK);
        Self { period, hours }
    }
}

/// Split a month into Monday to Sunday weeks. A week belongs to the month
/// holding its Wednesday and is clamped to the month. Days before the first
/// such week or after the last one are folded into it, so the weeks cover
/// the whole month.
pub fn weeks_for_month(month: MonthYear, hours_per_week: Decimal) -> Vec<Week> {
    let first = month.first_day();
    let last = month.last_day();

    let Some(first_wednesday) = first.next_or_same(Weekday::Wed) else {
        return Vec::new();
    };
    let wednesdays: Vec<NaiveDate> = first_wednesday
        .iter_weeks()
        .take_while(|wednesday| month.contains(*wednesday))
        .collect();
    let count = wednesdays.len();

    wednesdays
        .into_iter()
        .enumerate()
        .map(|(i, wednesday)| {
            let from = match wednesday.start_of_week() {
                Some(monday) if i > 0 => monday.max(first),
                _ => first,
            };
            let until = match wednesday.end_of_week() {
                Some(sunday) if i + 1 < count => sunday.min(last),
                _ => last,
            };
            Week::prorated(Period::new(from, until), hours_per_week)
        })
        .collect()
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Money(Decimal);

impl Money {
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    fn cents(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Dollars with thousands separators, e.g. "$10,800.00".
    pub fn grouped(&self) -> String {
        let cents = self.cents();
        let sign = if cents.is_sign_negative() { "-" } else { "" };
        let cents = cents.abs();
        let whole = cents.trunc().to_u64().unwrap_or_default();
        let fraction = (cents.fract() * Decimal::ONE_HUNDRED)
            .to_u64()
            .unwrap_or_default();
        format!(
            "{}${}.{:02}",
            sign,
            whole.to_formatted_string(&Locale::en),
            fraction
        )
    }
}

impl Add<Money> for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, other: Decimal) -> Self {
        Self(self.0 * other)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::default(), |acc, x| acc + x)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "${:.2}", self.cents())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Invoice {
    pub month: MonthYear,
    pub vendor: String,
    pub customer: String,
    pub rate: Money,
    pub weeks: Vec<Week>,
}

impl Invoice {
    pub fn new(
        month: MonthYear,
        vendor: String,
        customer: String,
        rate: Money,
        weeks: Vec<Week>,
    ) -> Self {
        Self {
            month,
            vendor,
            customer,
            rate,
            weeks,
        }
    }

    pub fn subtotal(&self, week: &Week) -> Money {
        self.rate * week.hours
    }

    pub fn total(&self) -> Money {
        self.weeks.iter().map(|w| self.subtotal(w)).sum()
    }

    pub fn total_hours(&self) -> Decimal {
        self.weeks.iter().map(|w| w.hours).sum()
    }

    /// "invoice-acme-corp-2025-01"
    pub fn file_stem(&self) -> String {
        format!(
            "invoice-{}-{}-{:02}",
            self.customer.replace(' ', "-").to_lowercase(),
            self.month.year,
            self.month.month.number_from_month()
        )
    }

    pub fn html_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.html", self.file_stem()))
    }

    pub fn pdf_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.pdf", self.file_stem()))
    }
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Invoice: {} to {}\n\
             Month: {}\n\n",
            self.vendor, self.customer, self.month,
        )?;

        for week in self.weeks.iter() {
            writeln!(
                f,
                "{} {:.1}h @ {}: {}",
                week.period.label(),
                week.hours.round_dp(1),
                self.rate.grouped(),
                self.subtotal(week).grouped()
            )?;
        }

        write!(f, "\nTotal: {}", self.total().grouped())
    }
}
