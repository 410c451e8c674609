use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

pub trait DateBoundaries {
    fn start_of_month(&self) -> Option<Self>
    where
        Self: Sized;

    fn end_of_month(&self) -> Option<Self>
    where
        Self: Sized;

    fn start_of_week(&self) -> Option<Self>
    where
        Self: Sized;

    fn end_of_week(&self) -> Option<Self>
    where
        Self: Sized;

    /// The first `weekday` falling on or after this date.
    fn next_or_same(&self, weekday: Weekday) -> Option<Self>
    where
        Self: Sized;

    fn is_workday(&self) -> bool;
}

impl DateBoundaries for NaiveDate {
    fn start_of_month(&self) -> Option<Self> {
        self.with_day(1)
    }

    fn end_of_month(&self) -> Option<Self> {
        self.checked_add_months(Months::new(1))
            .and_then(|d| d.with_day(1))
            .and_then(|d| d.checked_sub_days(Days::new(1)))
    }

    fn start_of_week(&self) -> Option<Self> {
        let days = Days::new(self.weekday().num_days_from_monday().into());
        self.checked_sub_days(days)
    }

    fn end_of_week(&self) -> Option<Self> {
        let max_days = 6;
        let num_days = max_days - self.weekday().num_days_from_monday();
        self.checked_add_days(Days::new(num_days.into()))
    }

    fn next_or_same(&self, weekday: Weekday) -> Option<Self> {
        let target = weekday.num_days_from_monday();
        let current = self.weekday().num_days_from_monday();
        let num_days = (7 + target - current) % 7;
        self.checked_add_days(Days::new(num_days.into()))
    }

    fn is_workday(&self) -> bool {
        self.weekday().num_days_from_monday() < 5
    }
}
