//! Month grid geometry and navigation for calendar views.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::errors::CalendarError;
use crate::ledger::time_interval::{days_in_month, last_day_of_month};

/// Shape of one calendar month as rendered in a Sunday-first grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthLayout {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    pub first_weekday: Weekday,
}

impl MonthLayout {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| CalendarError::InvalidDate(format!("{year:04}-{month:02}")))?;
        Ok(Self {
            year,
            month,
            days_in_month: days_in_month(year, month),
            first_weekday: first.weekday(),
        })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            days_in_month: days_in_month(date.year(), date.month()),
            first_weekday: date.with_day(1).unwrap_or(date).weekday(),
        }
    }

    /// Parses `YYYY-MM`.
    pub fn parse(raw: &str) -> Result<Self, CalendarError> {
        let invalid = || CalendarError::InvalidDate(format!("`{}` is not YYYY-MM", raw.trim()));
        let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        last_day_of_month(self.first_day())
    }

    /// Empty cells before day 1 in a Sunday-first week row.
    pub fn leading_blanks(&self) -> u32 {
        self.first_weekday.num_days_from_sunday()
    }

    pub fn next(&self) -> Self {
        match self.first_day().checked_add_months(chrono::Months::new(1)) {
            Some(date) => Self::containing(date),
            None => *self,
        }
    }

    pub fn previous(&self) -> Self {
        match self.first_day().checked_sub_months(chrono::Months::new(1)) {
            Some(date) => Self::containing(date),
            None => *self,
        }
    }

    pub fn title(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }

    /// `YYYY-MM`, the form accepted by [`MonthLayout::parse`].
    pub fn key(&self) -> String {
        self.first_day().format("%Y-%m").to_string()
    }
}

/// Days from `today` to the last day of its month; 0 on the last day itself.
pub fn days_until_month_end(today: NaiveDate) -> i64 {
    (last_day_of_month(today) - today).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn layout_matches_calendar() {
        let feb = MonthLayout::new(2024, 2).unwrap();
        assert_eq!(feb.days_in_month, 29);
        assert_eq!(feb.first_weekday, Weekday::Thu);
        assert_eq!(feb.leading_blanks(), 4);
        assert_eq!(feb.last_day(), ymd(2024, 2, 29));
        assert_eq!(feb.title(), "February 2024");
    }

    #[test]
    fn navigation_crosses_year_boundaries() {
        let dec = MonthLayout::new(2023, 12).unwrap();
        assert_eq!(dec.next(), MonthLayout::new(2024, 1).unwrap());
        assert_eq!(MonthLayout::new(2024, 1).unwrap().previous(), dec);
        assert_eq!(dec.next().key(), "2024-01");
        assert_eq!(MonthLayout::parse(&dec.key()).unwrap(), dec);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(MonthLayout::parse("2024-03").unwrap().month, 3);
        assert!(MonthLayout::parse("2024-13").is_err());
        assert!(MonthLayout::parse("March").is_err());
    }

    #[test]
    fn end_of_month_distance() {
        assert_eq!(days_until_month_end(ymd(2024, 1, 15)), 16);
        assert_eq!(days_until_month_end(ymd(2024, 1, 31)), 0);
    }
}
