use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimeUnit {
    Week,
    Month,
}

/// Fixed step between two occurrences of a periodic rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeInterval {
    pub every: u32,
    pub unit: TimeUnit,
}

impl TimeInterval {
    pub const fn weeks(every: u32) -> Self {
        Self {
            every,
            unit: TimeUnit::Week,
        }
    }

    pub const fn months(every: u32) -> Self {
        Self {
            every,
            unit: TimeUnit::Month,
        }
    }

    /// Advances `from` by one interval.
    ///
    /// Month steps keep the day of month and roll any overflow into the following
    /// month, so Jan 31 + 1 month is Mar 2 in a leap year and Mar 3 otherwise.
    pub fn next_date(&self, from: NaiveDate) -> NaiveDate {
        match self.unit {
            TimeUnit::Week => from + Duration::weeks(self.every as i64),
            TimeUnit::Month => add_months_rollover(from, self.every),
        }
    }

    pub fn label(&self) -> String {
        match (self.every, self.unit) {
            (1, TimeUnit::Week) => "Weekly".into(),
            (2, TimeUnit::Week) => "Biweekly".into(),
            (1, TimeUnit::Month) => "Monthly".into(),
            (n, unit) => format!("Every {} {:?}{}", n, unit, if n > 1 { "s" } else { "" }),
        }
    }
}

/// Adds `months` calendar months, spilling days the target month lacks into the next.
pub fn add_months_rollover(date: NaiveDate, months: u32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + months as i32;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let first = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(first) => first,
        None => return NaiveDate::MAX,
    };
    first + Duration::days(date.day0() as i64)
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_next| first_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Last calendar day of the month containing `date`.
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let days = days_in_month(date.year(), date.month());
    date.with_day(days).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_step_keeps_day_when_it_exists() {
        assert_eq!(TimeInterval::months(1).next_date(ymd(2024, 1, 15)), ymd(2024, 2, 15));
        assert_eq!(TimeInterval::months(1).next_date(ymd(2024, 12, 15)), ymd(2025, 1, 15));
    }

    #[test]
    fn month_step_rolls_overflow_forward() {
        assert_eq!(add_months_rollover(ymd(2024, 1, 31), 1), ymd(2024, 3, 2));
        assert_eq!(add_months_rollover(ymd(2025, 1, 31), 1), ymd(2025, 3, 3));
        assert_eq!(add_months_rollover(ymd(2024, 3, 31), 1), ymd(2024, 5, 1));
        assert_eq!(add_months_rollover(ymd(2024, 1, 30), 1), ymd(2024, 3, 1));
    }

    #[test]
    fn week_steps_cover_biweekly() {
        assert_eq!(TimeInterval::weeks(2).next_date(ymd(2024, 1, 1)), ymd(2024, 1, 15));
        assert_eq!(TimeInterval::weeks(2).label(), "Biweekly");
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(last_day_of_month(ymd(2024, 4, 10)), ymd(2024, 4, 30));
    }
}
