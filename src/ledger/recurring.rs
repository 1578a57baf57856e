//! Expansion of transaction rules into concrete calendar occurrences.

use chrono::NaiveDate;

use super::time_interval::TimeInterval;
use super::transaction::Transaction;

/// Stand-in end for open-ended rules; no realistic schedule outlives it.
pub fn far_future() -> NaiveDate {
    NaiveDate::from_ymd_opt(2099, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// Ascending occurrence dates of one rule inside a closed interval.
///
/// Each call to `next` hands out a fresh `NaiveDate`; the cursor is private to the
/// iterator and never shared with yielded values.
#[derive(Debug, Clone)]
pub struct Occurrences {
    cursor: Option<NaiveDate>,
    step: Option<TimeInterval>,
    start: NaiveDate,
    limit: NaiveDate,
}

impl Occurrences {
    pub fn new(transaction: &Transaction, start: NaiveDate, end: NaiveDate) -> Self {
        let step = transaction.recurring.interval();
        let limit = match step {
            Some(_) => end.min(transaction.end_date.unwrap_or_else(far_future)),
            None => end,
        };
        let cursor = if start > end {
            None
        } else {
            Some(transaction.date)
        };
        Self {
            cursor,
            step,
            start,
            limit,
        }
    }
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        loop {
            let current = self.cursor?;
            if current > self.limit {
                self.cursor = None;
                return None;
            }
            self.cursor = self.step.map(|step| step.next_date(current));
            if current >= self.start {
                return Some(current);
            }
        }
    }
}

/// Collects every occurrence of `transaction` within `[start, end]`.
pub fn occurrences(transaction: &Transaction, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    Occurrences::new(transaction, start, end).collect()
}

/// Whether `transaction` fires on `date`.
pub fn occurs_on(transaction: &Transaction, date: NaiveDate) -> bool {
    Occurrences::new(transaction, date, date).next().is_some()
}

/// Rules firing on `date`, in input order.
pub fn transactions_on(transactions: &[Transaction], date: NaiveDate) -> Vec<&Transaction> {
    transactions
        .iter()
        .filter(|txn| occurs_on(txn, date))
        .collect()
}
