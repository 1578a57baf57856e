//! Running-balance projection over expanded transaction rules.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::recurring::{far_future, Occurrences};
use super::transaction::Transaction;

/// Transactions landing on one calendar day and the balance at end of that day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket {
    /// `None` for days before the balance anchor; balances are never traced backward.
    pub balance: Option<f64>,
    pub transactions: Vec<Transaction>,
}

impl DayBucket {
    /// Net effect of the bucket's transactions on the running balance.
    pub fn net(&self) -> f64 {
        self.transactions.iter().map(Transaction::signed_amount).sum()
    }
}

/// Day-by-day projection keyed by calendar date, in chronological order.
pub type DayBalances = BTreeMap<NaiveDate, DayBucket>;

/// Projects the running balance for every day of `[min(balance_date, window_start), window_end]`.
///
/// Days before `balance_date` still report their transactions but carry no balance.
/// From `balance_date` on, each day's transactions are applied to a total seeded with
/// `starting_balance`.
pub fn range_balances(
    transactions: &[Transaction],
    starting_balance: f64,
    balance_date: NaiveDate,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> DayBalances {
    let start = balance_date.min(window_start);
    let mut days = DayBalances::new();
    if start > window_end {
        return days;
    }

    let mut buckets = bucket_occurrences(transactions, start, window_end);
    let mut running = starting_balance;
    for day in each_day(start, window_end) {
        let bucket: Vec<Transaction> = buckets
            .remove(&day)
            .unwrap_or_default()
            .into_iter()
            .cloned()
            .collect();
        let balance = if day < balance_date {
            None
        } else {
            running += bucket.iter().map(Transaction::signed_amount).sum::<f64>();
            Some(running)
        };
        days.insert(
            day,
            DayBucket {
                balance,
                transactions: bucket,
            },
        );
    }
    days
}

/// Running balance at the end of `today + days_out`, accumulated from `balance_date`.
///
/// The horizon is measured from `today` rather than the anchor so "30 days from now"
/// stays meaningful when the balance was last updated in the past. A target before
/// `balance_date` leaves `starting_balance` untouched. Targets past `far_future()`
/// are clamped to it.
pub fn future_balance(
    transactions: &[Transaction],
    starting_balance: f64,
    balance_date: NaiveDate,
    today: NaiveDate,
    days_out: i64,
) -> f64 {
    let target = Duration::try_days(days_out)
        .and_then(|offset| today.checked_add_signed(offset))
        .unwrap_or(if days_out < 0 {
            NaiveDate::MIN
        } else {
            far_future()
        })
        .min(far_future().max(today));
    balance_through(transactions, starting_balance, balance_date, target)
}

/// Running balance at the end of `target`, accumulated from `balance_date`.
pub fn balance_through(
    transactions: &[Transaction],
    starting_balance: f64,
    balance_date: NaiveDate,
    target: NaiveDate,
) -> f64 {
    if target < balance_date {
        return starting_balance;
    }
    let buckets = bucket_occurrences(transactions, balance_date, target);
    each_day(balance_date, target).fold(starting_balance, |running, day| {
        running
            + buckets
                .get(&day)
                .map(|bucket| bucket.iter().map(|txn| txn.signed_amount()).sum::<f64>())
                .unwrap_or(0.0)
    })
}

fn bucket_occurrences(
    transactions: &[Transaction],
    start: NaiveDate,
    end: NaiveDate,
) -> BTreeMap<NaiveDate, Vec<&Transaction>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&Transaction>> = BTreeMap::new();
    for txn in transactions {
        for date in Occurrences::new(txn, start, end) {
            buckets.entry(date).or_default().push(txn);
        }
    }
    buckets
}

fn each_day(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::transaction::{Recurring, TransactionKind};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn paycheck() -> Transaction {
        Transaction::new(1, TransactionKind::Income, "Paycheck", 500.0, ymd(2024, 1, 1))
            .with_recurring(Recurring::Biweekly)
    }

    #[test]
    fn every_day_is_reported() {
        let days = range_balances(&[], 100.0, ymd(2024, 2, 1), ymd(2024, 2, 1), ymd(2024, 2, 29));
        assert_eq!(days.len(), 29);
        assert!(days.values().all(|bucket| bucket.balance == Some(100.0)));
    }

    #[test]
    fn anchor_before_window_extends_the_range() {
        let days = range_balances(
            &[paycheck()],
            1000.0,
            ymd(2023, 12, 25),
            ymd(2024, 1, 1),
            ymd(2024, 1, 31),
        );
        assert_eq!(days.keys().next(), Some(&ymd(2023, 12, 25)));
        assert_eq!(days[&ymd(2023, 12, 31)].balance, Some(1000.0));
        assert_eq!(days[&ymd(2024, 1, 1)].balance, Some(1500.0));
    }

    #[test]
    fn days_before_anchor_have_no_balance_but_keep_transactions() {
        let days = range_balances(
            &[paycheck()],
            1000.0,
            ymd(2024, 1, 10),
            ymd(2024, 1, 1),
            ymd(2024, 1, 31),
        );
        let first = &days[&ymd(2024, 1, 1)];
        assert_eq!(first.balance, None);
        assert_eq!(first.transactions.len(), 1);
        assert_eq!(days[&ymd(2024, 1, 9)].balance, None);
        assert_eq!(days[&ymd(2024, 1, 10)].balance, Some(1000.0));
        assert_eq!(days[&ymd(2024, 1, 15)].balance, Some(1500.0));
    }

    #[test]
    fn same_day_transactions_keep_input_order() {
        let rent = Transaction::new(2, TransactionKind::Expense, "Rent", 800.0, ymd(2024, 1, 15));
        let days = range_balances(
            &[rent, paycheck()],
            0.0,
            ymd(2024, 1, 1),
            ymd(2024, 1, 1),
            ymd(2024, 1, 31),
        );
        let ids: Vec<_> = days[&ymd(2024, 1, 15)]
            .transactions
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(days[&ymd(2024, 1, 15)].balance, Some(200.0));
        assert_eq!(days[&ymd(2024, 1, 15)].net(), -300.0);
    }

    #[test]
    fn inverted_window_is_empty() {
        let days = range_balances(
            &[paycheck()],
            0.0,
            ymd(2024, 2, 1),
            ymd(2024, 2, 1),
            ymd(2024, 1, 1),
        );
        assert!(days.is_empty());
    }

    #[test]
    fn future_balance_before_anchor_is_starting_balance() {
        let value = future_balance(&[paycheck()], 250.0, ymd(2024, 3, 1), ymd(2024, 1, 1), 5);
        assert_eq!(value, 250.0);
    }

    #[test]
    fn future_balance_counts_from_today_not_anchor() {
        // Anchor two weeks back: both the 01-01 and 01-15 paychecks are included.
        let value = future_balance(&[paycheck()], 1000.0, ymd(2024, 1, 1), ymd(2024, 1, 15), 0);
        assert_eq!(value, 2000.0);
    }

    #[test]
    fn huge_horizons_clamp_to_far_future() {
        let anchor = ymd(2024, 1, 1);
        let through_sentinel = balance_through(&[paycheck()], 0.0, anchor, far_future());
        for days_out in [200_000_000, i64::MAX / 2, i64::MAX] {
            assert_eq!(
                future_balance(&[paycheck()], 0.0, anchor, anchor, days_out),
                through_sentinel,
                "{days_out} days out"
            );
        }
        assert_eq!(future_balance(&[paycheck()], 75.0, anchor, anchor, i64::MIN), 75.0);
    }
}
