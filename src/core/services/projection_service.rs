//! Calendar and horizon projections built on the balance engine.

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::calendar::{days_until_month_end, MonthLayout};
use crate::ledger::{
    balance_through, future_balance, range_balances, transactions_on, BudgetState, DayBalances,
    DayBucket,
};

/// Balances for every day needed to render one calendar month.
#[derive(Debug, Clone)]
pub struct MonthView {
    pub layout: MonthLayout,
    pub balance_date: NaiveDate,
    /// Starts at the earlier of the month's first day and the balance anchor.
    pub days: DayBalances,
}

impl MonthView {
    /// Bucket for `day` of the displayed month.
    pub fn day(&self, day: u32) -> Option<&DayBucket> {
        let date = NaiveDate::from_ymd_opt(self.layout.year, self.layout.month, day)?;
        self.days.get(&date)
    }

    /// Buckets that fall inside the displayed month, in order.
    pub fn month_days(&self) -> impl Iterator<Item = (&NaiveDate, &DayBucket)> {
        self.days
            .range(self.layout.first_day()..=self.layout.last_day())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Horizon {
    pub days_out: i64,
    pub balance: f64,
}

/// Scalar projections shown next to the calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizonSummary {
    pub today: NaiveDate,
    pub balance_date: NaiveDate,
    pub current: f64,
    pub end_of_month: f64,
    pub horizons: Vec<Horizon>,
}

impl HorizonSummary {
    pub fn horizon(&self, days_out: i64) -> Option<f64> {
        self.horizons
            .iter()
            .find(|h| h.days_out == days_out)
            .map(|h| h.balance)
    }
}

pub struct ProjectionService;

impl ProjectionService {
    /// Projects the month described by `layout`, anchored at the recorded balance date
    /// or `today` when none was recorded.
    pub fn month_view(state: &BudgetState, layout: MonthLayout, today: NaiveDate) -> MonthView {
        let balance_date = state.anchor(today);
        let days = range_balances(
            &state.transactions,
            state.starting_balance,
            balance_date,
            layout.first_day(),
            layout.last_day(),
        );
        tracing::debug!(
            month = %layout.title(),
            %balance_date,
            days = days.len(),
            "month projected"
        );
        MonthView {
            layout,
            balance_date,
            days,
        }
    }

    /// Transactions and balance for a single date.
    pub fn day_view(state: &BudgetState, date: NaiveDate, today: NaiveDate) -> DayBucket {
        let balance_date = state.anchor(today);
        let balance = (date >= balance_date).then(|| {
            balance_through(
                &state.transactions,
                state.starting_balance,
                balance_date,
                date,
            )
        });
        DayBucket {
            balance,
            transactions: transactions_on(&state.transactions, date)
                .into_iter()
                .cloned()
                .collect(),
        }
    }

    /// End-of-month balance plus one projection per entry of `horizon_days`.
    pub fn horizons(state: &BudgetState, today: NaiveDate, horizon_days: &[i64]) -> HorizonSummary {
        let balance_date = state.anchor(today);
        let project = |days_out: i64| {
            future_balance(
                &state.transactions,
                state.starting_balance,
                balance_date,
                today,
                days_out,
            )
        };
        let summary = HorizonSummary {
            today,
            balance_date,
            current: state.starting_balance,
            end_of_month: project(days_until_month_end(today)),
            horizons: horizon_days
                .iter()
                .map(|&days_out| Horizon {
                    days_out,
                    balance: project(days_out),
                })
                .collect(),
        };
        tracing::debug!(
            end_of_month = summary.end_of_month,
            horizons = summary.horizons.len(),
            "horizons projected"
        );
        summary
    }
}
