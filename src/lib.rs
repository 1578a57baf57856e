#![doc(test(attr(deny(warnings))))]

//! Budget Calendar projects a running checking-account balance from one-time and
//! recurring income and expense rules.
//!
//! The engine lives in [`ledger`]: [`ledger::occurrences`] expands a rule over a date
//! window and [`ledger::range_balances`] / [`ledger::future_balance`] accumulate the
//! results from an anchored starting balance.
//!
//! ```
//! use budget_calendar::ledger::{range_balances, Recurring, Transaction, TransactionKind};
//! use chrono::NaiveDate;
//!
//! let jan = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
//! let paycheck = Transaction::new(1, TransactionKind::Income, "Paycheck", 500.0, jan(1))
//!     .with_recurring(Recurring::Biweekly);
//! let days = range_balances(&[paycheck], 1000.0, jan(1), jan(1), jan(31));
//! assert_eq!(days[&jan(14)].balance, Some(1500.0));
//! assert_eq!(days[&jan(15)].balance, Some(2000.0));
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("Budget Calendar tracing initialized.");
    });
}
