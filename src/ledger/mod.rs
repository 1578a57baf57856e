//! Budget rules, recurrence expansion, and balance projection.

pub mod balance;
pub mod recurring;
pub mod state;
pub mod time_interval;
pub mod transaction;

pub use balance::{balance_through, future_balance, range_balances, DayBalances, DayBucket};
pub use recurring::{far_future, occurrences, occurs_on, transactions_on, Occurrences};
pub use state::{BudgetState, DEFAULT_STARTING_BALANCE};
pub use time_interval::{TimeInterval, TimeUnit};
pub use transaction::{
    parse_amount, parse_date, Recurring, Transaction, TransactionDraft, TransactionId,
    TransactionKind, DATE_FORMAT,
};
