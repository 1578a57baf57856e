use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::transaction::{Transaction, TransactionId, DATE_FORMAT};

/// Balance assumed when stored data carries no usable one.
pub const DEFAULT_STARTING_BALANCE: f64 = 1000.0;

/// Persisted budget: the flat rule collection plus the balance anchor.
///
/// Loading is lenient per field: a missing or malformed balance or anchor falls back
/// to its default without discarding the stored transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetState {
    #[serde(default, deserialize_with = "deserialize_transactions")]
    pub transactions: Vec<Transaction>,
    #[serde(
        default = "default_starting_balance",
        deserialize_with = "deserialize_starting_balance"
    )]
    pub starting_balance: f64,
    /// Day on which `starting_balance` was true. Absent in files written before the
    /// anchor was tracked; callers substitute today.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_balance_date"
    )]
    pub balance_date: Option<NaiveDate>,
}

fn default_starting_balance() -> f64 {
    DEFAULT_STARTING_BALANCE
}

fn deserialize_transactions<'de, D>(deserializer: D) -> Result<Vec<Transaction>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Transaction>>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_starting_balance<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match value.filter(|balance| balance.is_finite()) {
        Some(balance) => Ok(balance),
        None => {
            tracing::warn!(
                fallback = DEFAULT_STARTING_BALANCE,
                "stored starting balance is not numeric; using the default"
            );
            Ok(DEFAULT_STARTING_BALANCE)
        }
    }
}

fn deserialize_balance_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let date = match Value::deserialize(deserializer)? {
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => match NaiveDate::parse_from_str(text.trim(), DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(err) => {
                tracing::warn!(value = %text, error = %err, "ignoring unreadable balance date");
                None
            }
        },
        Value::Null => None,
        other => {
            tracing::warn!(value = %other, "ignoring unreadable balance date");
            None
        }
    };
    Ok(date)
}

impl BudgetState {
    pub fn new(starting_balance: f64) -> Self {
        Self {
            transactions: Vec::new(),
            starting_balance,
            balance_date: None,
        }
    }

    /// Anchor date, falling back to `today` when none was recorded.
    pub fn anchor(&self, today: NaiveDate) -> NaiveDate {
        self.balance_date.unwrap_or(today)
    }

    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_mut(&mut self, id: TransactionId) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|txn| txn.id == id)
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> TransactionId {
        let id = transaction.id;
        self.transactions.push(transaction);
        id
    }

    pub fn remove_transaction(&mut self, id: TransactionId) -> Option<Transaction> {
        let index = self.transactions.iter().position(|txn| txn.id == id)?;
        Some(self.transactions.remove(index))
    }

    /// Next identifier: the creation timestamp in milliseconds, bumped past any
    /// existing id so rapid inserts never collide.
    pub fn next_id(&self, now_millis: u64) -> TransactionId {
        let after_existing = self
            .transactions
            .iter()
            .map(|txn| txn.id)
            .max()
            .map(|max| max + 1)
            .unwrap_or(0);
        now_millis.max(after_existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::transaction::TransactionKind;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn loads_files_without_balance_date() {
        let state: BudgetState = serde_json::from_value(json!({
            "transactions": [],
            "startingBalance": 1000
        }))
        .unwrap();
        assert_eq!(state.balance_date, None);
        assert_eq!(state.anchor(ymd(2024, 5, 1)), ymd(2024, 5, 1));
    }

    #[test]
    fn malformed_balance_keeps_transactions() {
        let rule = json!({
            "id": 7, "type": "income", "name": "Pay", "amount": 100,
            "date": "2024-01-05", "recurring": "weekly", "endDate": ""
        });
        for balance in [json!("abc"), Value::Null, json!({ "nested": true })] {
            let state: BudgetState = serde_json::from_value(json!({
                "transactions": [rule.clone()],
                "startingBalance": balance
            }))
            .unwrap();
            assert_eq!(state.transactions.len(), 1);
            assert_eq!(state.starting_balance, DEFAULT_STARTING_BALANCE);
        }

        let numeric_text: BudgetState = serde_json::from_value(json!({
            "transactions": [rule.clone()],
            "startingBalance": "1200"
        }))
        .unwrap();
        assert_eq!(numeric_text.starting_balance, 1200.0);

        let missing: BudgetState =
            serde_json::from_value(json!({ "transactions": [rule] })).unwrap();
        assert_eq!(missing.transactions.len(), 1);
        assert_eq!(missing.starting_balance, DEFAULT_STARTING_BALANCE);
    }

    #[test]
    fn null_transactions_and_bad_anchor_load_as_empty() {
        let state: BudgetState = serde_json::from_value(json!({
            "transactions": null,
            "startingBalance": 50,
            "balanceDate": "someday"
        }))
        .unwrap();
        assert!(state.transactions.is_empty());
        assert_eq!(state.starting_balance, 50.0);
        assert_eq!(state.balance_date, None);
    }

    #[test]
    fn next_id_never_collides() {
        let mut state = BudgetState::new(0.0);
        let first = state.next_id(1_000);
        state.add_transaction(Transaction::new(
            first,
            TransactionKind::Expense,
            "A",
            1.0,
            ymd(2024, 1, 1),
        ));
        let second = state.next_id(1_000);
        assert_eq!(first, 1_000);
        assert_eq!(second, 1_001);
        assert_eq!(state.next_id(5_000), 5_000);
    }

    #[test]
    fn remove_returns_the_transaction() {
        let mut state = BudgetState::new(0.0);
        state.add_transaction(Transaction::new(
            4,
            TransactionKind::Income,
            "B",
            2.0,
            ymd(2024, 1, 1),
        ));
        assert_eq!(state.remove_transaction(4).map(|t| t.name), Some("B".into()));
        assert!(state.remove_transaction(4).is_none());
    }
}
