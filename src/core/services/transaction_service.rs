//! Business logic helpers for managing budget rules and the balance anchor.

use chrono::NaiveDate;

use crate::core::services::{ServiceError, ServiceResult};
use crate::core::time::Clock;
use crate::errors::CalendarError;
use crate::ledger::{BudgetState, Transaction, TransactionDraft, TransactionId};

/// Provides validated CRUD helpers for budget transactions.
pub struct TransactionService;

impl TransactionService {
    /// Validates `draft`, assigns a fresh id, and appends the transaction.
    pub fn add(
        state: &mut BudgetState,
        draft: &TransactionDraft,
        clock: &dyn Clock,
    ) -> ServiceResult<TransactionId> {
        let id = state.next_id(clock.now_millis());
        let transaction = draft.validate(id)?;
        tracing::info!(id, name = %transaction.name, "transaction added");
        Ok(state.add_transaction(transaction))
    }

    /// Replaces the transaction identified by `id` in place, keeping its id.
    pub fn update(
        state: &mut BudgetState,
        id: TransactionId,
        draft: &TransactionDraft,
    ) -> ServiceResult<()> {
        let replacement = draft.validate(id)?;
        let txn = state
            .transaction_mut(id)
            .ok_or(CalendarError::TransactionNotFound(id))?;
        *txn = replacement;
        tracing::info!(id, "transaction updated");
        Ok(())
    }

    /// Removes the transaction identified by `id`, returning the removed instance.
    pub fn remove(state: &mut BudgetState, id: TransactionId) -> ServiceResult<Transaction> {
        let removed = state
            .remove_transaction(id)
            .ok_or(CalendarError::TransactionNotFound(id))?;
        tracing::info!(id, "transaction removed");
        Ok(removed)
    }

    /// Records `amount` as the true balance on `as_of`.
    pub fn set_starting_balance(
        state: &mut BudgetState,
        amount: f64,
        as_of: NaiveDate,
    ) -> ServiceResult<()> {
        if !amount.is_finite() {
            return Err(ServiceError::Invalid(format!(
                "starting balance must be a finite number, got {amount}"
            )));
        }
        state.starting_balance = amount;
        state.balance_date = Some(as_of);
        tracing::info!(amount, %as_of, "starting balance updated");
        Ok(())
    }

    /// Transactions ordered by start date, then id.
    pub fn list(state: &BudgetState) -> Vec<&Transaction> {
        let mut items: Vec<&Transaction> = state.transactions.iter().collect();
        items.sort_by_key(|txn| (txn.date, txn.id));
        items
    }
}
