use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::Config;
use crate::core::calendar::MonthLayout;
use crate::core::services::{
    HorizonSummary, MonthView, ProjectionService, ServiceResult, TransactionService,
};
use crate::core::time::Clock;
use crate::ledger::{BudgetState, DayBucket, Transaction, TransactionDraft, TransactionId};
use crate::storage::{load_or_default, DebouncedWriter, SaveOutcome, SaveStatus, StateStorage};

/// Facade that coordinates budget state, debounced persistence, and the clock.
///
/// Every successful mutation hands a snapshot to the writer; reads never touch storage.
pub struct BudgetManager {
    state: BudgetState,
    writer: DebouncedWriter,
    clock: Box<dyn Clock>,
    horizon_days: Vec<i64>,
}

impl BudgetManager {
    /// Loads saved state (or defaults) and starts the background writer.
    pub fn open(storage: Arc<dyn StateStorage>, config: &Config, clock: Box<dyn Clock>) -> Self {
        let state = load_or_default(storage.as_ref(), config.default_starting_balance);
        let writer = DebouncedWriter::new(storage, config.save_delay(), config.status_reset());
        Self {
            state,
            writer,
            clock,
            horizon_days: config.horizon_days.clone(),
        }
    }

    pub fn state(&self) -> &BudgetState {
        &self.state
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn transactions(&self) -> Vec<&Transaction> {
        TransactionService::list(&self.state)
    }

    pub fn add_transaction(&mut self, draft: &TransactionDraft) -> ServiceResult<TransactionId> {
        let id = TransactionService::add(&mut self.state, draft, self.clock.as_ref())?;
        self.persist();
        Ok(id)
    }

    pub fn update_transaction(
        &mut self,
        id: TransactionId,
        draft: &TransactionDraft,
    ) -> ServiceResult<()> {
        TransactionService::update(&mut self.state, id, draft)?;
        self.persist();
        Ok(())
    }

    pub fn remove_transaction(&mut self, id: TransactionId) -> ServiceResult<Transaction> {
        let removed = TransactionService::remove(&mut self.state, id)?;
        self.persist();
        Ok(removed)
    }

    /// Records the true balance as of `as_of`, defaulting to today.
    pub fn set_starting_balance(
        &mut self,
        amount: f64,
        as_of: Option<NaiveDate>,
    ) -> ServiceResult<()> {
        let as_of = as_of.unwrap_or_else(|| self.today());
        TransactionService::set_starting_balance(&mut self.state, amount, as_of)?;
        self.persist();
        Ok(())
    }

    pub fn month_view(&self, layout: MonthLayout) -> MonthView {
        ProjectionService::month_view(&self.state, layout, self.today())
    }

    pub fn day_view(&self, date: NaiveDate) -> DayBucket {
        ProjectionService::day_view(&self.state, date, self.today())
    }

    pub fn summary(&self) -> HorizonSummary {
        ProjectionService::horizons(&self.state, self.today(), &self.horizon_days)
    }

    pub fn save_status(&self) -> SaveStatus {
        self.writer.status()
    }

    /// Writes any pending change immediately.
    pub fn flush(&self) -> SaveOutcome {
        self.writer.flush()
    }

    fn persist(&self) {
        self.writer.submit(self.state.clone());
    }
}
