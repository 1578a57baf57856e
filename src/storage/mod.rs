pub mod debounce;
pub mod json_backend;
pub mod memory;

use serde::Serialize;

use crate::{errors::CalendarError, ledger::BudgetState};

pub type Result<T> = std::result::Result<T, CalendarError>;

/// Abstraction over persistence backends holding a single budget state.
pub trait StateStorage: Send + Sync {
    /// Returns `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<BudgetState>>;
    fn save(&self, state: &BudgetState) -> Result<()>;
}

/// Outcome of a save, shaped for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

impl From<Result<()>> for SaveOutcome {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => SaveOutcome::ok(),
            Err(err) => SaveOutcome::failed(err.to_string()),
        }
    }
}

/// Loads stored state, treating a read failure like a first run.
pub fn load_or_default(storage: &dyn StateStorage, default_starting_balance: f64) -> BudgetState {
    match storage.load() {
        Ok(Some(state)) => {
            tracing::info!(
                transactions = state.transactions.len(),
                "loaded budget state"
            );
            state
        }
        Ok(None) => {
            tracing::info!("no stored budget state; starting fresh");
            BudgetState::new(default_starting_balance)
        }
        Err(err) => {
            tracing::error!(error = %err, "unable to read saved budget data");
            BudgetState::new(default_starting_balance)
        }
    }
}

pub use debounce::{DebouncedWriter, SaveStatus};
pub use json_backend::JsonStateStorage;
pub use memory::MemoryStorage;
