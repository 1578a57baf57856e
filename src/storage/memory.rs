use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex, MutexGuard,
    },
};

use crate::{errors::CalendarError, ledger::BudgetState};

use super::{Result, StateStorage};

/// Default key the state is stored under.
pub const STORAGE_KEY: &str = "budgetcal-data";

/// Key-value storage holding serialized JSON, like browser local storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    key: String,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::with_key(STORAGE_KEY)
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Makes subsequent saves fail until switched off again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw payload stored under the key, if any.
    pub fn raw(&self) -> Option<String> {
        self.entries().get(&self.key).cloned()
    }

    pub fn set_raw(&self, payload: impl Into<String>) {
        self.entries().insert(self.key.clone(), payload.into());
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self) -> Result<Option<BudgetState>> {
        match self.raw() {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &BudgetState) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CalendarError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "storage quota exceeded",
            )));
        }
        let payload = serde_json::to_string(state)?;
        self.set_raw(payload);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
