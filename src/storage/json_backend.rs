use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{ledger::BudgetState, utils::paths::write_atomic};

use super::{Result, StateStorage};

/// Filesystem-backed JSON persistence for the budget state.
#[derive(Debug, Clone)]
pub struct JsonStateStorage {
    path: PathBuf,
}

impl JsonStateStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStorage for JsonStateStorage {
    fn load(&self) -> Result<Option<BudgetState>> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(serde_json::from_str(&data)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, state: &BudgetState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }
}
