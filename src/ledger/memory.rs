/// In-memory ledger store used by the test suite.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::error::AppError;
use crate::ledger::LedgerStore;

#[derive(Default)]
pub struct InMemoryLedgerStore {
    sets: Mutex<HashMap<String, HashSet<String>>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn add_member(&self, key: &str, member: &str) -> Result<(), AppError> {
        let mut sets = self.sets.lock().unwrap();
        sets.entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn remove_member(&self, key: &str, member: &str) -> Result<(), AppError> {
        let mut sets = self.sets.lock().unwrap();
        if let Some(set) = sets.get_mut(key) {
            set.remove(member);
        }
        Ok(())
    }

    async fn contains_member(&self, key: &str, member: &str) -> Result<bool, AppError> {
        let sets = self.sets.lock().unwrap();
        Ok(sets.get(key).map(|s| s.contains(member)).unwrap_or(false))
    }

    async fn delete_key(&self, key: &str) -> Result<(), AppError> {
        let mut sets = self.sets.lock().unwrap();
        sets.remove(key);
        Ok(())
    }

    async fn flush_all(&self) -> Result<(), AppError> {
        let mut sets = self.sets.lock().unwrap();
        sets.clear();
        Ok(())
    }
}
