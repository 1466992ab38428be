use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::backend::storage::key_value::{FileStore, KeyValueStore, MemoryStore};
use crate::backend::storage::traits::{Connection, Revision, StorageError, Versioned};

use super::budget_repository::BudgetRepository;
use super::expense_repository::ExpenseRepository;
use super::user_repository::UserRepository;
use super::withdrawal_repository::WithdrawalRepository;

pub const USERS_KEY: &str = "famfin_users";
pub const EXPENSES_KEY: &str = "famfin_expenses";
pub const BUDGETS_KEY: &str = "famfin_budgets";
pub const WITHDRAWALS_KEY: &str = "famfin_system_withdrawals";

/// JsonConnection keeps every collection as a JSON array under a fixed key
#[derive(Clone)]
pub struct JsonConnection {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl JsonConnection {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Open a connection backed by JSON files in `data_directory`
    pub fn open<P: AsRef<Path>>(data_directory: P) -> Result<Self> {
        let store = FileStore::new(data_directory)?;
        info!(
            "Opened JSON storage at {}",
            store.base_directory().display()
        );
        Ok(Self::new(Arc::new(store)))
    }

    /// Create a connection that lives only in memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Whether the key has ever been written
    pub fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.store.get(key)?.is_some())
    }

    /// Read a collection; a missing key reads as an empty array
    pub fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Versioned<Vec<T>>> {
        let raw = self.store.get(key)?;
        let revision = Revision::of(raw.as_deref());

        let value = match raw {
            None => Vec::new(),
            Some(text) => serde_json::from_str(&text).map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })?,
        };

        Ok(Versioned { value, revision })
    }

    /// Write a collection if it is still at `expected`.
    ///
    /// Returns the new revision. On mismatch nothing is written and a
    /// [`StorageError::Conflict`] is returned.
    pub fn write_collection<T: Serialize>(
        &self,
        key: &str,
        items: &[T],
        expected: Revision,
    ) -> Result<Revision> {
        let _guard = self.lock()?;
        self.write_locked(key, items, Some(expected))
    }

    /// Write a collection regardless of its current revision
    pub fn overwrite_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<Revision> {
        let _guard = self.lock()?;
        self.write_locked(key, items, None)
    }

    /// Read a collection, apply `f` and write it back at the read revision.
    ///
    /// If `f` fails, nothing is written.
    pub fn modify<T, R, F>(&self, key: &str, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        self.modify_expecting(key, None, f)
    }

    /// Like [`modify`](Self::modify), but also fails with a conflict if the
    /// collection is no longer at `expected` when it is read.
    pub fn modify_expecting<T, R, F>(&self, key: &str, expected: Option<Revision>, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        let _guard = self.lock()?;

        let Versioned {
            value: mut items,
            revision,
        } = self.read_collection::<T>(key)?;

        if let Some(expected) = expected {
            if expected != revision {
                warn!("Stale revision for {}, refusing write", key);
                return Err(StorageError::Conflict {
                    key: key.to_string(),
                }
                .into());
            }
        }

        let result = f(&mut items)?;
        self.write_locked(key, &items, Some(revision))?;
        Ok(result)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| anyhow!("storage write lock poisoned"))
    }

    /// Caller must hold the write lock
    fn write_locked<T: Serialize>(
        &self,
        key: &str,
        items: &[T],
        expected: Option<Revision>,
    ) -> Result<Revision> {
        if let Some(expected) = expected {
            // Another process may have written since we read
            let current = Revision::of(self.store.get(key)?.as_deref());
            if current != expected {
                warn!("Revision mismatch on {}, refusing write", key);
                return Err(StorageError::Conflict {
                    key: key.to_string(),
                }
                .into());
            }
        }

        let text = serde_json::to_string(items)?;
        self.store.set(key, &text)?;
        debug!("Wrote {} records to {}", items.len(), key);
        Ok(Revision::of(Some(&text)))
    }
}

impl Connection for JsonConnection {
    type UserRepository = UserRepository;
    type ExpenseRepository = ExpenseRepository;
    type BudgetRepository = BudgetRepository;
    type WithdrawalRepository = WithdrawalRepository;

    fn create_user_repository(&self) -> Self::UserRepository {
        UserRepository::new(self.clone())
    }

    fn create_expense_repository(&self) -> Self::ExpenseRepository {
        ExpenseRepository::new(self.clone())
    }

    fn create_budget_repository(&self) -> Self::BudgetRepository {
        BudgetRepository::new(self.clone())
    }

    fn create_withdrawal_repository(&self) -> Self::WithdrawalRepository {
        WithdrawalRepository::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::json::test_utils::TestEnvironment;

    #[test]
    fn test_missing_key_reads_empty_at_absent_revision() {
        let connection = JsonConnection::in_memory();
        let snapshot = connection.read_collection::<String>("famfin_users").unwrap();
        assert!(snapshot.value.is_empty());
        assert_eq!(snapshot.revision, Revision::ABSENT);
        assert!(!connection.has_key("famfin_users").unwrap());
    }

    #[test]
    fn test_write_with_current_revision_succeeds() {
        let connection = JsonConnection::in_memory();
        let snapshot = connection.read_collection::<String>("k").unwrap();

        let items = vec!["a".to_string()];
        let revision = connection
            .write_collection("k", &items, snapshot.revision)
            .unwrap();

        let reread = connection.read_collection::<String>("k").unwrap();
        assert_eq!(reread.value, items);
        assert_eq!(reread.revision, revision);
    }

    #[test]
    fn test_stale_write_is_rejected_and_storage_left_intact() {
        let connection = JsonConnection::in_memory();
        let first = connection.read_collection::<String>("k").unwrap();

        connection
            .write_collection("k", &["winner".to_string()], first.revision)
            .unwrap();

        let err = connection
            .write_collection("k", &["stale".to_string()], first.revision)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StorageError>(),
            Some(StorageError::Conflict { .. })
        ));

        let stored = connection.read_collection::<String>("k").unwrap();
        assert_eq!(stored.value, vec!["winner".to_string()]);
    }

    #[test]
    fn test_modify_writes_nothing_when_closure_fails() {
        let connection = JsonConnection::in_memory();
        connection
            .overwrite_collection("k", &["keep".to_string()])
            .unwrap();

        let result: Result<()> = connection.modify::<String, _, _>("k", |items| {
            items.clear();
            Err(anyhow!("validation failed"))
        });
        assert!(result.is_err());

        let stored = connection.read_collection::<String>("k").unwrap();
        assert_eq!(stored.value, vec!["keep".to_string()]);
    }

    #[test]
    fn test_modify_expecting_detects_intervening_write() {
        let connection = JsonConnection::in_memory();
        let seen = connection.read_collection::<String>("k").unwrap();
        connection
            .overwrite_collection("k", &["other".to_string()])
            .unwrap();

        let result = connection.modify_expecting::<String, _, _>("k", Some(seen.revision), |items| {
            items.push("mine".to_string());
            Ok(())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_corrupt_collection_is_reported() {
        let env = TestEnvironment::new().unwrap();
        std::fs::write(env.base_path.join("famfin_expenses.json"), "{not json").unwrap();

        let err = env
            .connection
            .read_collection::<String>("famfin_expenses")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StorageError>(),
            Some(StorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_file_backed_connection_persists_between_opens() {
        let env = TestEnvironment::new().unwrap();
        env.connection
            .overwrite_collection("famfin_budgets", &[1, 2, 3])
            .unwrap();

        let reopened = JsonConnection::open(&env.base_path).unwrap();
        let snapshot = reopened.read_collection::<i32>("famfin_budgets").unwrap();
        assert_eq!(snapshot.value, vec![1, 2, 3]);
    }
}
