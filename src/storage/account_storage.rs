use crate::models::{Account, AccountError, MeterReading};
use crate::storage::{AccountRepository, StorageError};
use crate::types::AccountId;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory store of committed accounts.
///
/// Uploads never touch it directly; each one works through its own
/// [`UnitOfWork`] obtained from [`AccountStorage::unit_of_work`].
pub struct AccountStorage {
    accounts: DashMap<AccountId, Account>,
    commit_lock: Mutex<()>
}

impl AccountStorage {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            commit_lock: Mutex::new(())
        }
    }

    /// Registers a new account. Existing accounts are never overwritten.
    pub fn add(&self, account: Account) -> Result<(), StorageError> {
        if self.accounts.contains_key(&account.account_id) {
            return Err(StorageError::DuplicateAccount { account_id: account.account_id })
        }

        self.accounts.insert(account.account_id, account);

        Ok(())
    }

    /// A copy of the committed account, if it exists.
    pub fn get(&self, account_id: AccountId) -> Option<Account> {
        self.accounts.get(&account_id).map(|entry| entry.value().clone())
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Starts a new unit of work against this store.
    pub fn unit_of_work(self: &Arc<Self>) -> UnitOfWork {
        UnitOfWork {
            storage: self.clone(),
            baselines: DashMap::new(),
            staged: DashMap::new()
        }
    }

    /// Merges every staged reading into the current committed accounts.
    ///
    /// Readings are re-checked against what is committed *now*, so a reading that
    /// lost a race with another commit (older than, or identical to, a committed
    /// reading) rejects the whole batch and nothing is applied.
    async fn merge(&self, staged: Vec<(AccountId, Vec<MeterReading>)>) -> Result<usize, StorageError> {
        let _guard = self.commit_lock.lock().await;

        let mut merged = Vec::with_capacity(staged.len());
        let mut written = 0;

        for (account_id, readings) in staged {
            let mut account = self.get(account_id)
                .ok_or_else(|| StorageError::Unavailable(format!("Account [{account_id}] no longer exists")))?;

            for reading in readings {
                account.append_reading(reading).map_err(|error| match error {
                    AccountError::DuplicateReading { account_id, timestamp, value } => {
                        StorageError::UniqueConstraint { account_id, timestamp, value }
                    }
                    source => StorageError::Conflict { account_id, source }
                })?;
                written += 1;
            }

            merged.push(account);
        }

        for account in merged {
            debug!("Committing account [{}] with [{}] readings", account.account_id, account.readings().len());
            self.accounts.insert(account.account_id, account);
        }

        Ok(written)
    }
}

/// Per-upload view of an [`AccountStorage`].
///
/// Remembers how many readings each fetched account held so that only the
/// readings added during this upload are written on commit. Staged accounts
/// are private to the unit; committing (or failing to) clears them.
pub struct UnitOfWork {
    storage: Arc<AccountStorage>,
    baselines: DashMap<AccountId, usize>,
    staged: DashMap<AccountId, Account>
}

impl UnitOfWork {
    fn take_staged(&self) -> Vec<(AccountId, Vec<MeterReading>)> {
        let ids: Vec<AccountId> = self.staged.iter().map(|entry| *entry.key()).collect();
        let mut staged = Vec::with_capacity(ids.len());

        for account_id in ids {
            let Some((_, account)) = self.staged.remove(&account_id) else {
                continue;
            };
            let baseline = self.baselines.get(&account_id).map(|entry| *entry.value()).unwrap_or_default();
            let added = account.readings().get(baseline..).unwrap_or_default().to_vec();

            staged.push((account_id, added));
        }

        self.baselines.clear();
        staged
    }
}

#[async_trait]
impl AccountRepository for UnitOfWork {
    async fn fetch_account(&self, account_id: AccountId) -> Result<Option<Account>, StorageError> {
        //NOTE: Callers receive a copy so nothing they do is visible until it is staged and committed
        let account = self.storage.get(account_id);

        if let Some(account) = &account {
            self.baselines.insert(account_id, account.readings().len());
        }

        Ok(account)
    }

    async fn mark_dirty(&self, account: Account) -> Result<(), StorageError> {
        if !self.baselines.contains_key(&account.account_id) {
            return Err(StorageError::Unavailable(format!("Account [{}] was not loaded by this unit of work", account.account_id)))
        }

        self.staged.insert(account.account_id, account);

        Ok(())
    }

    async fn commit(&self) -> Result<usize, StorageError> {
        let staged = self.take_staged();

        if staged.is_empty() {
            return Ok(0)
        }

        self.storage.merge(staged).await
    }
}
