mod account_storage;
mod errors;
mod seed;

use async_trait::async_trait;

use crate::models::Account;
use crate::types::AccountId;

pub use account_storage::{AccountStorage, UnitOfWork};
pub use errors::StorageError;
pub use seed::load_accounts;

/// Persistence contract consumed by the upload pipeline.
///
/// A repository handle is a unit of work for one upload: accounts are staged with
/// [`AccountRepository::mark_dirty`] and made durable together by a single
/// [`AccountRepository::commit`].
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Loads an account together with all of its existing readings.
    async fn fetch_account(&self, account_id: AccountId) -> Result<Option<Account>, StorageError>;

    /// Stages an account for the next commit. Staging the same account again replaces the earlier copy.
    async fn mark_dirty(&self, account: Account) -> Result<(), StorageError>;

    /// Atomically persists every staged account and returns the number of readings written.
    /// On failure none of the staged changes become visible.
    async fn commit(&self) -> Result<usize, StorageError>;
}
