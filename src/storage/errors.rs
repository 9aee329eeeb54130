use crate::models::AccountError;
use crate::types::{format_reading_timestamp, AccountId, ReadValue, ReadingTimestamp};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Storage error: Account [{account_id}] already exists")]
    DuplicateAccount {
        account_id: AccountId
    },
    #[error(
        "Storage error: Unique constraint violated for reading [{}]:[{value}] of account [{account_id}]",
        format_reading_timestamp(.timestamp)
    )]
    UniqueConstraint {
        account_id: AccountId,
        timestamp: ReadingTimestamp,
        value: ReadValue
    },
    #[error("Storage error: Conflicting reading for account [{account_id}]: {source}")]
    Conflict {
        account_id: AccountId,
        source: AccountError
    },
    #[error("Storage error: {0}")]
    Unavailable(String)
}
