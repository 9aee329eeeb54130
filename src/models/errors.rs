use crate::types::{format_reading_timestamp, AccountId, ReadValue, ReadingTimestamp, TypesError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Invalid Account Id: '{account_id}'")]
    InvalidAccountId {
        account_id: AccountId
    },
    #[error("First name / Last name cannot be empty.")]
    MissingName {
        account_id: AccountId
    },
    #[error(
        "New meter reading date ({}) is older than the latest existing meter reading date ({}).",
        format_reading_timestamp(.timestamp),
        format_reading_timestamp(.latest)
    )]
    OutOfOrder {
        account_id: AccountId,
        timestamp: ReadingTimestamp,
        latest: ReadingTimestamp
    },
    #[error("{source}")]
    InvalidValue {
        account_id: AccountId,
        source: TypesError
    },
    #[error("Duplicate meter reading.")]
    DuplicateReading {
        account_id: AccountId,
        timestamp: ReadingTimestamp,
        value: ReadValue
    }
}

impl AccountError {
    pub fn invalid_account_id(account_id: AccountId) -> Self {
        Self::InvalidAccountId { account_id }
    }

    pub fn missing_name(account_id: AccountId) -> Self {
        Self::MissingName { account_id }
    }

    pub fn out_of_order(account_id: AccountId, timestamp: ReadingTimestamp, latest: ReadingTimestamp) -> Self {
        Self::OutOfOrder {
            account_id,
            timestamp,
            latest
        }
    }

    pub fn invalid_value(account_id: AccountId, source: TypesError) -> Self {
        Self::InvalidValue { account_id, source }
    }

    pub fn duplicate_reading(account_id: AccountId, timestamp: ReadingTimestamp, value: ReadValue) -> Self {
        Self::DuplicateReading {
            account_id,
            timestamp,
            value
        }
    }
}
